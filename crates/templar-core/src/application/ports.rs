//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from the outside world.
//! The `templar-adapters` crate provides implementations.

use crate::application::ApplicationError;
use crate::domain::{DomainError, TemplateFile, TemplateMetadata};

/// Reference to a template held by some source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateRef {
    /// Display name used in logs and error messages.
    pub name: String,
    /// Source type discriminator, e.g. `"filesystem"` or `"git"`.
    pub source_type: String,
    /// Where the source finds the template (path or URL).
    pub source_url: String,
    /// Subdirectory within the source, if any.
    pub source_directory: Option<String>,
}

impl TemplateRef {
    /// Label identifying the template in user-facing error messages.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.source_url.clone()
        } else {
            self.name.clone()
        }
    }
}

/// Port for fetching individual files from a template source.
///
/// Implemented by:
/// - `templar_adapters::source::LocalTemplateSource` (production)
/// - `templar_adapters::source::InMemorySource` (testing)
///
/// A git-backed source would implement the same trait; the loader only cares
/// about `get_file` semantics: `Ok(None)` means "the source is fine, the file
/// just isn't there", while `Err` means the source itself failed.
pub trait TemplateSource: Send + Sync {
    /// Source type discriminator matched against [`TemplateRef::source_type`].
    fn source_type(&self) -> &'static str;

    /// Fetch one file by name, relative to `source_directory` inside the
    /// source at `source_url`.
    fn get_file(
        &self,
        file_name: &str,
        source_url: &str,
        source_directory: Option<&str>,
    ) -> Result<Option<TemplateFile>, ApplicationError>;
}

/// Port for translating a foreign metadata schema into the native model.
///
/// The loader probes a secondary conventional path
/// (`.template.config/template.json`) whose document is *not* in the native
/// shape; a mapper registered for that file name translates it before
/// normalization.
pub trait ForeignMetadataMapper: Send + Sync {
    /// File-name suffix this mapper handles, e.g. `"template.json"`.
    fn file_marker(&self) -> &'static str;

    /// Translate the raw document into native metadata.
    fn map(&self, raw: &str, source_label: &str) -> Result<TemplateMetadata, DomainError>;
}
