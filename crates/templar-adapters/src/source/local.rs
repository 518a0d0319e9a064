//! Local directory template source using std::fs and walkdir.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use templar_core::application::ports::TemplateSource;
use templar_core::application::ApplicationError;
use templar_core::domain::{TemplateFile, TemplateMetadata};

use crate::exclusion::FileExcluder;

/// Metadata directory never delivered as template content.
const FOREIGN_CONFIG_DIR: &str = ".template.config";

/// Production template source reading from a local directory.
///
/// `source_url` is interpreted as a filesystem path;
/// `source_directory` as a subdirectory within it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTemplateSource;

impl LocalTemplateSource {
    pub fn new() -> Self {
        Self
    }

    fn root(source_url: &str, source_directory: Option<&str>) -> PathBuf {
        let base = PathBuf::from(source_url);
        match source_directory {
            Some(dir) if !dir.is_empty() => base.join(dir),
            _ => base,
        }
    }

    /// Enumerate every template file under the source, minus metadata
    /// documents and files matched by `excluder`.
    ///
    /// Names are relative to the template root, `/`-separated on every
    /// platform, and sorted for deterministic output. Files that are not
    /// valid UTF-8 are skipped with a warning.
    #[instrument(skip(excluder))]
    pub fn collect_files(
        &self,
        source_url: &str,
        source_directory: Option<&str>,
        excluder: &FileExcluder,
    ) -> Result<Vec<TemplateFile>, ApplicationError> {
        let root = Self::root(source_url, source_directory);
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = entry.map_err(|e| ApplicationError::Filesystem {
                path: root.clone(),
                reason: format!("Failed to walk template directory: {e}"),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = relative_name(&root, entry.path());
            if is_metadata(&name) || excluder.is_excluded(&name) {
                continue;
            }

            match std::fs::read_to_string(entry.path()) {
                Ok(content) => files.push(TemplateFile::new(name, content)),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(file = %name, "skipping non-UTF-8 file");
                }
                Err(e) => {
                    return Err(ApplicationError::Retrieval {
                        file_name: name,
                        source_url: source_url.to_owned(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(files = files.len(), "collected template files");
        Ok(files)
    }
}

impl TemplateSource for LocalTemplateSource {
    fn source_type(&self) -> &'static str {
        "filesystem"
    }

    fn get_file(
        &self,
        file_name: &str,
        source_url: &str,
        source_directory: Option<&str>,
    ) -> Result<Option<TemplateFile>, ApplicationError> {
        let path = Self::root(source_url, source_directory).join(file_name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ApplicationError::Retrieval {
            file_name: file_name.to_owned(),
            source_url: source_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Some(TemplateFile::new(file_name, content)))
    }
}

/// Relative path of `path` under `root`, `/`-separated.
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Metadata documents are configuration, not template content.
fn is_metadata(name: &str) -> bool {
    name == TemplateMetadata::FILE_NAME || name.starts_with(&format!("{FOREIGN_CONFIG_DIR}/"))
}
