//! In-memory template source for testing.

use std::collections::HashMap;

use templar_core::application::ports::TemplateSource;
use templar_core::application::ApplicationError;
use templar_core::domain::TemplateFile;

/// Test double holding template files keyed by `/`-separated name.
///
/// `source_url` is ignored; `source_directory` is treated as a name prefix,
/// matching how the local source joins paths.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder style).
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }
}

impl TemplateSource for InMemorySource {
    fn source_type(&self) -> &'static str {
        "memory"
    }

    fn get_file(
        &self,
        file_name: &str,
        _source_url: &str,
        source_directory: Option<&str>,
    ) -> Result<Option<TemplateFile>, ApplicationError> {
        let key = match source_directory {
            Some(dir) if !dir.is_empty() => format!("{dir}/{file_name}"),
            _ => file_name.to_owned(),
        };
        Ok(self
            .files
            .get(&key)
            .map(|content| TemplateFile::new(file_name, content.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_with_and_without_directory() {
        let source = InMemorySource::new()
            .with_file("templar.json", "{}")
            .with_file(".template.config/template.json", "{ }");

        assert!(source.get_file("templar.json", "ignored", None).unwrap().is_some());
        assert!(source
            .get_file("template.json", "ignored", Some(".template.config"))
            .unwrap()
            .is_some());
        assert!(source.get_file("absent.txt", "ignored", None).unwrap().is_none());
    }
}
