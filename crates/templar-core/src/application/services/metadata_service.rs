//! Metadata loading service.
//!
//! Turns a raw metadata document fetched through the [`TemplateSource`] port
//! into a normalized [`TemplateMetadata`]. Dispatch order:
//!
//! 1. Probe the native document (`templar.json`) at the template root.
//! 2. Fall back to the conventional foreign path
//!    (`.template.config/template.json`).
//! 3. If neither exists, return `Ok(None)` — "use built-in defaults".
//!
//! Retrieval failures are swallowed (logged at WARN) and treated as absence;
//! only a document that *was found* but does not parse is an error. That
//! distinction is deliberate: metadata is a feature-optional extra, a broken
//! document is an authoring bug the operator must see.

use tracing::{debug, instrument, warn};

use crate::application::ports::{ForeignMetadataMapper, TemplateSource, TemplateRef};
use crate::domain::{DomainError, TemplateFile, TemplateMetadata};
use crate::error::TemplarResult;

/// Loads and normalizes template metadata.
pub struct MetadataService {
    sources: Vec<Box<dyn TemplateSource>>,
    mappers: Vec<Box<dyn ForeignMetadataMapper>>,
}

impl MetadataService {
    /// Well-known key of the project-name tag injected when a template
    /// declares no tags at all.
    pub const PROJECT_NAME_KEY: &'static str = "projectName";
    /// Display name of the injected project-name tag.
    pub const PROJECT_NAME: &'static str = "Project Name";
    /// Default value of the injected project-name tag.
    pub const DEFAULT_PROJECT_NAME: &'static str = "Starter";

    /// Secondary conventional directory probed for foreign metadata.
    const FOREIGN_CONFIG_DIR: &'static str = ".template.config";
    /// File name probed inside [`Self::FOREIGN_CONFIG_DIR`].
    const FOREIGN_FILE_NAME: &'static str = "template.json";

    pub fn new(sources: Vec<Box<dyn TemplateSource>>) -> Self {
        Self {
            sources,
            mappers: Vec::new(),
        }
    }

    /// Register a foreign-schema mapper (builder style).
    #[must_use]
    pub fn with_mapper(mut self, mapper: Box<dyn ForeignMetadataMapper>) -> Self {
        self.mappers.push(mapper);
        self
    }

    /// Load the metadata declared by `template`, or `None` when the template
    /// ships no metadata document.
    ///
    /// # Errors
    ///
    /// [`DomainError::MetadataFormat`] when a document was found but cannot
    /// be parsed into the expected shape.
    #[instrument(skip(self), fields(template = %template.label()))]
    pub fn load(&self, template: &TemplateRef) -> TemplarResult<Option<TemplateMetadata>> {
        let Some(file) = self.probe(template) else {
            debug!("no metadata document found, using built-in defaults");
            return Ok(None);
        };

        if file.content.trim().is_empty() {
            debug!(file = %file.name, "metadata document is empty, using built-in defaults");
            return Ok(None);
        }

        let label = template.label();
        let metadata = match self
            .mappers
            .iter()
            .find(|m| file.name.ends_with(m.file_marker()))
        {
            Some(mapper) => mapper.map(&file.content, &label)?,
            None => serde_json::from_str::<TemplateMetadata>(&file.content).map_err(|e| {
                DomainError::MetadataFormat {
                    source_label: format!("{} ({})", file.name, template.source_url),
                    cause: e.to_string(),
                }
            })?,
        };

        Ok(Some(metadata.normalized()))
    }

    /// Probe both conventional locations, swallowing retrieval errors.
    fn probe(&self, template: &TemplateRef) -> Option<TemplateFile> {
        let source = self.source_for(template)?;

        let native = self.try_get(
            source,
            TemplateMetadata::FILE_NAME,
            template,
            template.source_directory.as_deref(),
        );
        if native.is_some() {
            return native;
        }

        let foreign_dir = match template.source_directory.as_deref() {
            Some(dir) if !dir.is_empty() => format!("{dir}/{}", Self::FOREIGN_CONFIG_DIR),
            _ => Self::FOREIGN_CONFIG_DIR.to_owned(),
        };
        self.try_get(source, Self::FOREIGN_FILE_NAME, template, Some(&foreign_dir))
    }

    fn source_for(&self, template: &TemplateRef) -> Option<&dyn TemplateSource> {
        let found = self
            .sources
            .iter()
            .find(|s| s.source_type().eq_ignore_ascii_case(&template.source_type))
            .map(Box::as_ref);
        if found.is_none() {
            warn!(source_type = %template.source_type, "no source registered for template");
        }
        found
    }

    fn try_get(
        &self,
        source: &dyn TemplateSource,
        file_name: &str,
        template: &TemplateRef,
        directory: Option<&str>,
    ) -> Option<TemplateFile> {
        match source.get_file(file_name, &template.source_url, directory) {
            Ok(found) => found,
            Err(e) => {
                // Absence of metadata is a supported configuration; a source
                // hiccup while probing must not fail the whole request.
                warn!(file = file_name, error = %e, "metadata probe failed, treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;

    /// Source stub: serves a fixed set of (directory, name) → content pairs,
    /// or fails every call when `broken` is set.
    struct StubSource {
        files: Vec<(Option<&'static str>, &'static str, &'static str)>,
        broken: bool,
    }

    impl TemplateSource for StubSource {
        fn source_type(&self) -> &'static str {
            "filesystem"
        }

        fn get_file(
            &self,
            file_name: &str,
            source_url: &str,
            source_directory: Option<&str>,
        ) -> Result<Option<TemplateFile>, ApplicationError> {
            if self.broken {
                return Err(ApplicationError::Retrieval {
                    file_name: file_name.into(),
                    source_url: source_url.into(),
                    reason: "stub failure".into(),
                });
            }
            Ok(self
                .files
                .iter()
                .find(|(dir, name, _)| *dir == source_directory && *name == file_name)
                .map(|(_, name, content)| TemplateFile::new(*name, *content)))
        }
    }

    fn template_ref() -> TemplateRef {
        TemplateRef {
            name: "demo".into(),
            source_type: "filesystem".into(),
            source_url: "/templates/demo".into(),
            source_directory: None,
        }
    }

    fn service(stub: StubSource) -> MetadataService {
        MetadataService::new(vec![Box::new(stub)])
    }

    #[test]
    fn loads_and_normalizes_native_document() {
        let stub = StubSource {
            files: vec![(
                None,
                TemplateMetadata::FILE_NAME,
                r#"{ "tags": [ { "name": "Project Name" }, { "name": "" } ] }"#,
            )],
            broken: false,
        };

        let metadata = service(stub).load(&template_ref()).unwrap().unwrap();
        assert_eq!(metadata.tags.len(), 1);
        assert_eq!(metadata.tags[0].key, "Project Name");
    }

    #[test]
    fn absent_document_is_not_an_error() {
        let stub = StubSource {
            files: vec![],
            broken: false,
        };
        assert_eq!(service(stub).load(&template_ref()).unwrap(), None);
    }

    #[test]
    fn retrieval_failure_is_swallowed_as_absence() {
        let stub = StubSource {
            files: vec![],
            broken: true,
        };
        assert_eq!(service(stub).load(&template_ref()).unwrap(), None);
    }

    #[test]
    fn malformed_document_is_a_metadata_format_error() {
        let stub = StubSource {
            files: vec![(None, TemplateMetadata::FILE_NAME, "not json at all")],
            broken: false,
        };

        let err = service(stub).load(&template_ref()).unwrap_err();
        let crate::error::TemplarError::Domain(DomainError::MetadataFormat {
            source_label, ..
        }) = err
        else {
            panic!("expected MetadataFormat, got {err:?}");
        };
        assert_eq!(source_label, "templar.json (/templates/demo)");
    }

    #[test]
    fn falls_back_to_foreign_config_path() {
        struct UpperMapper;
        impl ForeignMetadataMapper for UpperMapper {
            fn file_marker(&self) -> &'static str {
                "template.json"
            }
            fn map(&self, raw: &str, _label: &str) -> Result<TemplateMetadata, DomainError> {
                // Toy mapper: one tag named after the raw content.
                Ok(TemplateMetadata {
                    tags: vec![crate::domain::Tag {
                        key: raw.trim().to_owned(),
                        ..Default::default()
                    }],
                    ..Default::default()
                })
            }
        }

        let stub = StubSource {
            files: vec![(Some(".template.config"), "template.json", "mapped")],
            broken: false,
        };

        let metadata = service(stub)
            .with_mapper(Box::new(UpperMapper))
            .load(&template_ref())
            .unwrap()
            .unwrap();
        assert_eq!(metadata.tags[0].key, "mapped");
    }

    #[test]
    fn unregistered_source_type_yields_absence() {
        let stub = StubSource {
            files: vec![],
            broken: false,
        };
        let mut template = template_ref();
        template.source_type = "git".into();
        assert_eq!(service(stub).load(&template).unwrap(), None);
    }
}
