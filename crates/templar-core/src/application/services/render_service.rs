//! Rendering orchestration service.
//!
//! Ties the pure domain pieces together into the use case "resolve tags,
//! then render files":
//!
//! 1. Seed a [`TagEnvironment`] with declared defaults.
//! 2. Merge caller-supplied overrides (overrides win).
//! 3. Evaluate computed tags against the merged environment and fold the
//!    boolean results back in.
//! 4. Derive the exclusion pattern from the final truth of every
//!    conditional and computed tag.
//!
//! The resulting [`Resolution`] is an immutable snapshot; `render` may be
//! called with it any number of times.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::{TagEnvironment, TagValue, TemplateFile, TemplateMetadata, expr, render, resolver};
use crate::error::TemplarResult;

/// Outcome of tag resolution, ready to drive rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Final tag values: defaults, then overrides, then computed results.
    pub environment: TagEnvironment,
    /// Comma-joined globs of files excluded by false tags.
    pub exclusion_pattern: String,
    /// Tag key to substitution-regex, for the regex render pass.
    pub regex_map: HashMap<String, String>,
}

/// Orchestrates tag resolution and template rendering.
///
/// Stateless; exists as a struct so callers hold one service object per
/// request pipeline, mirroring [`super::MetadataService`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderService;

impl RenderService {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the final tag environment and exclusion pattern.
    ///
    /// `metadata` is `None` when the template ships no metadata document; in
    /// that case the overrides alone form the environment and nothing is
    /// excluded.
    ///
    /// # Errors
    ///
    /// [`crate::domain::DomainError::Computation`] when any computed-tag
    /// expression fails to parse or evaluate. Evaluation is all-or-nothing:
    /// one bad expression fails the whole resolution.
    #[instrument(skip_all, fields(overrides = overrides.len()))]
    pub fn prepare(
        &self,
        metadata: Option<&TemplateMetadata>,
        overrides: &TagEnvironment,
    ) -> TemplarResult<Resolution> {
        let Some(metadata) = metadata else {
            return Ok(Resolution {
                environment: overrides.clone(),
                exclusion_pattern: String::new(),
                regex_map: HashMap::new(),
            });
        };

        let mut environment: TagEnvironment = resolver::default_string_tags(metadata)
            .into_iter()
            .map(|(k, v)| (k, TagValue::Str(v)))
            .chain(
                resolver::default_conditional_tags(metadata)
                    .into_iter()
                    .map(|(k, v)| (k, TagValue::Bool(v))),
            )
            .collect();
        environment = environment.merged(overrides);

        let computed = expr::evaluate_computed_tags(metadata, &environment)?;
        debug!(computed = computed.len(), "computed tags evaluated");
        for (key, value) in computed {
            environment.insert(key, TagValue::Bool(value));
        }

        let exclusion_pattern = resolver::exclusion_pattern(metadata, &environment.bool_map());
        let regex_map = resolver::regex_map(metadata);

        debug!(
            tags = environment.len(),
            exclusion = %exclusion_pattern,
            "tag resolution complete"
        );
        Ok(Resolution {
            environment,
            exclusion_pattern,
            regex_map,
        })
    }

    /// Render `files` under a prepared resolution.
    ///
    /// Input files are never mutated; the exclusion pattern is *not* applied
    /// here — file filtering happens at the adapter that enumerates files.
    pub fn render(
        &self,
        files: &[TemplateFile],
        resolution: &Resolution,
    ) -> TemplarResult<Vec<TemplateFile>> {
        let regexes = (!resolution.regex_map.is_empty()).then_some(&resolution.regex_map);
        Ok(render::render(files, &resolution.environment, regexes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComputedTag, ConditionalTag, Tag};

    fn metadata() -> TemplateMetadata {
        TemplateMetadata {
            tags: vec![Tag {
                key: "projectName".into(),
                name: "Project Name".into(),
                default_value: "Starter".into(),
                regex: None,
            }],
            conditional_tags: vec![
                ConditionalTag {
                    key: "useDocker".into(),
                    name: "Use Docker".into(),
                    default_value: Some(false),
                    files_to_include: "Dockerfile".into(),
                },
                ConditionalTag {
                    key: "useCi".into(),
                    name: "Use CI".into(),
                    default_value: Some(true),
                    files_to_include: ".ci/**".into(),
                },
            ],
            computed_tags: vec![ComputedTag {
                key: "anyInfra".into(),
                expression: "useDocker || useCi".into(),
                files_to_include: "infra/**".into(),
            }],
        }
    }

    #[test]
    fn defaults_flow_into_environment() {
        let resolution = RenderService::new()
            .prepare(Some(&metadata()), &TagEnvironment::new())
            .unwrap();

        assert_eq!(
            resolution.environment.get("projectName"),
            Some(&TagValue::Str("Starter".into()))
        );
        assert!(!resolution.environment.truth("useDocker"));
        assert!(resolution.environment.truth("useCi"));
        assert!(resolution.environment.truth("anyInfra"));
    }

    #[test]
    fn overrides_win_and_feed_computed_tags() {
        let overrides: TagEnvironment = [
            ("projectName".to_owned(), TagValue::Str("Acme".into())),
            ("useCi".to_owned(), TagValue::Bool(false)),
        ]
        .into_iter()
        .collect();

        let resolution = RenderService::new()
            .prepare(Some(&metadata()), &overrides)
            .unwrap();

        assert_eq!(
            resolution.environment.get("projectName"),
            Some(&TagValue::Str("Acme".into()))
        );
        // Both inputs to the computed expression are now false.
        assert!(!resolution.environment.truth("anyInfra"));
        assert_eq!(resolution.exclusion_pattern, "Dockerfile,.ci/**,infra/**");
    }

    #[test]
    fn true_tags_are_not_excluded() {
        let resolution = RenderService::new()
            .prepare(Some(&metadata()), &TagEnvironment::new())
            .unwrap();
        // useCi is true by default, which also makes anyInfra true.
        assert_eq!(resolution.exclusion_pattern, "Dockerfile");
    }

    #[test]
    fn missing_metadata_keeps_overrides_only() {
        let overrides: TagEnvironment =
            [("name".to_owned(), TagValue::Str("X".into()))].into_iter().collect();

        let resolution = RenderService::new().prepare(None, &overrides).unwrap();
        assert_eq!(resolution.environment, overrides);
        assert!(resolution.exclusion_pattern.is_empty());
        assert!(resolution.regex_map.is_empty());
    }

    #[test]
    fn bad_expression_fails_resolution() {
        let mut metadata = metadata();
        metadata.computed_tags.push(ComputedTag {
            key: "broken".into(),
            expression: "useDocker &&".into(),
            files_to_include: String::new(),
        });

        let err = RenderService::new()
            .prepare(Some(&metadata), &TagEnvironment::new())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::TemplarError::Domain(
                crate::domain::DomainError::Computation { .. }
            )
        ));
    }

    #[test]
    fn render_substitutes_resolved_tags() {
        let resolution = RenderService::new()
            .prepare(Some(&metadata()), &TagEnvironment::new())
            .unwrap();
        let files = vec![TemplateFile::new("README.md", "# projectName\n")];

        let rendered = RenderService::new().render(&files, &resolution).unwrap();
        assert_eq!(rendered[0].content, "# Starter\n");
    }
}
