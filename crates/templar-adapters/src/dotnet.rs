//! Mapper for `dotnet new`-style `template.json` metadata.
//!
//! Translates the foreign schema onto the native model:
//!
//! | template.json                              | native                       |
//! |--------------------------------------------|------------------------------|
//! | `sourceName`                               | project-name [`Tag`]         |
//! | symbol `type=parameter, datatype=bool`     | [`ConditionalTag`]           |
//! | symbol `type=parameter` with `replaces`    | [`Tag`]                      |
//! | symbol `type=computed` with `value`        | [`ComputedTag`]              |
//! | `sources[].modifiers[]` `condition=(!key)` | that tag's `filesToInclude`  |
//!
//! Symbol declaration order is preserved so the exclusion pattern comes out
//! in declaration order. Modifiers whose condition is not a plain negated
//! key have no native equivalent and are skipped with a warning.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use templar_core::application::ports::ForeignMetadataMapper;
use templar_core::application::MetadataService;
use templar_core::domain::{ComputedTag, ConditionalTag, DomainError, Tag, TemplateMetadata};

/// Maps `dotnet new` template metadata onto the native model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotNetMetadataMapper;

impl DotNetMetadataMapper {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DotNetTemplate {
    #[serde(default)]
    source_name: Option<String>,
    // serde_json's preserve_order feature keeps declaration order here.
    #[serde(default)]
    symbols: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    sources: Vec<DotNetSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DotNetSymbol {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    datatype: String,
    #[serde(default)]
    default_value: Option<serde_json::Value>,
    #[serde(default)]
    replaces: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DotNetSource {
    #[serde(default)]
    modifiers: Vec<DotNetSourceModifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DotNetSourceModifier {
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

impl ForeignMetadataMapper for DotNetMetadataMapper {
    fn file_marker(&self) -> &'static str {
        "template.json"
    }

    fn map(&self, raw: &str, source_label: &str) -> Result<TemplateMetadata, DomainError> {
        let template: DotNetTemplate =
            serde_json::from_str(raw).map_err(|e| DomainError::MetadataFormat {
                source_label: source_label.to_owned(),
                cause: e.to_string(),
            })?;

        let exclusions = collect_exclusions(&template.sources);
        let mut metadata = TemplateMetadata::default();

        // `sourceName` is the literal text stamped through the template for
        // the project name; the native renderer replaces the tag key, so the
        // key IS that literal.
        if let Some(source_name) = template.source_name.filter(|s| !s.is_empty()) {
            metadata.tags.push(Tag {
                key: source_name,
                name: MetadataService::PROJECT_NAME.to_owned(),
                default_value: MetadataService::DEFAULT_PROJECT_NAME.to_owned(),
                regex: None,
            });
        }

        for (name, symbol) in &template.symbols {
            let symbol: DotNetSymbol = match serde_json::from_value(symbol.clone()) {
                Ok(s) => s,
                Err(e) => {
                    return Err(DomainError::MetadataFormat {
                        source_label: source_label.to_owned(),
                        cause: format!("symbol `{name}`: {e}"),
                    });
                }
            };
            let files_to_include = exclusions.get(name).cloned().unwrap_or_default();

            match symbol.kind.as_str() {
                "parameter" if symbol.datatype.eq_ignore_ascii_case("bool") => {
                    metadata.conditional_tags.push(ConditionalTag {
                        key: name.clone(),
                        name: name.clone(),
                        default_value: symbol.default_value.as_ref().map(bool_value),
                        files_to_include,
                    });
                }
                "parameter" => {
                    // Only parameters that stamp text into files make sense
                    // as substitution tags.
                    let Some(replaces) = symbol.replaces.filter(|r| !r.is_empty()) else {
                        debug!(symbol = %name, "parameter has no `replaces`, skipping");
                        continue;
                    };
                    metadata.tags.push(Tag {
                        key: replaces,
                        name: name.clone(),
                        default_value: symbol
                            .default_value
                            .as_ref()
                            .map(string_value)
                            .unwrap_or_default(),
                        regex: None,
                    });
                }
                "computed" => {
                    let Some(expression) = symbol.value.filter(|v| !v.is_empty()) else {
                        debug!(symbol = %name, "computed symbol has no `value`, skipping");
                        continue;
                    };
                    metadata.computed_tags.push(ComputedTag {
                        key: name.clone(),
                        expression,
                        files_to_include,
                    });
                }
                other => {
                    debug!(symbol = %name, kind = other, "unsupported symbol type, skipping");
                }
            }
        }

        Ok(metadata)
    }
}

/// Gather `exclude` globs per tag key from source modifiers.
///
/// A modifier conditioned on `(!key)` excludes its globs when `key` is
/// false, which is exactly the native `filesToInclude` semantics for `key`.
fn collect_exclusions(sources: &[DotNetSource]) -> HashMap<String, String> {
    let mut result: HashMap<String, String> = HashMap::new();

    for modifier in sources.iter().flat_map(|s| &s.modifiers) {
        let Some(condition) = modifier.condition.as_deref() else {
            continue;
        };
        let Some(key) = negated_key(condition) else {
            warn!(condition, "source modifier condition has no native equivalent, skipping");
            continue;
        };
        if modifier.exclude.is_empty() {
            continue;
        }
        let globs = modifier.exclude.join(",");
        result
            .entry(key.to_owned())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&globs);
            })
            .or_insert(globs);
    }

    result
}

/// Extract `key` from a condition of the shape `(!key)` or `!key`.
fn negated_key(condition: &str) -> Option<&str> {
    let inner = condition
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(condition)
        .trim();
    let key = inner.strip_prefix('!')?.trim();
    (!key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .then_some(key)
}

/// Foreign default values may be JSON bools or strings like `"true"`.
fn bool_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn string_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
