//! Template metadata aggregate.
//!
//! A template declares what can be customised about it through three kinds of
//! tags:
//!
//! | Kind | Value | Drives |
//! |------|-------|--------|
//! | [`Tag`] | free text | literal / regex substitution |
//! | [`ConditionalTag`] | boolean | directive blocks + file exclusion |
//! | [`ComputedTag`] | boolean, derived | directive blocks + file exclusion |
//!
//! The metadata document is JSON with three optional arrays (`tags`,
//! `conditionalTags`, `computedTags`). Field names are camelCase on the wire.
//! An alternate foreign schema (`.template.config/template.json`) is mapped
//! onto this shape by an adapter before it ever reaches the domain.
//!
//! ## Key normalization invariant
//!
//! Every tag lacking an explicit `key` falls back to its `name`; entries
//! whose key is still empty after the fallback are dropped. Keys in a
//! normalized [`TemplateMetadata`] are therefore always non-empty. Call
//! [`TemplateMetadata::normalized`] after deserialising — the loader does.

use serde::{Deserialize, Deserializer, Serialize};

/// A named free-text substitution value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// The literal token searched-and-replaced in file names and contents.
    /// Falls back to `name` when empty.
    #[serde(default)]
    pub key: String,

    /// Human-readable label shown on the input form.
    #[serde(default)]
    pub name: String,

    /// Value used when the caller supplies no override.
    #[serde(default)]
    pub default_value: String,

    /// Optional single-capture-group pattern. When present, the tag's value
    /// replaces the captured span of every match instead of literal key
    /// occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// A named boolean switch.
///
/// Controls directive blocks in content and, through `files_to_include`, a
/// set of files that are excluded when the switch resolves false.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalTag {
    /// Falls back to `name` when empty.
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub name: String,

    /// Absent means `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,

    /// Comma-separable glob of files that only belong in the output when the
    /// switch is true.
    #[serde(default)]
    pub files_to_include: String,
}

/// A boolean switch derived from an expression over other tag values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedTag {
    pub key: String,

    /// Boolean/relational expression, e.g. `Count(auth, db) > 1`.
    #[serde(default)]
    pub expression: String,

    #[serde(default)]
    pub files_to_include: String,
}

/// The declared customisation surface of one template.
///
/// Constructed once per template fetch and immutable thereafter. Declaration
/// order of the arrays is preserved; the exclusion pattern accumulates in
/// that order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tags: Vec<Tag>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub conditional_tags: Vec<ConditionalTag>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub computed_tags: Vec<ComputedTag>,
}

impl TemplateMetadata {
    /// Conventional file name of the native metadata document.
    pub const FILE_NAME: &'static str = "templar.json";

    /// Apply the key-normalization invariant (name fallback, drop empties).
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for tag in &mut self.tags {
            if tag.key.is_empty() {
                tag.key = tag.name.clone();
            }
        }
        self.tags.retain(|t| !t.key.is_empty());

        for tag in &mut self.conditional_tags {
            if tag.key.is_empty() {
                tag.key = tag.name.clone();
            }
        }
        self.conditional_tags.retain(|t| !t.key.is_empty());

        self.computed_tags.retain(|t| !t.key.is_empty());

        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.conditional_tags.is_empty() && self.computed_tags.is_empty()
    }
}

// Metadata documents in the wild write `"tags": null` as often as they omit
// the array; both must deserialise to an empty Vec.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
