//! The resolved tag environment driving one render call.
//!
//! The original form of this system mutated a shared key→value dictionary in
//! place while rendering (derived case variants, computed results folded in),
//! which made a tag map unsafe to reuse across calls. [`TagEnvironment`]
//! reframes that as an explicit builder: enrichment steps take `&self` and
//! return a *new* environment, so a base environment can be shared freely and
//! each render call works on its own value.

use std::collections::HashMap;

use super::file::TemplateFile;

/// Suffix marker deriving a lower-cased variant of a string tag.
pub const LOWER_SUFFIX: &str = "__lower";
/// Suffix marker deriving an upper-cased variant of a string tag.
pub const UPPER_SUFFIX: &str = "__upper";

/// A tag value of mixed kind.
///
/// Strings drive substitution, bools drive directive blocks and file
/// exclusion, numbers only exist for computed-tag expressions (e.g. a port
/// number compared against a literal).
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Str(String),
    Bool(bool),
    Num(f64),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for TagValue {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

/// Mapping from tag key to resolved value.
///
/// Map semantics: keys are unique, last write wins when merging. A given
/// environment instance belongs to one render/evaluate call at a time;
/// distinct calls with distinct environments are fully independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagEnvironment {
    values: HashMap<String, TagValue>,
}

impl TagEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: TagValue) {
        self.values.insert(key.into(), value);
    }

    /// Fluent variant of [`insert`](Self::insert) for builder chains.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: TagValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge `other` over `self`; `other` wins on key collisions.
    #[must_use]
    pub fn merged(mut self, other: &TagEnvironment) -> Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Truth value of a boolean tag; an absent or non-bool entry is `false`.
    pub fn truth(&self, key: &str) -> bool {
        self.get(key).and_then(TagValue::as_bool).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All string-valued entries.
    pub fn string_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// All bool-valued entries.
    pub fn bool_tags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k.as_str(), b)))
    }

    /// Keys and truth values of all bool entries, as a plain map. Used by the
    /// resolver's exclusion-pattern accumulator.
    pub fn bool_map(&self) -> HashMap<String, bool> {
        self.bool_tags().map(|(k, b)| (k.to_owned(), b)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Enrichment step: synthesize case-variant entries for every string tag
    /// whose `key__lower` / `key__upper` marker appears in any file name or
    /// content. Returns a new environment; `self` is untouched.
    ///
    /// The marker must follow the key immediately, so a template writes
    /// `projectName__lower` to get the lower-cased project name next to the
    /// original spelling.
    #[must_use]
    pub fn with_case_variants(&self, files: &[TemplateFile]) -> Self {
        let mut enriched = self.clone();

        for (key, value) in self.string_tags() {
            let lower_marker = format!("{key}{LOWER_SUFFIX}");
            let upper_marker = format!("{key}{UPPER_SUFFIX}");

            let lower_used = files
                .iter()
                .any(|f| f.name.contains(&lower_marker) || f.content.contains(&lower_marker));
            let upper_used = files
                .iter()
                .any(|f| f.name.contains(&upper_marker) || f.content.contains(&upper_marker));

            if lower_used {
                enriched.insert(lower_marker, TagValue::Str(value.to_lowercase()));
            }
            if upper_used {
                enriched.insert(upper_marker, TagValue::Str(value.to_uppercase()));
            }
        }

        enriched
    }
}

impl FromIterator<(String, TagValue)> for TagEnvironment {
    fn from_iter<I: IntoIterator<Item = (String, TagValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
