//! Pure resolution functions over a [`TemplateMetadata`].
//!
//! Nothing here touches the filesystem or mutates its inputs; every function
//! is a plain map/fold over the declared tags. The exclusion pattern in
//! particular is handed to an external file-collection collaborator — the
//! core never filters files itself.

use std::collections::HashMap;

use super::metadata::TemplateMetadata;

/// Default value for every string tag, keyed by tag key.
pub fn default_string_tags(metadata: &TemplateMetadata) -> HashMap<String, String> {
    metadata
        .tags
        .iter()
        .map(|t| (t.key.clone(), t.default_value.clone()))
        .collect()
}

/// Default truth value for every conditional tag; an absent default is
/// `false`.
pub fn default_conditional_tags(metadata: &TemplateMetadata) -> HashMap<String, bool> {
    metadata
        .conditional_tags
        .iter()
        .map(|t| (t.key.clone(), t.default_value.unwrap_or(false)))
        .collect()
}

/// Substitution regex for every tag that declares a non-blank one.
pub fn regex_map(metadata: &TemplateMetadata) -> HashMap<String, String> {
    metadata
        .tags
        .iter()
        .filter_map(|t| {
            t.regex
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .map(|r| (t.key.clone(), r.to_owned()))
        })
        .collect()
}

/// Combined glob of files to exclude, given the resolved truth values.
///
/// Every conditional and computed tag whose key is absent from `resolved` or
/// maps to `false` contributes its `files_to_include` glob. Accumulation
/// follows declaration order, conditional tags first, then computed tags;
/// the result is trimmed of leading/trailing commas. Idempotent: identical
/// inputs always produce the identical string.
pub fn exclusion_pattern(
    metadata: &TemplateMetadata,
    resolved: &HashMap<String, bool>,
) -> String {
    let unresolved = |key: &str| !resolved.get(key).copied().unwrap_or(false);

    let mut pattern = String::new();
    for tag in metadata.conditional_tags.iter().filter(|t| unresolved(&t.key)) {
        pattern.push(',');
        pattern.push_str(&tag.files_to_include);
    }
    for tag in metadata.computed_tags.iter().filter(|t| unresolved(&t.key)) {
        pattern.push(',');
        pattern.push_str(&tag.files_to_include);
    }

    pattern.trim_matches(',').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::{ComputedTag, ConditionalTag, Tag};

    fn metadata() -> TemplateMetadata {
        TemplateMetadata {
            tags: vec![
                Tag {
                    key: "projectName".into(),
                    name: "Project Name".into(),
                    default_value: "Starter".into(),
                    regex: None,
                },
                Tag {
                    key: "mongo_ver".into(),
                    name: "Mongo version".into(),
                    default_value: "2.8.1".into(),
                    regex: Some("Version=\"([0-9|.]+)\"".into()),
                },
                Tag {
                    key: "blank_regex".into(),
                    name: "Blank".into(),
                    default_value: String::new(),
                    regex: Some("   ".into()),
                },
            ],
            conditional_tags: vec![
                ConditionalTag {
                    key: "auth".into(),
                    name: "Authentication".into(),
                    default_value: Some(true),
                    files_to_include: "Auth/**".into(),
                },
                ConditionalTag {
                    key: "docs".into(),
                    name: "Docs".into(),
                    default_value: None,
                    files_to_include: "docs/**".into(),
                },
            ],
            computed_tags: vec![ComputedTag {
                key: "anyDb".into(),
                expression: "mongo || postgres".into(),
                files_to_include: "Db/**".into(),
            }],
        }
    }

    #[test]
    fn string_defaults_keyed_by_key() {
        let tags = default_string_tags(&metadata());
        assert_eq!(tags.get("projectName").map(String::as_str), Some("Starter"));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn conditional_defaults_fall_back_to_false() {
        let tags = default_conditional_tags(&metadata());
        assert_eq!(tags.get("auth"), Some(&true));
        assert_eq!(tags.get("docs"), Some(&false));
    }

    #[test]
    fn regex_map_skips_blank_patterns() {
        let map = regex_map(&metadata());
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("mongo_ver"));
    }

    #[test]
    fn exclusion_collects_false_and_missing_switches() {
        let metadata = metadata();
        let resolved = HashMap::from([("auth".to_owned(), true), ("docs".to_owned(), false)]);
        // `anyDb` is missing from the resolution map entirely.
        assert_eq!(exclusion_pattern(&metadata, &resolved), "docs/**,Db/**");
    }

    #[test]
    fn exclusion_keeps_everything_when_all_true() {
        let metadata = metadata();
        let resolved = HashMap::from([
            ("auth".to_owned(), true),
            ("docs".to_owned(), true),
            ("anyDb".to_owned(), true),
        ]);
        assert_eq!(exclusion_pattern(&metadata, &resolved), "");
    }

    #[test]
    fn exclusion_is_idempotent() {
        let metadata = metadata();
        let resolved = HashMap::from([("auth".to_owned(), false)]);
        let first = exclusion_pattern(&metadata, &resolved);
        let second = exclusion_pattern(&metadata, &resolved);
        assert_eq!(first, second);
        assert_eq!(first, "Auth/**,docs/**,Db/**");
    }
}
