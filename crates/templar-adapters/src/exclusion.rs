//! Glob-based file exclusion.
//!
//! Turns the resolver's comma-joined exclusion pattern into a predicate over
//! relative file names. A segment excludes a file when its glob matches the
//! whole name, or, for segments without wildcards, when the segment names a
//! directory the file lives under (`docker` excludes `docker/compose.yml`).

use glob::Pattern;
use tracing::warn;

/// Compiled exclusion rules from a comma-joined glob list.
#[derive(Debug, Clone, Default)]
pub struct FileExcluder {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    raw: String,
    pattern: Pattern,
}

impl FileExcluder {
    /// Compile `pattern`, a comma-joined glob list as produced by tag
    /// resolution. Empty segments are ignored; segments that do not compile
    /// are skipped with a warning rather than failing the render.
    pub fn new(pattern: &str) -> Self {
        let rules = pattern
            .split(',')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| match Pattern::new(segment) {
                Ok(pattern) => Some(Rule {
                    raw: segment.to_owned(),
                    pattern,
                }),
                Err(e) => {
                    warn!(segment, error = %e, "skipping invalid exclusion glob");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Whether `name` (relative, `/`-separated) should be dropped.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| {
            if rule.pattern.matches(name) {
                return true;
            }
            let literal = !rule.raw.contains(['*', '?', '[']);
            literal && name.starts_with(&format!("{}/", rule.raw))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_excludes_nothing() {
        let excluder = FileExcluder::new("");
        assert!(excluder.is_empty());
        assert!(!excluder.is_excluded("anything.txt"));
    }

    #[test]
    fn exact_names_and_globs_match() {
        let excluder = FileExcluder::new("Dockerfile,src/**/*.bak");
        assert!(excluder.is_excluded("Dockerfile"));
        assert!(excluder.is_excluded("src/deep/old.bak"));
        assert!(!excluder.is_excluded("src/main.txt"));
    }

    #[test]
    fn literal_segment_excludes_directory_contents() {
        let excluder = FileExcluder::new("docker");
        assert!(excluder.is_excluded("docker/compose.yml"));
        assert!(excluder.is_excluded("docker"));
        assert!(!excluder.is_excluded("dockerfiles/x"));
    }

    #[test]
    fn interior_empty_segments_are_tolerated() {
        // Resolution preserves interior commas from absent globs.
        let excluder = FileExcluder::new("a.txt,,b.txt");
        assert!(excluder.is_excluded("a.txt"));
        assert!(excluder.is_excluded("b.txt"));
    }

    #[test]
    fn invalid_glob_is_skipped_not_fatal() {
        let excluder = FileExcluder::new("[unclosed,ok.txt");
        assert!(excluder.is_excluded("ok.txt"));
        assert!(!excluder.is_excluded("unclosed"));
    }
}
