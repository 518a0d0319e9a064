// ============================================================================
// domain/error.rs - RENDERING CORE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (plain string payloads)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Every variant carries enough context (source label, tag key, expression or
/// pattern text) to be surfaced verbatim to the operator; none of them are
/// recoverable within the current request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Metadata Errors
    // ========================================================================
    /// The metadata document was found but could not be parsed into the
    /// expected shape. Distinct from an *absent* document, which is not an
    /// error at all (templates without metadata use built-in defaults).
    #[error("metadata in `{source_label}` is not valid: {cause}")]
    MetadataFormat { source_label: String, cause: String },

    // ========================================================================
    // Computed Tag Errors
    // ========================================================================
    /// A computed tag's expression failed to parse or evaluate. Fatal for the
    /// whole batch: callers treat computed-tag evaluation as all-or-nothing.
    #[error("cannot compute `{key}` from expression `{expression}`: {cause}")]
    Computation {
        key: String,
        expression: String,
        cause: String,
    },

    // ========================================================================
    // Renderer Errors
    // ========================================================================
    /// Unbalanced `#if`/`#endif` nesting in a template file.
    #[error("malformed directives in `{file_name}`: {detail}")]
    DirectiveSyntax { file_name: String, detail: String },

    /// A tag's substitution regex does not compile.
    #[error("invalid regex for tag `{key}`: `{pattern}`")]
    Pattern { key: String, pattern: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MetadataFormat { source_label, .. } => vec![
                format!("`{}` must be a valid JSON metadata document", source_label),
                "Check the tags / conditionalTags / computedTags arrays".into(),
            ],
            Self::Computation { key, expression, .. } => vec![
                format!("Tag `{}` could not be computed", key),
                format!("Review the expression: {}", expression),
                "Expressions may use tag keys, literals, ! && || == != < <= > >= and Count(...)".into(),
            ],
            Self::DirectiveSyntax { file_name, .. } => vec![
                format!("Check the #if / #endif pairing in `{}`", file_name),
                "Every #if needs a matching #endif; #elif and #else belong between them".into(),
            ],
            Self::Pattern { key, .. } => vec![
                format!("Fix the regex declared for tag `{}`", key),
                "The pattern needs exactly one capturing group for the replaced span".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MetadataFormat { .. } | Self::Pattern { .. } => ErrorCategory::Template,
            Self::Computation { .. } => ErrorCategory::Expression,
            Self::DirectiveSyntax { .. } => ErrorCategory::Template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The template's metadata or content is malformed.
    Template,
    /// A computed-tag expression is malformed or mis-typed.
    Expression,
    Internal,
}
