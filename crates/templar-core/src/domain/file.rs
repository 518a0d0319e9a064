//! The file value exchanged between sources and the renderer.

/// One text file pulled from a template source.
///
/// `TemplateFile` is an immutable value: the renderer produces *new*
/// instances rather than mutating its inputs, so the same batch can be
/// rendered twice with different environments.
///
/// `name` is a relative path using `/` separators regardless of platform
/// (sources normalise on collection). Binary content is out of scope; the
/// core only ever sees UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative path, e.g. `"src/main.cs"`.
    pub name: String,
    /// Full file content.
    pub content: String,
}

impl TemplateFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
