//! Directive block parsing and resolution.
//!
//! The directive grammar is a logical construct over a stream of *marker
//! lines*:
//!
//! ```text
//! IF(cond) body (ELIF(cond) body)* (ELSE body)? ENDIF
//! ```
//!
//! where `cond` is a boolean tag key, optionally parenthesised and optionally
//! prefixed with `!`. A marker is one full line in any of three physical
//! syntaxes, so the same template can carry directives in C-like sources,
//! markup and JSON documents:
//!
//! | Syntax | Example |
//! |--------|---------|
//! | bare | `#if cond1` |
//! | HTML comment | `<!--#if cond1-->` |
//! | JSON string | `"#if cond1": "",` |
//!
//! Syntaxes may mix freely within one block — recognition is per line.
//!
//! Blocks nest arbitrarily; each `#endif` pairs with the nearest still-open
//! block (stack discipline). A single non-greedy regex per key cannot express
//! that once two blocks for the *same* key are nested or adjacent, which is
//! why this is an explicit recursive parser over tokenized lines rather than
//! a pattern match.
//!
//! Marker lines are stripped from the output together with their line
//! terminators; the chosen branch's body lines are kept verbatim, unchosen
//! branches vanish entirely.

use crate::domain::environment::TagEnvironment;
use crate::domain::error::DomainError;

/// A directive condition: a key with optional negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cond {
    negated: bool,
    key: String,
}

impl Cond {
    /// Evaluate against the environment; unknown keys are false.
    fn holds(&self, env: &TagEnvironment) -> bool {
        env.truth(&self.key) != self.negated
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Marker {
    If(Cond),
    Elif(Cond),
    Else,
    Endif,
}

impl Marker {
    fn keyword(&self) -> &'static str {
        match self {
            Self::If(_) => "#if",
            Self::Elif(_) => "#elif",
            Self::Else => "#else",
            Self::Endif => "#endif",
        }
    }
}

/// Recognise a directive marker occupying the whole line.
///
/// Returns `None` for ordinary text, including almost-markers like
/// `#include <stdio.h>` or `#if a && b` — the condition grammar accepts a
/// single identifier only, and an identifier char directly after the key
/// would make it a *different* key (`cond1` never matches `cond12`).
pub(crate) fn parse_marker(line: &str) -> Option<Marker> {
    let trimmed = line.trim();

    let inner = if let Some(html) = trimmed
        .strip_prefix("<!--")
        .and_then(|rest| rest.strip_suffix("-->"))
    {
        html.trim()
    } else if let Some(rest) = trimmed.strip_prefix('"') {
        // JSON-string syntax: `"#if cond": ""` with an optional trailing comma.
        // The marker is the first string literal; the value part is ignored.
        rest.split('"').next()?.trim()
    } else {
        trimmed
    };

    let body = inner.strip_prefix('#')?;
    let (keyword, tail) = match body.split_once(char::is_whitespace) {
        Some((kw, rest)) => (kw, rest.trim()),
        None => (body, ""),
    };

    match keyword {
        "if" => parse_cond(tail).map(Marker::If),
        "elif" => parse_cond(tail).map(Marker::Elif),
        "else" if tail.is_empty() => Some(Marker::Else),
        "endif" if tail.is_empty() => Some(Marker::Endif),
        _ => None,
    }
}

fn parse_cond(text: &str) -> Option<Cond> {
    let mut t = text.trim();
    if let Some(stripped) = t.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        t = stripped.trim();
    }

    let negated = t.starts_with('!');
    let key = if negated { t[1..].trim_start() } else { t };

    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    Some(Cond {
        negated,
        key: key.to_owned(),
    })
}

// ── Block tree ────────────────────────────────────────────────────────────────

enum Node<'a> {
    Text(&'a str),
    Block(Block<'a>),
}

struct Block<'a> {
    /// `#if` branch followed by any `#elif` branches, in order.
    branches: Vec<(Cond, Vec<Node<'a>>)>,
    else_branch: Option<Vec<Node<'a>>>,
}

enum Segment<'a> {
    Text(&'a str),
    Marker(Marker),
}

/// Resolve all directive blocks in `content` against `env`.
///
/// `file_name` is only used for error context.
pub(crate) fn resolve(
    file_name: &str,
    content: &str,
    env: &TagEnvironment,
) -> Result<String, DomainError> {
    let segments: Vec<Segment> = content
        .split_inclusive('\n')
        .map(|line| match parse_marker(line) {
            Some(marker) => Segment::Marker(marker),
            None => Segment::Text(line),
        })
        .collect();

    let mut parser = BlockParser {
        segments: &segments,
        pos: 0,
        file_name,
    };
    let nodes = parser.parse_nodes(0)?;

    let mut out = String::with_capacity(content.len());
    emit(&nodes, env, &mut out);
    Ok(out)
}

struct BlockParser<'a> {
    segments: &'a [Segment<'a>],
    pos: usize,
    file_name: &'a str,
}

impl<'a> BlockParser<'a> {
    /// Collect nodes until a branch marker (`#elif`/`#else`/`#endif`) is seen
    /// at this nesting level, or until end of input.
    fn parse_nodes(&mut self, depth: usize) -> Result<Vec<Node<'a>>, DomainError> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.get(self.pos) {
            match segment {
                Segment::Text(line) => {
                    nodes.push(Node::Text(line));
                    self.pos += 1;
                }
                Segment::Marker(Marker::If(cond)) => {
                    self.pos += 1;
                    nodes.push(Node::Block(self.parse_block(cond.clone(), depth + 1)?));
                }
                Segment::Marker(marker) => {
                    if depth == 0 {
                        return Err(self.error(format!(
                            "`{}` without a matching `#if`",
                            marker.keyword()
                        )));
                    }
                    // Branch marker belongs to the enclosing block.
                    return Ok(nodes);
                }
            }
        }

        Ok(nodes)
    }

    /// Parse one block whose opening `#if cond` was already consumed.
    fn parse_block(&mut self, cond: Cond, depth: usize) -> Result<Block<'a>, DomainError> {
        let opening_key = cond.key.clone();
        let mut branches = vec![(cond, self.parse_nodes(depth)?)];
        let mut else_branch = None;

        loop {
            let Some(Segment::Marker(marker)) = self.segments.get(self.pos) else {
                return Err(self.error(format!("`#if {opening_key}` is never closed")));
            };
            let marker = marker.clone();
            self.pos += 1;

            match marker {
                Marker::Elif(cond) => {
                    if else_branch.is_some() {
                        return Err(self.error("`#elif` after `#else`".to_owned()));
                    }
                    let body = self.parse_nodes(depth)?;
                    branches.push((cond, body));
                }
                Marker::Else => {
                    if else_branch.is_some() {
                        return Err(self.error("more than one `#else` in a block".to_owned()));
                    }
                    else_branch = Some(self.parse_nodes(depth)?);
                }
                Marker::Endif => {
                    return Ok(Block {
                        branches,
                        else_branch,
                    });
                }
                // parse_nodes consumes every `#if` itself.
                Marker::If(_) => unreachable!("nested #if handled by parse_nodes"),
            }
        }
    }

    fn error(&self, detail: String) -> DomainError {
        DomainError::DirectiveSyntax {
            file_name: self.file_name.to_owned(),
            detail,
        }
    }
}

/// Walk the tree, keeping the first branch whose condition holds (or the
/// `#else` body if none does).
fn emit(nodes: &[Node<'_>], env: &TagEnvironment, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(line) => out.push_str(line),
            Node::Block(block) => {
                if let Some((_, body)) = block.branches.iter().find(|(c, _)| c.holds(env)) {
                    emit(body, env, out);
                } else if let Some(body) = &block.else_branch {
                    emit(body, env, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(negated: bool, key: &str) -> Cond {
        Cond {
            negated,
            key: key.into(),
        }
    }

    #[test]
    fn recognises_bare_markers() {
        assert_eq!(parse_marker("#if cond1"), Some(Marker::If(cond(false, "cond1"))));
        assert_eq!(parse_marker("#if (cond2)"), Some(Marker::If(cond(false, "cond2"))));
        assert_eq!(parse_marker("#if !cond1"), Some(Marker::If(cond(true, "cond1"))));
        assert_eq!(parse_marker("#if (!cond2)"), Some(Marker::If(cond(true, "cond2"))));
        assert_eq!(parse_marker("#elif other"), Some(Marker::Elif(cond(false, "other"))));
        assert_eq!(parse_marker("#else"), Some(Marker::Else));
        assert_eq!(parse_marker("  #endif  "), Some(Marker::Endif));
    }

    #[test]
    fn recognises_html_comment_markers() {
        assert_eq!(
            parse_marker("<!--#if cond1-->"),
            Some(Marker::If(cond(false, "cond1")))
        );
        assert_eq!(parse_marker("<!--#endif-->"), Some(Marker::Endif));
    }

    #[test]
    fn recognises_json_string_markers() {
        assert_eq!(
            parse_marker("\"#if cond1\": \"\","),
            Some(Marker::If(cond(false, "cond1")))
        );
        assert_eq!(
            parse_marker("\"#if !cond2\": \"\","),
            Some(Marker::If(cond(true, "cond2")))
        );
        assert_eq!(parse_marker("\"#endif\": \"\""), Some(Marker::Endif));
    }

    #[test]
    fn almost_markers_are_text() {
        assert_eq!(parse_marker("#include <stdio.h>"), None);
        assert_eq!(parse_marker("# A markdown heading"), None);
        assert_eq!(parse_marker("#if a && b"), None);
        assert_eq!(parse_marker("#endif trailing"), None);
        assert_eq!(parse_marker("plain text"), None);
    }
}
