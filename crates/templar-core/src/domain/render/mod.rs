//! The directive renderer: turns template files plus a resolved tag
//! environment into final project files.
//!
//! [`render`] performs four ordered passes:
//!
//! 1. **Case-variant synthesis** — the environment is enriched with
//!    `key__lower` / `key__upper` entries for string tags whose markers
//!    appear in the batch (see [`TagEnvironment::with_case_variants`]).
//! 2. **Literal substitution** — string tags replace their keys in file
//!    names and contents, longest key first. The ordering is load-bearing:
//!    a short key (`cond1`) must never corrupt occurrences of a longer key
//!    that contains it as a prefix (`cond12`).
//! 3. **Directive block resolution** — `#if/#elif/#else/#endif` blocks in
//!    content (see [`directive`]); bool keys embedded in file or directory
//!    names are removed from the name regardless of truth value (such names
//!    exist purely for exclusion bookkeeping, which happens externally).
//! 4. **Regex substitution** — per-tag single-capture-group patterns replace
//!    the captured span of every match in content with the tag's value.
//!
//! Input files are never mutated; the renderer returns a new batch.

mod directive;

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, instrument};

use super::environment::{TagEnvironment, TagValue};
use super::error::DomainError;
use super::file::TemplateFile;

/// Render a batch of files against a resolved tag environment.
///
/// `tag_regexes` maps tag keys to single-capture-group patterns (see
/// [`resolver::regex_map`](crate::domain::resolver::regex_map)); pass `None`
/// when the template declares no regex tags.
///
/// # Errors
///
/// - [`DomainError::DirectiveSyntax`] for unbalanced `#if`/`#endif` nesting
/// - [`DomainError::Pattern`] for a tag regex that does not compile
///
/// Everything else — unknown keys, patterns that match nothing — is a silent
/// no-op.
#[instrument(skip_all, fields(files = files.len(), tags = env.len()))]
pub fn render(
    files: &[TemplateFile],
    env: &TagEnvironment,
    tag_regexes: Option<&HashMap<String, String>>,
) -> Result<Vec<TemplateFile>, DomainError> {
    // Pass 1: enrich with case variants. The caller's environment stays
    // untouched; this call owns its own copy from here on.
    let env = env.with_case_variants(files);

    // Pass 2 ordering: longest key first, ties broken lexicographically so
    // the substitution order is deterministic.
    let mut string_tags: Vec<(&str, &str)> = env.string_tags().collect();
    string_tags.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let mut bool_keys: Vec<&str> = env.bool_tags().map(|(key, _)| key).collect();
    bool_keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut rendered = Vec::with_capacity(files.len());
    for file in files {
        let mut name = file.name.clone();
        let mut content = file.content.clone();

        for (key, value) in &string_tags {
            if name.contains(key) {
                name = name.replace(key, value);
            }
            if content.contains(key) {
                content = content.replace(key, value);
            }
        }

        // Bool keys in names mark files for external exclusion; the marker
        // itself never survives into the output name.
        for key in &bool_keys {
            if name.contains(key) {
                name = name.replace(key, "");
            }
        }

        content = directive::resolve(&file.name, &content, &env)?;

        rendered.push(TemplateFile { name, content });
    }

    // Pass 4: regex substitution, content only.
    if let Some(regexes) = tag_regexes {
        apply_tag_regexes(&mut rendered, &env, regexes)?;
    }

    Ok(rendered)
}

fn apply_tag_regexes(
    files: &mut [TemplateFile],
    env: &TagEnvironment,
    regexes: &HashMap<String, String>,
) -> Result<(), DomainError> {
    for (key, pattern) in regexes {
        let Some(value) = env.get(key).and_then(TagValue::as_str) else {
            debug!(key, "no string value for regex tag, skipped");
            continue;
        };

        let re = Regex::new(pattern).map_err(|_| DomainError::Pattern {
            key: key.clone(),
            pattern: pattern.clone(),
        })?;

        for file in files.iter_mut() {
            if re.is_match(&file.content) {
                file.content = replace_capture(&re, &file.content, value);
            }
        }
    }
    Ok(())
}

/// Replace the first capturing group of every non-overlapping match with
/// `value`, keeping the rest of each matched span byte-for-byte.
fn replace_capture(re: &Regex, content: &str, value: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for caps in re.captures_iter(content) {
        if let Some(group) = caps.get(1) {
            out.push_str(&content[last..group.start()]);
            out.push_str(value);
            last = group.end();
        }
    }

    out.push_str(&content[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, TagValue)]) -> TagEnvironment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn by_name<'a>(files: &'a [TemplateFile], name: &str) -> &'a TemplateFile {
        files
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no file named {name}"))
    }

    // ── Literal substitution ─────────────────────────────────────────────

    #[test]
    fn substitutes_string_tags_in_content_and_name() {
        let files = vec![
            TemplateFile::new("file1", "Greetings firstName lastName!"),
            TemplateFile::new("file2", "How can I help, firstName?"),
            TemplateFile::new("file3__upper", "firstName__lower lastName__upper"),
        ];
        let env = env(&[
            ("firstName", TagValue::from("John")),
            ("lastName", TagValue::from("Doe")),
            ("file3", TagValue::from("filename3")),
        ]);

        let result = render(&files, &env, None).unwrap();

        assert_eq!(by_name(&result, "file1").content, "Greetings John Doe!");
        assert_eq!(by_name(&result, "file2").content, "How can I help, John?");
        assert_eq!(by_name(&result, "FILENAME3").content, "john DOE");
    }

    #[test]
    fn renames_file_matching_tag_key() {
        let files = vec![TemplateFile::new("projectName", "content")];
        let env = env(&[("projectName", TagValue::from("StarterApp"))]);

        let result = render(&files, &env, None).unwrap();
        assert!(result.iter().any(|f| f.name == "StarterApp"));
    }

    #[test]
    fn longer_keys_substitute_before_their_prefixes() {
        let files = vec![TemplateFile::new("f", "name name2")];
        let env = env(&[
            ("name", TagValue::from("A")),
            ("name2", TagValue::from("B")),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "A B");
    }

    // ── Directive blocks ─────────────────────────────────────────────────

    #[test]
    fn keeps_true_blocks_and_drops_false_ones() {
        let files = vec![TemplateFile::new(
            "file1",
            "You chose\n#if cond1\nOne\n#endif\n#if (cond2)\nTwo\n#endif",
        )];
        let env = env(&[
            ("cond1", TagValue::Bool(true)),
            ("cond2", TagValue::Bool(false)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nOne\n");
    }

    #[test]
    fn negated_blocks_invert_the_condition() {
        let files = vec![TemplateFile::new(
            "file2",
            "You did not choose\n#if !cond1\nOne\n#endif\n#if (!cond2)\nTwo\n#endif",
        )];
        let env = env(&[
            ("cond1", TagValue::Bool(true)),
            ("cond2", TagValue::Bool(false)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You did not choose\nTwo\n");
    }

    #[test]
    fn negated_and_plain_blocks_for_one_key_are_mutually_exclusive() {
        let content = "#if flag\nyes\n#endif\n#if !flag\nno\n#endif";
        let files = vec![TemplateFile::new("f", content)];

        let on = render(&files, &env(&[("flag", TagValue::Bool(true))]), None).unwrap();
        assert_eq!(on[0].content, "yes\n");

        let off = render(&files, &env(&[("flag", TagValue::Bool(false))]), None).unwrap();
        assert_eq!(off[0].content, "no\n");
    }

    #[test]
    fn else_branch_selected_when_condition_false() {
        let files = vec![TemplateFile::new(
            "file1",
            "You chose\n#if cond1\nOne\n#else\nTwo\n#endif",
        )];
        let env = env(&[("cond1", TagValue::Bool(false))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nTwo\n");
    }

    #[test]
    fn elif_selects_first_true_condition() {
        let files = vec![TemplateFile::new(
            "file1",
            "You chose\n#if cond0\nZero\n#endif\n#if cond1\nOne\n#elif cond2\nTwo\n#endif",
        )];
        let env = env(&[
            ("cond0", TagValue::Bool(true)),
            ("cond1", TagValue::Bool(false)),
            ("cond2", TagValue::Bool(true)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nZero\nTwo\n");
    }

    #[test]
    fn elif_chain_with_no_true_branch_and_no_else_emits_nothing() {
        let files = vec![TemplateFile::new(
            "f",
            "head\n#if a\nA\n#elif b\nB\n#elif c\nC\n#endif\ntail",
        )];
        let env = env(&[("a", TagValue::Bool(false)), ("b", TagValue::Bool(false))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "head\ntail");
    }

    #[test]
    fn negation_combines_with_elif() {
        let files = vec![TemplateFile::new(
            "f",
            "#if a\nA\n#elif !b\nnot-b\n#endif",
        )];
        let env = env(&[("a", TagValue::Bool(false)), ("b", TagValue::Bool(false))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "not-b\n");
    }

    #[test]
    fn html_comment_markers_resolve() {
        let files = vec![TemplateFile::new(
            "file3",
            "You chose\n<!--#if cond1-->\nOne\n<!--#endif-->\nnot\n<!--#if !cond2-->\nTwo\n<!--#endif-->\n<!--#if (cond3)-->\nThree\n<!--#endif-->\n",
        )];
        let env = env(&[
            ("cond1", TagValue::Bool(true)),
            ("cond2", TagValue::Bool(false)),
            ("cond3", TagValue::Bool(false)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nOne\nnot\nTwo\n");
    }

    #[test]
    fn json_string_markers_resolve() {
        let files = vec![TemplateFile::new(
            "file3",
            "You chose\n\"#if cond1\": \"\",\nOne\n\"#endif\": \"\",\nnot\n\"#if !cond2\": \"\",\nTwo\n\"#endif\": \"\"",
        )];
        let env = env(&[
            ("cond1", TagValue::Bool(true)),
            ("cond2", TagValue::Bool(false)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nOne\nnot\nTwo\n");
    }

    #[test]
    fn marker_syntaxes_mix_within_one_block() {
        let files = vec![TemplateFile::new(
            "f",
            "<!--#if cond1-->\nkept\n#endif\n",
        )];
        let env = env(&[("cond1", TagValue::Bool(true))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "kept\n");
    }

    #[test]
    fn bool_keys_are_removed_from_names() {
        let files = vec![
            TemplateFile::new("filecond1", ""),
            TemplateFile::new("filecond1/subfile", ""),
        ];
        let env = env(&[("cond1", TagValue::Bool(true))]);

        let result = render(&files, &env, None).unwrap();
        assert!(result.iter().any(|f| f.name == "file"));
        assert!(result.iter().any(|f| f.name == "file/subfile"));
    }

    #[test]
    fn bool_key_removed_from_name_even_when_false() {
        let files = vec![TemplateFile::new("filecond1", "")];
        let env = env(&[("cond1", TagValue::Bool(false))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].name, "file");
    }

    #[test]
    fn nested_blocks_resolve_with_stack_discipline() {
        let files = vec![
            TemplateFile::new("file1", "You chose\n#if cond1\nOne\n#if cond2\nTwo\n#endif\n#endif"),
            TemplateFile::new("file2", "You chose\n#if cond3\nOne\n#if cond4\nTwo\n#endif\n#endif"),
        ];
        let env = env(&[
            ("cond1", TagValue::Bool(true)),
            ("cond2", TagValue::Bool(true)),
            ("cond3", TagValue::Bool(true)),
            ("cond4", TagValue::Bool(false)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(by_name(&result, "file1").content, "You chose\nOne\nTwo\n");
        assert_eq!(by_name(&result, "file2").content, "You chose\nOne\n");
    }

    #[test]
    fn same_key_nested_blocks_pair_with_nearest_endif() {
        // A non-greedy single-block regex would pair the outer #if with the
        // *inner* #endif here and corrupt the output.
        let files = vec![TemplateFile::new(
            "f",
            "#if cond1\nouter\n#if cond1\ninner\n#endif\nafter-inner\n#endif\n",
        )];
        let env = env(&[("cond1", TagValue::Bool(true))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "outer\ninner\nafter-inner\n");
    }

    #[test]
    fn adjacent_blocks_for_one_key_resolve_independently() {
        let files = vec![TemplateFile::new(
            "file1",
            "You chose\n#if cond1\nOne\n#endif\n#if cond1\nTwo\n#endif",
        )];
        let env = env(&[("cond1", TagValue::Bool(true))]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nOne\nTwo\n");
    }

    #[test]
    fn nested_blocks_for_different_keys_are_independent() {
        let content = "#if outer\no1\n#if inner\ni\n#endif\no2\n#endif";
        let files = vec![TemplateFile::new("f", content)];

        for (outer, inner, expected) in [
            (true, true, "o1\ni\no2\n"),
            (true, false, "o1\no2\n"),
            (false, true, ""),
            (false, false, ""),
        ] {
            let env = env(&[
                ("outer", TagValue::Bool(outer)),
                ("inner", TagValue::Bool(inner)),
            ]);
            let result = render(&files, &env, None).unwrap();
            assert_eq!(result[0].content, expected, "outer={outer} inner={inner}");
        }
    }

    #[test]
    fn directive_keys_are_prefix_safe() {
        let files = vec![TemplateFile::new(
            "file1",
            "You chose\n#if cond1\nOne\n#endif\n#if cond12\nTwo\n#endif",
        )];
        let env = env(&[
            ("cond1", TagValue::Bool(false)),
            ("cond12", TagValue::Bool(true)),
        ]);

        let result = render(&files, &env, None).unwrap();
        assert_eq!(result[0].content, "You chose\nTwo\n");
    }

    #[test]
    fn unknown_directive_key_defaults_to_false() {
        let files = vec![TemplateFile::new("f", "#if ghost\ngone\n#else\nkept\n#endif\n")];
        let result = render(&files, &TagEnvironment::new(), None).unwrap();
        assert_eq!(result[0].content, "kept\n");
    }

    #[test]
    fn unclosed_block_is_a_directive_syntax_error() {
        let files = vec![TemplateFile::new("broken.txt", "#if cond1\nbody\n")];
        let env = env(&[("cond1", TagValue::Bool(true))]);

        let err = render(&files, &env, None).unwrap_err();
        match err {
            DomainError::DirectiveSyntax { file_name, detail } => {
                assert_eq!(file_name, "broken.txt");
                assert!(detail.contains("cond1"), "detail: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn stray_endif_is_a_directive_syntax_error() {
        let files = vec![TemplateFile::new("broken.txt", "body\n#endif\n")];
        let err = render(&files, &TagEnvironment::new(), None).unwrap_err();
        assert!(matches!(err, DomainError::DirectiveSyntax { .. }));
    }

    #[test]
    fn elif_after_else_is_a_directive_syntax_error() {
        let files = vec![TemplateFile::new(
            "broken.txt",
            "#if a\nA\n#else\nB\n#elif c\nC\n#endif\n",
        )];
        let err = render(&files, &TagEnvironment::new(), None).unwrap_err();
        assert!(matches!(err, DomainError::DirectiveSyntax { .. }));
    }

    // ── Regex substitution ───────────────────────────────────────────────

    #[test]
    fn regex_replaces_only_the_captured_span() {
        let files = vec![TemplateFile::new(
            "file1",
            "<ItemGroup>\n   <PackageReference Include=\"MongoDB.Driver\" Version=\"2.8.1\" />\n   <PackageReference Include=\"AspNetCore.App\" Version=\"2.2.0\" />\n</ItemGroup>",
        )];
        let env = env(&[("mongo_ver", TagValue::from("3.0.1"))]);
        let regexes = HashMap::from([(
            "mongo_ver".to_owned(),
            "<PackageReference Include=\"MongoDB.Driver\" Version=\"([0-9|.]+)+\" />".to_owned(),
        )]);

        let result = render(&files, &env, Some(&regexes)).unwrap();
        assert_eq!(
            result[0].content,
            "<ItemGroup>\n   <PackageReference Include=\"MongoDB.Driver\" Version=\"3.0.1\" />\n   <PackageReference Include=\"AspNetCore.App\" Version=\"2.2.0\" />\n</ItemGroup>"
        );
    }

    #[test]
    fn regex_replaces_every_match() {
        let files = vec![TemplateFile::new(
            "file1",
            "<ItemGroup>\n   <PackageReference Include=\"Steeltoe.Common.Hosting\" Version=\"2.8.1\" />\n   <PackageReference Include=\"Steeltoe.Connector.EFCore\" Version=\"2.2.0\" />\n</ItemGroup>",
        )];
        let env = env(&[("steeltoe_ver", TagValue::from("3.0.1"))]);
        let regexes = HashMap::from([(
            "steeltoe_ver".to_owned(),
            "<PackageReference Include=\"Steeltoe.[\\w|.]+\" Version=\"([0-9|.]+)+\" />".to_owned(),
        )]);

        let result = render(&files, &env, Some(&regexes)).unwrap();
        assert_eq!(
            result[0].content,
            "<ItemGroup>\n   <PackageReference Include=\"Steeltoe.Common.Hosting\" Version=\"3.0.1\" />\n   <PackageReference Include=\"Steeltoe.Connector.EFCore\" Version=\"3.0.1\" />\n</ItemGroup>"
        );
    }

    #[test]
    fn regex_pass_never_touches_names_or_unmatched_files() {
        let files = vec![
            TemplateFile::new("versioned", "v = \"1.0\""),
            TemplateFile::new("plain", "nothing to see"),
        ];
        let env = env(&[("ver", TagValue::from("2.0"))]);
        let regexes = HashMap::from([("ver".to_owned(), "v = \"([0-9.]+)\"".to_owned())]);

        let result = render(&files, &env, Some(&regexes)).unwrap();
        assert_eq!(by_name(&result, "versioned").content, "v = \"2.0\"");
        assert_eq!(by_name(&result, "plain").content, "nothing to see");
    }

    #[test]
    fn invalid_regex_is_a_pattern_error() {
        let files = vec![TemplateFile::new("f", "content")];
        let env = env(&[("bad", TagValue::from("x"))]);
        let regexes = HashMap::from([("bad".to_owned(), "([unclosed".to_owned())]);

        let err = render(&files, &env, Some(&regexes)).unwrap_err();
        match err {
            DomainError::Pattern { key, pattern } => {
                assert_eq!(key, "bad");
                assert_eq!(pattern, "([unclosed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn input_batch_is_never_mutated() {
        let files = vec![TemplateFile::new("projectName", "#if x\ngone\n#endif\n")];
        let env = env(&[
            ("projectName", TagValue::from("App")),
            ("x", TagValue::Bool(false)),
        ]);

        let _ = render(&files, &env, None).unwrap();
        assert_eq!(files[0].name, "projectName");
        assert_eq!(files[0].content, "#if x\ngone\n#endif\n");
    }
}
