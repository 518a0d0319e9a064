//! Implementation of the `templar render` command.
//!
//! Responsibility: translate CLI arguments into a `TemplateRef` plus tag
//! overrides, call the core services, and display results.
//!
//! Dispatch sequence:
//! 1. Validate the template directory
//! 2. Load and normalize metadata (native or foreign schema)
//! 3. Build typed tag overrides from `--name` / `--set`
//! 4. Resolve tags (defaults, overrides, computed) and the exclusion pattern
//! 5. Collect and render the template files
//! 6. Early-exit listing on `--dry-run`, otherwise write the output

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use templar_adapters::{DotNetMetadataMapper, FileExcluder, LocalOutput, LocalTemplateSource};
use templar_core::application::ports::TemplateRef;
use templar_core::application::{MetadataService, RenderService};
use templar_core::domain::{TagEnvironment, TagValue, TemplateMetadata};
use templar_core::error::TemplarError;

use crate::{
    cli::{GlobalArgs, RenderArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `templar render` command.
#[instrument(skip_all, fields(template = %args.template.display()))]
pub fn execute(
    args: RenderArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Validate the template directory
    if !args.template.is_dir() {
        return Err(CliError::TemplateNotFound {
            path: args.template,
        });
    }
    let template = template_ref(&args);

    // 2. Load metadata
    let metadata_service = MetadataService::new(vec![Box::new(LocalTemplateSource::new())])
        .with_mapper(Box::new(DotNetMetadataMapper::new()));
    let metadata = metadata_service.load(&template)?;
    debug!(
        has_metadata = metadata.is_some(),
        overrides = args.set.len(),
        "metadata loaded"
    );

    // 3 + 4. Overrides and resolution
    let overrides = build_overrides(&args, &config, metadata.as_ref())?;
    let renderer = RenderService::new();
    let resolution = renderer.prepare(metadata.as_ref(), &overrides)?;

    // 5. Collect and render
    let source = LocalTemplateSource::new();
    let excluder = FileExcluder::new(&resolution.exclusion_pattern);
    let files = source
        .collect_files(&template.source_url, None, &excluder)
        .map_err(TemplarError::from)?;
    let rendered = renderer.render(&files, &resolution)?;

    // 6. Dry run: describe but do not write.
    if args.dry_run {
        output.header(&format!(
            "Dry run: {} file(s) would be written to {}",
            rendered.len(),
            args.output.display(),
        ))?;
        for file in &rendered {
            output.print(&format!("  {}", file.name))?;
        }
        if !resolution.exclusion_pattern.is_empty() && global.verbose > 0 {
            output.info(&format!("Excluded: {}", resolution.exclusion_pattern))?;
        }
        return Ok(());
    }

    ensure_writable(&args)?;
    LocalOutput::new(&args.output)
        .write_all(&rendered)
        .map_err(TemplarError::from)?;

    info!(
        files = rendered.len(),
        output = %args.output.display(),
        "render complete"
    );
    output.success(&format!(
        "Rendered {} file(s) into {}",
        rendered.len(),
        args.output.display(),
    ))?;
    Ok(())
}

fn template_ref(args: &RenderArgs) -> TemplateRef {
    let name = args
        .template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    TemplateRef {
        name,
        source_type: "filesystem".into(),
        source_url: args.template.display().to_string(),
        source_directory: None,
    }
}

/// Build the typed override environment from `--name` and `--set`.
///
/// Typing rules: a key the template declares as conditional must be given
/// `true` or `false`; otherwise `true`/`false` become booleans, parseable
/// numbers become numbers, and everything else stays a string.
fn build_overrides(
    args: &RenderArgs,
    config: &AppConfig,
    metadata: Option<&TemplateMetadata>,
) -> CliResult<TagEnvironment> {
    let mut env = TagEnvironment::new();

    // Project name: flag, then config, then the baseline for templates that
    // declare no string tags of their own.
    let declares_tags = metadata.is_some_and(|m| !m.tags.is_empty());
    let name = args
        .name
        .clone()
        .or_else(|| config.defaults.project_name.clone());
    if let Some(name) = name {
        env.insert(MetadataService::PROJECT_NAME_KEY, TagValue::Str(name));
    } else if !declares_tags {
        env.insert(
            MetadataService::PROJECT_NAME_KEY,
            TagValue::Str(MetadataService::DEFAULT_PROJECT_NAME.to_owned()),
        );
    }

    let conditional_keys: HashSet<&str> = metadata
        .iter()
        .flat_map(|m| m.conditional_tags.iter().map(|t| t.key.as_str()))
        .collect();

    for pair in &args.set {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(CliError::InvalidTagValue {
                key: pair.clone(),
                reason: "expected KEY=VALUE".into(),
            });
        };
        if key.is_empty() {
            return Err(CliError::InvalidTagValue {
                key: pair.clone(),
                reason: "the key may not be empty".into(),
            });
        }

        let value = if conditional_keys.contains(key) {
            match raw {
                _ if raw.eq_ignore_ascii_case("true") => TagValue::Bool(true),
                _ if raw.eq_ignore_ascii_case("false") => TagValue::Bool(false),
                other => {
                    return Err(CliError::InvalidTagValue {
                        key: key.to_owned(),
                        reason: format!("expected true or false, got `{other}`"),
                    });
                }
            }
        } else if raw.eq_ignore_ascii_case("true") {
            TagValue::Bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            TagValue::Bool(false)
        } else if let Ok(n) = raw.parse::<f64>() {
            TagValue::Num(n)
        } else {
            TagValue::Str(raw.to_owned())
        };
        env.insert(key, value);
    }

    Ok(env)
}

/// Refuse to clobber a non-empty output directory without `--force`.
fn ensure_writable(args: &RenderArgs) -> CliResult<()> {
    if args.force || !args.output.exists() {
        return Ok(());
    }
    let mut entries = std::fs::read_dir(&args.output)?;
    if entries.next().is_some() {
        return Err(CliError::OutputNotEmpty {
            path: args.output.clone(),
        });
    }
    Ok(())
}
