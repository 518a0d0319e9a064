//! Implementation of the `templar tags` command.
//!
//! Lists the tags a template declares, so users know what `--set` accepts.

use tracing::instrument;

use templar_adapters::{DotNetMetadataMapper, LocalTemplateSource};
use templar_core::application::ports::TemplateRef;
use templar_core::application::MetadataService;

use crate::{
    cli::TagsArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `templar tags` command.
#[instrument(skip_all, fields(template = %args.template.display()))]
pub fn execute(args: TagsArgs, output: OutputManager) -> CliResult<()> {
    if !args.template.is_dir() {
        return Err(CliError::TemplateNotFound {
            path: args.template,
        });
    }

    let name = args
        .template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let template = TemplateRef {
        name,
        source_type: "filesystem".into(),
        source_url: args.template.display().to_string(),
        source_directory: None,
    };

    let service = MetadataService::new(vec![Box::new(LocalTemplateSource::new())])
        .with_mapper(Box::new(DotNetMetadataMapper::new()));
    let Some(metadata) = service.load(&template)? else {
        output.info(&format!(
            "Template declares no tags; `{}` defaults to \"{}\"",
            MetadataService::PROJECT_NAME_KEY,
            MetadataService::DEFAULT_PROJECT_NAME,
        ))?;
        return Ok(());
    };

    if !metadata.tags.is_empty() {
        output.header("Tags")?;
        for tag in &metadata.tags {
            let regex = tag
                .regex
                .as_deref()
                .map(|r| format!("  [regex: {r}]"))
                .unwrap_or_default();
            output.print(&format!(
                "  {} = \"{}\"{regex}",
                tag.key, tag.default_value
            ))?;
        }
    }

    if !metadata.conditional_tags.is_empty() {
        output.header("Conditional tags")?;
        for tag in &metadata.conditional_tags {
            let mut line = format!("  {} = {}", tag.key, tag.default_value.unwrap_or(false));
            if !tag.files_to_include.is_empty() {
                line.push_str(&format!("  [files: {}]", tag.files_to_include));
            }
            output.print(&line)?;
        }
    }

    if !metadata.computed_tags.is_empty() {
        output.header("Computed tags")?;
        for tag in &metadata.computed_tags {
            output.print(&format!("  {} = {}", tag.key, tag.expression))?;
        }
    }

    if metadata.is_empty() {
        output.info("Template metadata declares no tags")?;
    }

    Ok(())
}
