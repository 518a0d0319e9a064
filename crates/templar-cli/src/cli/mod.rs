//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value parsing.  No rendering logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "templar",
    bin_name = "templar",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Render project templates with tags and conditional blocks",
    long_about = "Templar renders project templates: literal tag substitution, \
                  #if / #else / #endif conditional blocks, computed tags, and \
                  conditional file exclusion.",
    after_help = "EXAMPLES:\n\
        \x20 templar render ./templates/rest-api ./my-api --name my-api\n\
        \x20 templar render ./templates/rest-api ./my-api --set useDocker=true\n\
        \x20 templar render ./templates/rest-api ./out --dry-run\n\
        \x20 templar tags ./templates/rest-api",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a template into an output directory.
    #[command(
        visible_alias = "r",
        about = "Render a template",
        after_help = "EXAMPLES:\n\
            \x20 templar render ./templates/rest-api ./my-api --name my-api\n\
            \x20 templar render ./templates/rest-api ./my-api --set useDocker=true --set port=9000\n\
            \x20 templar render ./templates/rest-api ./out --dry-run"
    )]
    Render(RenderArgs),

    /// Show the tags a template declares.
    #[command(
        visible_alias = "t",
        about = "List a template's tags",
        after_help = "EXAMPLES:\n\
            \x20 templar tags ./templates/rest-api"
    )]
    Tags(TagsArgs),
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `templar render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template directory.
    #[arg(value_name = "TEMPLATE", help = "Template directory")]
    pub template: PathBuf,

    /// Output directory for rendered files.
    #[arg(value_name = "OUTPUT", help = "Output directory")]
    pub output: PathBuf,

    /// Project name (shorthand for `--set projectName=<NAME>`).
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Project name")]
    pub name: Option<String>,

    /// Tag value overrides, repeatable.
    ///
    /// `true` / `false` become booleans, numbers become numbers, anything
    /// else is a string.  Keys declared as conditional tags must be boolean.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        help = "Override a tag value (repeatable)"
    )]
    pub set: Vec<String>,

    /// Describe what would be written without writing it.
    #[arg(long = "dry-run", help = "Show rendered files without writing")]
    pub dry_run: bool,

    /// Write into a non-empty output directory.
    #[arg(long = "force", help = "Allow writing into a non-empty directory")]
    pub force: bool,
}

// ── tags ──────────────────────────────────────────────────────────────────────

/// Arguments for `templar tags`.
#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Template directory.
    #[arg(value_name = "TEMPLATE", help = "Template directory")]
    pub template: PathBuf,
}
