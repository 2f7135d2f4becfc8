//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};
use text_size::{TextRange, TextSize};

#[derive(Parser)]
#[command(
    name = "rearrange",
    version,
    about = "Rule-based arrangement of attributes and class members",
    long_about = "rearrange computes the canonical order of orderable elements (markup attributes, class members) in syntax trees supplied as JSON documents.\n\nConfiguration precedence: CLI > rearrange.toml > defaults.",
    after_help = "Examples:\n  rearrange lint\n  rearrange arrange --file trees/App.tree.json --range 120..480\n  rearrange insert --file trees/Foo.tree.json --new 310..342\n  rearrange rules --expanded",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current rearrange version.")]
    Version,
    /// Lint tree documents for order and spacing
    #[command(
        about = "Run lint checks",
        long_about = "Report entries out of canonical order, and blank-line mismatches when spacing settings are configured. Severity levels contribute to CI exits.",
        after_help = "Examples:\n  rearrange lint\n  rearrange lint 'trees/**/*.json' --output json"
    )]
    Lint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Arrangement settings file (toml|yaml|json)")]
        settings: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Glob patterns of tree documents (default: **/*.tree.json)")]
        patterns: Vec<String>,
    },
    /// Print the canonical order of a tree
    #[command(
        about = "Compute canonical order",
        long_about = "Extract the orderable entries touching the given ranges and print their canonical order per scope. Without --range the whole tree is arranged.",
        after_help = "Examples:\n  rearrange arrange --file trees/App.tree.json\n  rearrange arrange --file trees/App.tree.json --range 120..480 --output json"
    )]
    Arrange {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Tree document (JSON)")]
        file: String,
        #[arg(
            long = "range",
            value_parser = parse_range,
            help = "Restrict to a text range START..END (repeatable)"
        )]
        ranges: Vec<TextRange>,
        #[arg(long, help = "Arrangement settings file (toml|yaml|json)")]
        settings: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Plan where a new element goes
    #[command(
        about = "Plan an insertion",
        long_about = "Compute the index among existing entries at which the single element inside --new belongs. Prints `indeterminate` when that range does not hold exactly one element.",
        after_help = "Examples:\n  rearrange insert --file trees/Foo.tree.json --new 310..342"
    )]
    Insert {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Tree document (JSON)")]
        file: String,
        #[arg(long, value_parser = parse_range, help = "Range of the new element START..END")]
        new: TextRange,
        #[arg(
            long = "range",
            value_parser = parse_range,
            help = "Existing entries to consider START..END (repeatable)"
        )]
        ranges: Vec<TextRange>,
        #[arg(long, help = "Arrangement settings file (toml|yaml|json)")]
        settings: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Show arrangement rules
    #[command(
        about = "Show rules",
        long_about = "Print the effective arrangement settings, or with --expanded the flattened rule list with ordinals.",
        after_help = "Examples:\n  rearrange rules --format yaml\n  rearrange rules --expanded --output json"
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Arrangement settings file (toml|yaml|json)")]
        settings: Option<String>,
        #[arg(
            long,
            action = clap::ArgAction::SetTrue,
            help = "Print flattened rules instead of settings"
        )]
        expanded: bool,
        #[arg(long, help = "Settings format: toml|yaml|json (default: toml)")]
        format: Option<String>,
        #[arg(long, help = "Output mode for --expanded: human|json (default: human)")]
        output: Option<String>,
    },
}

/// Parse `START..END` into a text range.
pub fn parse_range(s: &str) -> Result<TextRange, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got `{s}`"))?;
    let start: u32 = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start offset `{start}`"))?;
    let end: u32 = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end offset `{end}`"))?;
    if start > end {
        return Err(format!("range start {start} is after end {end}"));
    }
    Ok(TextRange::new(TextSize::new(start), TextSize::new(end)))
}
