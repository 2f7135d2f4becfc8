//! rearrange CLI binary entry point.
//! Delegates to the library for lint/arrange/insert/rules and prints results.

use clap::Parser;
use rearrange::cli::{Cli, Commands};
use rearrange::config::{self, Effective};
use rearrange::lint::{self, LintOptions};
use rearrange::models::tree::SyntaxTree;
use rearrange::order::resolve_all;
use rearrange::rearranger::{Rearranger, StdRearranger};
use rearrange::serializer::SettingsFormat;
use rearrange::utils::{error_prefix, info_prefix, note_prefix};
use rearrange::{output, plan_insertion_in, RuleSet};
use std::path::Path;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Enable with `RUST_LOG=rearrange=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", error_prefix(), message);
    std::process::exit(2);
}

fn note_missing_config(eff: &Effective) {
    if config::load_config(&eff.repo_root).is_none() && eff.output != "json" {
        eprintln!("{} No rearrange.toml found; using defaults.", note_prefix());
    }
}

fn load_rules(eff: &Effective) -> RuleSet {
    eff.rules().unwrap_or_else(|err| fail(format!("invalid arrangement settings: {err}")))
}

fn load_tree(file: &str, host: &StdRearranger) -> SyntaxTree {
    let tree = SyntaxTree::load(Path::new(file)).unwrap_or_else(|err| fail(err));
    if !host.supports(&tree.language) {
        fail(format!(
            "language `{}` is not supported (supported: {})",
            tree.language,
            host.languages().join(", ")
        ));
    }
    tree
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let host = StdRearranger::all();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            repo_root,
            settings,
            output,
            patterns,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                settings.as_deref(),
                output.as_deref(),
                &patterns,
            );
            note_missing_config(&eff);
            let rules = load_rules(&eff);
            if patterns.is_empty() && eff.output != "json" {
                eprintln!("{} Using patterns: [{}]", info_prefix(), eff.patterns.join(", "));
            }
            let opts = LintOptions {
                level: eff.level.clone(),
                message: eff.message.clone(),
            };
            let result = lint::run_lint(&eff.repo_root, &eff.patterns, &rules, &host, &opts);
            output::print_lint(&result, &eff.output);
            if result.summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Arrange {
            repo_root,
            file,
            ranges,
            settings,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                settings.as_deref(),
                output.as_deref(),
                &[],
            );
            let rules = load_rules(&eff);
            let tree = load_tree(&file, &host);
            let document = tree.document(Path::new(&file));
            let ranges = if ranges.is_empty() { vec![tree.root.range] } else { ranges };
            let entries = host.parse(&tree.root, document.as_deref(), &ranges, &rules);
            let order = resolve_all(&entries, &rules);
            output::print_arrange(&order, &entries, &eff.output);
        }
        Commands::Insert {
            repo_root,
            file,
            new,
            ranges,
            settings,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                settings.as_deref(),
                output.as_deref(),
                &[],
            );
            let rules = load_rules(&eff);
            let tree = load_tree(&file, &host);
            let document = tree.document(Path::new(&file));
            let ranges = if ranges.is_empty() { vec![tree.root.range] } else { ranges };
            let plan = plan_insertion_in(&tree.root, document.as_deref(), &ranges, new, &rules);
            output::print_insertion(&plan, &eff.output);
        }
        Commands::Rules {
            repo_root,
            settings,
            expanded,
            format,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                settings.as_deref(),
                output.as_deref(),
                &[],
            );
            let rules = load_rules(&eff);
            if expanded {
                output::print_rules(&rules, &eff.output);
                return;
            }
            let format = format
                .as_deref()
                .map(str::parse::<SettingsFormat>)
                .transpose();
            let format = match format {
                Ok(f) => f.unwrap_or_default(),
                Err(err) => fail(err),
            };
            match host.serializer().serialize(&rules, format) {
                Ok(text) => print!("{}", text),
                Err(err) => fail(err),
            }
        }
    }
}
