//! Configuration discovery and effective settings resolution.
//!
//! Reads `rearrange.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `settings`: none (built-in arrangement rules)
//! - `patterns`: `**/*.tree.json`
//! - `output`: `human`
//! - `lint.level`: `error`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::rules::RuleSet;
use crate::serializer::SettingsSerializer;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names, in lookup order.
pub const CONFIG_FILES: [&str; 3] = ["rearrange.toml", "rearrange.yaml", "rearrange.yml"];

/// Tree documents linted when no pattern is given.
pub const DEFAULT_PATTERN: &str = "**/*.tree.json";

#[derive(Debug, Default, Deserialize, Clone)]
/// Lint reporting section under `[lint]`.
pub struct LintCfg {
    /// Severity of order violations: `error|warning|info`.
    pub level: Option<String>,
    /// Replacement message for order violations.
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `rearrange.toml|yaml`.
pub struct RearrangeConfig {
    /// Arrangement settings file, relative to the repository root.
    pub settings: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub output: Option<String>,
    #[serde(default)]
    pub lint: Option<LintCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub settings: Option<String>,
    pub patterns: Vec<String>,
    pub output: String,
    pub level: String,
    pub message: Option<String>,
}

impl Effective {
    /// Build the rule set named by `settings`, or the built-in one.
    pub fn rules(&self) -> Result<RuleSet, ConfigError> {
        match &self.settings {
            Some(rel) => SettingsSerializer::default().load(&self.repo_root.join(rel)),
            None => Ok(RuleSet::default()),
        }
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `rearrange.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|name| cur.join(name).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RearrangeConfig` from `rearrange.toml` or `rearrange.yaml|yml`.
///
/// An unreadable or malformed file counts as absent.
pub fn load_config(root: &Path) -> Option<RearrangeConfig> {
    let path = CONFIG_FILES.iter().map(|name| root.join(name)).find(|p| p.exists())?;
    let s = fs::read_to_string(&path).ok()?;
    let parsed = if path.extension().is_some_and(|e| e == "toml") {
        toml::from_str::<RearrangeConfig>(&s).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<RearrangeConfig>(&s).map_err(|e| e.to_string())
    };
    match parsed {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "ignoring malformed config");
            None
        }
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_settings: Option<&str>,
    cli_output: Option<&str>,
    cli_patterns: &[String],
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let settings = cli_settings.map(str::to_string).or(cfg.settings);
    let patterns = if cli_patterns.is_empty() {
        cfg.patterns
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_PATTERN.to_string()])
    } else {
        cli_patterns.to_vec()
    };
    let output = cli_output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let lint = cfg.lint.unwrap_or_default();

    Effective {
        repo_root,
        settings,
        patterns,
        output,
        level: lint.level.unwrap_or_else(|| "error".to_string()),
        message: lint.message,
    }
}
