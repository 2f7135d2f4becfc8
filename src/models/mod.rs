//! Shared data models: tree documents, arrangement settings, lint output.

pub mod settings;
pub mod tree;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
/// A single lint issue with severity and location.
pub struct Issue {
    pub file: String,
    pub rule: String,
    pub severity: String,
    /// Text range as `start..end`, `*` for whole-file issues.
    pub range: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
/// Aggregated lint summary used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub files: usize,
}

impl Summary {
    /// Count issues per severity; anything not error or warning is info.
    pub fn tally(issues: &[Issue], files: usize) -> Self {
        let mut summary = Summary {
            files,
            ..Summary::default()
        };
        for is in issues {
            match is.severity.as_str() {
                "error" => summary.errors += 1,
                "warning" | "warn" => summary.warnings += 1,
                _ => summary.infos += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
/// Lint results container.
pub struct LintResult {
    pub issues: Vec<Issue>,
    pub summary: Summary,
}
