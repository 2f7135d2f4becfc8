//! Lint runner: order and spacing checks over tree documents.
//!
//! Produces a `LintResult` with issues and a summary. Order violations use
//! the configured `[lint] level` and `message`; spacing mismatches are only
//! reported when spacing settings exist and the tree references its source
//! text.

use crate::entry::{display_range, ArrangementEntry};
use crate::models::tree::SyntaxTree;
use crate::models::{Issue, LintResult, Summary};
use crate::order::{by_scope, resolve, violations};
use crate::rearranger::Rearranger;
use crate::rules::RuleSet;
use crate::spacing::Spacing;
use glob::glob;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use text_size::TextRange;

/// Severity and wording of order violations.
#[derive(Debug, Clone)]
pub struct LintOptions {
    pub level: String,
    pub message: Option<String>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            message: None,
        }
    }
}

/// Run lint across tree documents matched by `patterns` under `repo_root`.
///
/// Files are linted in parallel; issues are sorted by file, then range,
/// then message so the output is deterministic.
pub fn run_lint(
    repo_root: &Path,
    patterns: &[String],
    rules: &RuleSet,
    rearranger: &(impl Rearranger + Sync),
    opts: &LintOptions,
) -> LintResult {
    let mut issues: Vec<Issue> = Vec::new();
    let mut targets: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in patterns {
        let pattern = repo_root.join(pat).to_string_lossy().to_string();
        match glob(&pattern) {
            Ok(paths) => targets.extend(paths.flatten()),
            Err(err) => issues.push(Issue {
                file: pat.clone(),
                rule: "bad-pattern".into(),
                severity: "error".into(),
                range: "*".into(),
                message: format!("Invalid glob pattern: {}", err.msg),
            }),
        }
    }
    let targets: Vec<PathBuf> = targets.into_iter().filter(|p| p.is_file()).collect();
    tracing::debug!(files = targets.len(), "linting tree documents");

    let per_file: Vec<Vec<Issue>> = targets
        .par_iter()
        .map(|path| lint_file(repo_root, path, rules, rearranger, opts))
        .collect();
    let mut combined: Vec<Issue> = per_file.into_iter().flatten().collect();
    combined.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then_with(|| range_start(&a.range).cmp(&range_start(&b.range)))
            .then(a.message.cmp(&b.message))
    });
    issues.extend(combined);

    let summary = Summary::tally(&issues, targets.len());
    LintResult { issues, summary }
}

fn range_start(range: &str) -> Option<u32> {
    range.split_once("..").and_then(|(s, _)| s.parse().ok())
}

/// Path of `path` relative to the repository root, for display.
fn relative(repo_root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, repo_root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Lint a single tree document.
pub fn lint_file(
    repo_root: &Path,
    path: &Path,
    rules: &RuleSet,
    rearranger: &impl Rearranger,
    opts: &LintOptions,
) -> Vec<Issue> {
    let file = relative(repo_root, path);
    let tree = match SyntaxTree::load(path) {
        Ok(t) => t,
        Err(err) => {
            return vec![Issue {
                file,
                rule: "load-tree".into(),
                severity: "error".into(),
                range: "*".into(),
                message: err.to_string(),
            }];
        }
    };
    if !rearranger.supports(&tree.language) {
        return vec![Issue {
            file,
            rule: "unsupported-language".into(),
            severity: "warning".into(),
            range: "*".into(),
            message: format!(
                "Language `{}` is not supported (supported: {}); skipped",
                tree.language,
                rearranger.languages().join(", ")
            ),
        }];
    }

    let document = tree.document(path);
    let entries = rearranger.parse(&tree.root, document.as_deref(), &[tree.root.range], rules);
    tracing::debug!(file = %file, entries = entries.len(), "extracted");

    let mut issues = Vec::new();
    for (parent, scope) in by_scope(&entries) {
        let canonical: Vec<TextRange> = resolve(&scope, rules).iter().map(|e| e.range).collect();
        let found = violations(&scope, &canonical);
        if found.is_empty() {
            issues.extend(spacing_issues(&file, parent, &scope, rules, rearranger, opts));
            continue;
        }
        let by_range: HashMap<TextRange, &ArrangementEntry> =
            scope.iter().map(|e| (e.range, *e)).collect();
        for v in found {
            let (Some(entry), Some(before)) = (by_range.get(&v.entry), by_range.get(&v.before))
            else {
                continue;
            };
            issues.push(Issue {
                file: file.clone(),
                rule: "order".into(),
                severity: opts.level.clone(),
                range: display_range(v.entry),
                message: opts
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{entry} should come before {before}")),
            });
        }
    }
    issues
}

fn spacing_issues(
    file: &str,
    parent: TextRange,
    scope: &[&ArrangementEntry],
    rules: &RuleSet,
    rearranger: &impl Rearranger,
    opts: &LintOptions,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut previous: Option<&ArrangementEntry> = None;
    for &entry in scope {
        let advice = rearranger.blank_lines(rules, parent, previous, entry);
        previous = Some(entry);
        let (Spacing::Lines(want), Some(found)) = (advice, entry.blank_lines_before) else {
            continue;
        };
        if want != found {
            issues.push(Issue {
                file: file.to_string(),
                rule: "spacing".into(),
                severity: opts.level.clone(),
                range: display_range(entry.range),
                message: format!("Expected {want} blank line(s) before {entry}, found {found}"),
            });
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{Settings, SpacingSettings};
    use crate::rearranger::StdRearranger;
    use std::fs;
    use tempfile::tempdir;

    const UNSORTED: &str = r#"{
  "language": "java",
  "root": { "kind": "class", "range": [0, 60], "name": "A", "children": [
    { "kind": "field", "range": [10, 20], "name": "secret", "modifiers": ["private"] },
    { "kind": "field", "range": [30, 40], "name": "shown", "modifiers": ["public"] }
  ] }
}"#;

    fn write(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    fn lint(root: &Path, rules: &RuleSet, opts: &LintOptions) -> LintResult {
        run_lint(
            root,
            &["trees/*.json".to_string()],
            rules,
            &StdRearranger::all(),
            opts,
        )
    }

    #[test]
    fn test_reports_order_violation() {
        let dir = tempdir().unwrap();
        write(dir.path(), "trees/a.json", UNSORTED);
        let res = lint(dir.path(), &RuleSet::default(), &LintOptions::default());
        assert_eq!(res.summary.files, 1);
        assert_eq!(res.summary.errors, 1);
        let issue = &res.issues[0];
        assert_eq!(issue.file, "trees/a.json");
        assert_eq!(issue.rule, "order");
        assert_eq!(issue.range, "30..40");
        assert_eq!(issue.message, "field `shown` should come before field `secret`");
    }

    #[test]
    fn test_level_and_message_overrides() {
        let dir = tempdir().unwrap();
        write(dir.path(), "trees/a.json", UNSORTED);
        let opts = LintOptions {
            level: "warning".into(),
            message: Some("sort members".into()),
        };
        let res = lint(dir.path(), &RuleSet::default(), &opts);
        assert_eq!(res.summary.errors, 0);
        assert_eq!(res.summary.warnings, 1);
        assert_eq!(res.issues[0].message, "sort members");
    }

    #[test]
    fn test_unsupported_and_broken_trees() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "trees/b.json",
            r#"{ "language": "cobol", "root": { "kind": "file", "range": [0, 0] } }"#,
        );
        write(dir.path(), "trees/c.json", "{ nope");
        let res = lint(dir.path(), &RuleSet::default(), &LintOptions::default());
        let rules: Vec<&str> = res.issues.iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(rules, vec!["unsupported-language", "load-tree"]);
        assert_eq!(
            res.issues[0].message,
            "Language `cobol` is not supported (supported: vue, html, java, kotlin, typescript); skipped"
        );
        assert_eq!(res.summary.errors, 1);
        assert_eq!(res.summary.warnings, 1);
    }

    #[test]
    fn test_spacing_checked_against_document() {
        let dir = tempdir().unwrap();
        let src = "class A {\n  public int a;\n  public int b;\n\n  private int c;\n}\n";
        let at = |s: &str| src.find(s).unwrap();
        let (a, b, c) = (at("public int a"), at("public int b"), at("private int c"));
        let tree = format!(
            r#"{{ "language": "java", "source": "A.java", "root": {{ "kind": "class", "range": [0, {len}], "children": [
  {{ "kind": "field", "range": [{a}, {ae}], "name": "a", "modifiers": ["public"] }},
  {{ "kind": "field", "range": [{b}, {be}], "name": "b", "modifiers": ["public"] }},
  {{ "kind": "field", "range": [{c}, {ce}], "name": "c", "modifiers": ["private"] }}
] }} }}"#,
            len = src.len(),
            ae = a + 13,
            be = b + 13,
            ce = c + 14,
        );
        write(dir.path(), "trees/A.json", &tree);
        write(dir.path(), "trees/A.java", src);

        let spaced = |between: usize| {
            RuleSet::from_settings(Settings {
                spacing: Some(SpacingSettings {
                    leading: None,
                    between_rules: Some(between),
                    within_rule: Some(0),
                }),
                ..Settings::default()
            })
            .unwrap()
        };
        let ok = lint(dir.path(), &spaced(1), &LintOptions::default());
        assert!(ok.issues.is_empty());
        let bad = lint(dir.path(), &spaced(2), &LintOptions::default());
        assert_eq!(bad.issues.len(), 1);
        assert_eq!(bad.issues[0].rule, "spacing");
        assert_eq!(bad.issues[0].message, "Expected 2 blank line(s) before field `c`, found 1");
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let dir = tempdir().unwrap();
        let res = run_lint(
            dir.path(),
            &["trees/[".to_string()],
            &RuleSet::default(),
            &StdRearranger::all(),
            &LintOptions::default(),
        );
        assert_eq!(res.issues[0].rule, "bad-pattern");
        assert_eq!(res.summary.files, 0);
    }
}
