//! Output rendering for lint, arrange, insert, and rules commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON forms are built
//! by pure `compose_*` functions so tests can inspect their shape.

use crate::entry::{display_range, ArrangementEntry};
use crate::insert::Insertion;
use crate::models::LintResult;
use crate::order::CanonicalOrder;
use crate::rules::RuleSet;
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::collections::HashMap;
use text_size::TextRange;

fn print_json(value: &JsonVal) {
    println!("{value:#}");
}

/// Print lint results in the requested format.
pub fn print_lint(res: &LintResult, output: &str) {
    if output == "json" {
        return print_json(&compose_lint_json(res));
    }
    let color = use_colors(output);
    for is in &res.issues {
        let (icon, sev) = match is.severity.as_str() {
            "error" => ("✖", "⟦error⟧"),
            "warning" | "warn" => ("▲", "⟦warn⟧"),
            _ => ("◆", "⟦info⟧"),
        };
        if color {
            let (icon, sev) = match is.severity.as_str() {
                "error" => (icon.red().to_string(), sev.red().bold().to_string()),
                "warning" | "warn" => (icon.yellow().to_string(), sev.yellow().bold().to_string()),
                _ => (icon.blue().to_string(), sev.blue().bold().to_string()),
            };
            println!(
                "{} {} {}:{} ❲{}❳ {}",
                icon,
                sev,
                is.file.bold(),
                is.range,
                is.rule,
                is.message
            );
        } else {
            println!("{} {} {}:{} ❲{}❳ {}", icon, sev, is.file, is.range, is.rule, is.message);
        }
    }
    let summary = format!(
        "Summary: errors={} warnings={} infos={} files={}",
        res.summary.errors, res.summary.warnings, res.summary.infos, res.summary.files
    );
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

/// Print a canonical order, naming entries from `entries` where known.
pub fn print_arrange(order: &CanonicalOrder, entries: &[ArrangementEntry], output: &str) {
    if output == "json" {
        return print_json(&compose_arrange_json(order, entries));
    }
    if order.is_empty() {
        println!("no entries in range");
        return;
    }
    let color = use_colors(output);
    let lookup = index(entries);
    for section in &order.sections {
        let header = format!("scope {}", display_range(section.parent));
        if color {
            println!("{}", header.cyan().bold());
        } else {
            println!("{}", header);
        }
        for (i, range) in section.entries.iter().enumerate() {
            let label = lookup
                .get(range)
                .map(|e| e.to_string())
                .unwrap_or_else(|| display_range(*range));
            let moved = lookup.get(range).is_some_and(|e| e.ordinal != i);
            if moved && color {
                println!("  {:>3}. {} {}", i + 1, label, "(moved)".yellow());
            } else if moved {
                println!("  {:>3}. {} (moved)", i + 1, label);
            } else {
                println!("  {:>3}. {}", i + 1, label);
            }
        }
    }
}

/// Print an insertion plan.
pub fn print_insertion(plan: &Insertion, output: &str) {
    if output == "json" {
        return print_json(&compose_insertion_json(plan));
    }
    match plan {
        Insertion::At(index) => println!("insert at {}", index),
        Insertion::Indeterminate if use_colors(output) => println!("{}", "indeterminate".yellow()),
        Insertion::Indeterminate => println!("indeterminate"),
    }
}

/// Print the flattened rule list with ordinals.
pub fn print_rules(rules: &RuleSet, output: &str) {
    if output == "json" {
        return print_json(&compose_rules_json(rules));
    }
    let color = use_colors(output);
    for (ordinal, rule) in rules.rules().iter().enumerate() {
        let origin = rule.origin().map(|a| format!(" [{}]", a)).unwrap_or_default();
        let order = if rule.order().is_keep() { "" } else { " (by name)" };
        if color {
            println!("{:>3}. {}{}{}", ordinal, rule.describe(), order, origin.bright_black());
        } else {
            println!("{:>3}. {}{}{}", ordinal, rule.describe(), order, origin);
        }
    }
    if !rules.groupings().is_empty() {
        let names: Vec<&str> = rules.groupings().iter().map(|g| g.as_str()).collect();
        println!("groupings: {}", names.join(", "));
    }
}

fn index(entries: &[ArrangementEntry]) -> HashMap<TextRange, &ArrangementEntry> {
    entries.iter().map(|e| (e.range, e)).collect()
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult) -> JsonVal {
    json!({ "issues": res.issues, "summary": res.summary })
}

/// Compose arrange JSON object (pure).
pub fn compose_arrange_json(order: &CanonicalOrder, entries: &[ArrangementEntry]) -> JsonVal {
    let lookup = index(entries);
    let sections: Vec<JsonVal> = order
        .sections
        .iter()
        .map(|s| {
            let items: Vec<JsonVal> = s
                .entries
                .iter()
                .map(|r| {
                    let entry = lookup.get(r);
                    json!({
                        "range": display_range(*r),
                        "kind": entry.map(|e| e.kind.as_str()),
                        "name": entry.and_then(|e| e.name.as_deref()),
                        "from": entry.map(|e| e.ordinal),
                    })
                })
                .collect();
            json!({ "parent": display_range(s.parent), "entries": items })
        })
        .collect();
    json!({ "sections": sections })
}

/// Compose insertion JSON object (pure).
pub fn compose_insertion_json(plan: &Insertion) -> JsonVal {
    match plan {
        Insertion::At(index) => json!({ "index": index, "indeterminate": false }),
        Insertion::Indeterminate => json!({ "index": null, "indeterminate": true }),
    }
}

/// Compose flattened rules JSON object (pure).
pub fn compose_rules_json(rules: &RuleSet) -> JsonVal {
    let items: Vec<JsonVal> = rules
        .rules()
        .iter()
        .enumerate()
        .map(|(ordinal, rule)| {
            json!({
                "ordinal": ordinal,
                "rule": rule.describe(),
                "order": rule.order(),
                "alias": rule.origin(),
            })
        })
        .collect();
    json!({ "rules": items, "groupings": rules.groupings() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::models::{Issue, Summary};
    use crate::order::Section;
    use text_size::TextSize;

    fn r(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_compose_lint_json_shape() {
        let res = LintResult {
            issues: vec![Issue {
                file: "a.tree.json".into(),
                rule: "order".into(),
                severity: "warning".into(),
                range: "3..9".into(),
                message: "msg".into(),
            }],
            summary: Summary {
                errors: 0,
                warnings: 1,
                infos: 0,
                files: 1,
            },
        };
        let out = compose_lint_json(&res);
        assert_eq!(out["summary"]["warnings"], 1);
        assert_eq!(out["issues"][0]["range"], "3..9");
    }

    #[test]
    fn test_compose_arrange_json_names_entries() {
        let entries = vec![
            ArrangementEntry::new(EntryKind::Field, r(10, 20)).with_name("b").at(0),
            ArrangementEntry::new(EntryKind::Field, r(30, 40)).with_name("a").at(1),
        ];
        let order = CanonicalOrder {
            sections: vec![Section {
                parent: r(0, 50),
                entries: vec![r(30, 40), r(10, 20), r(41, 42)],
            }],
        };
        let out = compose_arrange_json(&order, &entries);
        let first = &out["sections"][0];
        assert_eq!(first["parent"], "0..50");
        assert_eq!(first["entries"][0]["name"], "a");
        assert_eq!(first["entries"][0]["from"], 1);
        assert!(first["entries"][2]["name"].is_null());
    }

    #[test]
    fn test_compose_insertion_and_rules_json() {
        assert_eq!(compose_insertion_json(&Insertion::At(2))["index"], 2);
        assert_eq!(compose_insertion_json(&Insertion::Indeterminate)["indeterminate"], true);

        let rules = compose_rules_json(&RuleSet::default());
        assert_eq!(rules["rules"][0]["rule"], "modifier = public");
        assert_eq!(rules["rules"][3]["alias"], "visibility");
        assert_eq!(rules["groupings"][0], "getters-and-setters");
    }
}
