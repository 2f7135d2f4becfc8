//! Insertion planning for a single new element.
//!
//! Existing entries are never moved: only the new entry is placed, at the
//! index that keeps the canonical order when the existing list already
//! follows it. The index refers to the existing entries with the new entry
//! itself left out.

use crate::entry::ArrangementEntry;
use crate::extract::extract;
use crate::models::tree::SyntaxNode;
use crate::order::resolve;
use crate::rules::RuleSet;
use serde::Serialize;
use std::collections::HashSet;
use text_size::TextRange;

/// Where a new entry goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "index")]
pub enum Insertion {
    At(usize),
    /// The new-element scope did not resolve to exactly one entry.
    Indeterminate,
}

/// Plan the insertion of the single entry in `new` among `existing`.
pub fn plan_insertion(
    existing: &[ArrangementEntry],
    new: &[ArrangementEntry],
    rules: &RuleSet,
) -> Insertion {
    let [candidate] = new else {
        tracing::debug!(candidates = new.len(), "insertion indeterminate");
        return Insertion::Indeterminate;
    };

    let others: Vec<&ArrangementEntry> = existing
        .iter()
        .filter(|e| e.range != candidate.range)
        .collect();
    let mut siblings: Vec<&ArrangementEntry> = others
        .iter()
        .copied()
        .filter(|e| e.parent == candidate.parent)
        .collect();
    let at_source = siblings
        .iter()
        .position(|e| e.range.start() > candidate.range.start())
        .unwrap_or(siblings.len());
    siblings.insert(at_source, candidate);

    let order = resolve(&siblings, rules);
    let Some(pos) = order.iter().position(|e| e.range == candidate.range) else {
        return Insertion::Indeterminate;
    };
    let index_of = |entry: &ArrangementEntry| others.iter().position(|e| e.range == entry.range);

    let index = if pos > 0 {
        index_of(order[pos - 1]).map(|i| i + 1)
    } else if let Some(next) = order.get(1) {
        index_of(*next)
    } else {
        // Only entry of its scope: right after the last entry before it.
        Some(
            others
                .iter()
                .position(|e| e.range.start() > candidate.range.start())
                .unwrap_or(others.len()),
        )
    };
    index.map_or(Insertion::Indeterminate, Insertion::At)
}

/// Entries of a new-element scope: the outermost entries inside `scope`.
/// Entries nested in another selected entry (members of a new nested
/// class) belong to it and are not candidates of their own.
pub fn new_element_entries(
    entries: Vec<ArrangementEntry>,
    scope: TextRange,
) -> Vec<ArrangementEntry> {
    let inside: Vec<ArrangementEntry> = entries
        .into_iter()
        .filter(|e| scope.contains_range(e.range))
        .collect();
    let owners: HashSet<TextRange> = inside.iter().map(|e| e.range).collect();
    inside
        .into_iter()
        .filter(|e| !owners.contains(&e.parent))
        .collect()
}

/// Extract existing entries within `ranges` and the new element at
/// `new_scope`, then plan the insertion.
pub fn plan_insertion_in(
    root: &SyntaxNode,
    document: Option<&str>,
    ranges: &[TextRange],
    new_scope: TextRange,
    rules: &RuleSet,
) -> Insertion {
    let existing = extract(root, document, ranges, rules);
    let new = new_element_entries(extract(root, document, &[new_scope], rules), new_scope);
    plan_insertion(&existing, &new, rules)
}
