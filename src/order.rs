//! Canonical order resolution.
//!
//! Each sibling scope is resolved on its own:
//! 1. entries matching a rule are sorted by ordinal, then by the rule's
//!    sort order, then by source position (stable);
//! 2. unranked entries follow in source order;
//! 3. grouping rules splice secondaries right after their primary, in
//!    grouping declaration order. The first rule to claim an entry wins.
//!
//! Resolving an already canonical list returns it unchanged.

use crate::entry::{Accessor, ArrangementEntry};
use crate::extract::extract;
use crate::models::settings::{GroupingRule, SortOrder};
use crate::models::tree::SyntaxNode;
use crate::rules::RuleSet;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Canonical order of one sibling scope.
pub struct Section {
    pub parent: TextRange,
    pub entries: Vec<TextRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Proposed order of every extracted scope, scopes in source order.
pub struct CanonicalOrder {
    pub sections: Vec<Section>,
}

impl CanonicalOrder {
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }

    /// All entry ranges, scope by scope.
    pub fn ranges(&self) -> impl Iterator<Item = TextRange> + '_ {
        self.sections.iter().flat_map(|s| s.entries.iter().copied())
    }

    pub fn section(&self, parent: TextRange) -> Option<&Section> {
        self.sections.iter().find(|s| s.parent == parent)
    }
}

/// Extract the entries of `root` within `ranges` and resolve their order.
pub fn arrange(
    root: &SyntaxNode,
    document: Option<&str>,
    ranges: &[TextRange],
    rules: &RuleSet,
) -> CanonicalOrder {
    let entries = extract(root, document, ranges, rules);
    resolve_all(&entries, rules)
}

/// Split entries by sibling scope and resolve each scope.
pub fn resolve_all(entries: &[ArrangementEntry], rules: &RuleSet) -> CanonicalOrder {
    let sections = by_scope(entries)
        .into_iter()
        .map(|(parent, scope)| Section {
            parent,
            entries: resolve(&scope, rules).iter().map(|e| e.range).collect(),
        })
        .collect();
    CanonicalOrder { sections }
}

/// Group entries by parent range, keeping first-appearance order.
pub fn by_scope(entries: &[ArrangementEntry]) -> IndexMap<TextRange, Vec<&ArrangementEntry>> {
    let mut scopes: IndexMap<TextRange, Vec<&ArrangementEntry>> = IndexMap::new();
    for entry in entries {
        scopes.entry(entry.parent).or_default().push(entry);
    }
    scopes
}

/// Canonical order of one scope. `entries` must be siblings in source order.
pub fn resolve<'e>(entries: &[&'e ArrangementEntry], rules: &RuleSet) -> Vec<&'e ArrangementEntry> {
    let mut ranked = Vec::new();
    let mut unranked = Vec::new();
    for (pos, entry) in entries.iter().copied().enumerate() {
        match rules.find_match(entry) {
            Some(rank) => ranked.push((rank.ordinal, rank.rule.order(), pos, entry)),
            None => unranked.push(entry),
        }
    }

    ranked.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| within_rule(a.1, a.3, b.3))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut order: Vec<&ArrangementEntry> = ranked
        .into_iter()
        .map(|(_, _, _, e)| e)
        .chain(unranked)
        .collect();
    apply_groupings(&mut order, rules.groupings());
    order
}

fn within_rule(order: SortOrder, a: &ArrangementEntry, b: &ArrangementEntry) -> Ordering {
    match order {
        SortOrder::Keep => Ordering::Equal,
        SortOrder::ByName => a.name_or_empty().cmp(b.name_or_empty()),
    }
}

fn primary_key(rule: GroupingRule, entry: &ArrangementEntry) -> Option<&str> {
    match rule {
        GroupingRule::GettersAndSetters => match &entry.accessor {
            Some(Accessor::Getter(prop)) => Some(prop.as_str()),
            _ => None,
        },
    }
}

fn secondary_key(rule: GroupingRule, entry: &ArrangementEntry) -> Option<&str> {
    match rule {
        GroupingRule::GettersAndSetters => match &entry.accessor {
            Some(Accessor::Setter(prop)) => Some(prop.as_str()),
            _ => None,
        },
    }
}

fn apply_groupings(order: &mut Vec<&ArrangementEntry>, groupings: &[GroupingRule]) {
    let mut claimed: HashSet<TextRange> = HashSet::new();
    // Number of secondaries already spliced after each primary.
    let mut spliced: HashMap<TextRange, usize> = HashMap::new();

    for &rule in groupings {
        let mut i = 0;
        while i < order.len() {
            let primary = order[i];
            let Some(key) = primary_key(rule, primary) else {
                i += 1;
                continue;
            };
            let members: Vec<&ArrangementEntry> = order
                .iter()
                .copied()
                .filter(|e| {
                    e.range != primary.range
                        && !claimed.contains(&e.range)
                        && secondary_key(rule, e) == Some(key)
                })
                .collect();
            if members.is_empty() {
                i += 1;
                continue;
            }

            order.retain(|e| !members.iter().any(|m| m.range == e.range));
            let Some(at) = order.iter().position(|e| e.range == primary.range) else {
                break;
            };
            let offset = spliced.entry(primary.range).or_insert(0);
            let insert_at = at + 1 + *offset;
            for (k, member) in members.iter().copied().enumerate() {
                order.insert(insert_at + k, member);
                claimed.insert(member.range);
            }
            *offset += members.len();
            i = at + 1;
        }
    }
}

/// A pair of neighbours in source order that the canonical order swaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Entry that should move up.
    pub entry: TextRange,
    /// Source-order predecessor it should precede.
    pub before: TextRange,
}

/// Neighbouring pairs of `source` (one scope, source order) whose relative
/// order differs from `canonical`.
pub fn violations(source: &[&ArrangementEntry], canonical: &[TextRange]) -> Vec<Violation> {
    let position: HashMap<TextRange, usize> = canonical
        .iter()
        .enumerate()
        .map(|(i, r)| (*r, i))
        .collect();
    source
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            match (position.get(&prev.range), position.get(&next.range)) {
                (Some(p), Some(n)) if p > n => Some(Violation {
                    entry: next.range,
                    before: prev.range,
                }),
                _ => None,
            }
        })
        .collect()
}
