//! Entry extraction: one linear walk over the supplied tree.
//!
//! Scopes are the nodes whose children are arranged together:
//! - a `Tag` owns its `Attribute` children;
//! - a `Class` owns its `Field`, `Method` and nested `Class` children.
//!
//! Only children whose range touches one of the requested ranges are
//! extracted, so a caller can arrange just the changed region and leave the
//! rest of the file untouched.

use crate::entry::{markup_modifiers, ArrangementEntry, EntryKind};
use crate::models::tree::{NodeKind, SyntaxNode};
use crate::rules::RuleSet;
use text_size::{TextRange, TextSize};

#[derive(Clone, Copy)]
enum Scope {
    Tag,
    Class,
}

impl Scope {
    /// Entry kind of a child of this scope, `None` when not orderable here.
    fn entry_kind(self, child: NodeKind) -> Option<EntryKind> {
        match (self, child) {
            (Self::Tag, NodeKind::Attribute) => Some(EntryKind::Attribute),
            (Self::Class, NodeKind::Field) => Some(EntryKind::Field),
            (Self::Class, NodeKind::Method) => Some(EntryKind::Method),
            (Self::Class, NodeKind::Class) => Some(EntryKind::Class),
            _ => None,
        }
    }
}

/// Extract the orderable entries of `root` that touch `ranges`, in source
/// order. `document` is the source text, used only for spacing metadata.
pub fn extract(
    root: &SyntaxNode,
    document: Option<&str>,
    ranges: &[TextRange],
    rules: &RuleSet,
) -> Vec<ArrangementEntry> {
    let mut walker = Walker {
        document,
        ranges,
        rules,
        entries: Vec::new(),
    };
    walker.visit(root);
    walker.entries
}

/// True when `scope` selects `node`: a non-empty overlap, or an empty
/// (caret) scope positioned inside the node.
pub fn touches(scope: TextRange, node: TextRange) -> bool {
    if scope.is_empty() {
        return node.contains_inclusive(scope.start());
    }
    (scope.start() < node.end() && node.start() < scope.end())
        || (node.is_empty() && scope.contains(node.start()))
}

struct Walker<'a> {
    document: Option<&'a str>,
    ranges: &'a [TextRange],
    rules: &'a RuleSet,
    entries: Vec<ArrangementEntry>,
}

impl Walker<'_> {
    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind {
            NodeKind::Tag => self.visit_scope(node, Scope::Tag),
            NodeKind::Class => self.visit_scope(node, Scope::Class),
            // Not scopes themselves, but may hold nested tags and classes.
            NodeKind::File
            | NodeKind::Attribute
            | NodeKind::Field
            | NodeKind::Method
            | NodeKind::Other => {
                for child in &node.children {
                    self.visit(child);
                }
            }
        }
    }

    fn visit_scope(&mut self, parent: &SyntaxNode, scope: Scope) {
        let mut ordinal = 0;
        let mut prev_end = parent.range.start();
        for child in &parent.children {
            if let Some(kind) = scope.entry_kind(child.kind) {
                if self.rules.is_orderable(kind) && self.in_scope(child.range) {
                    let entry = self.entry(child, kind, parent.range, ordinal, prev_end);
                    self.entries.push(entry);
                    ordinal += 1;
                }
                prev_end = child.range.end();
            }
            self.visit(child);
        }
    }

    fn in_scope(&self, range: TextRange) -> bool {
        self.ranges.iter().any(|scope| touches(*scope, range))
    }

    fn entry(
        &self,
        node: &SyntaxNode,
        kind: EntryKind,
        parent: TextRange,
        ordinal: usize,
        prev_end: TextSize,
    ) -> ArrangementEntry {
        let mut entry = ArrangementEntry::new(kind, node.range)
            .in_scope(parent)
            .at(ordinal)
            .with_modifiers(node.modifiers.iter().cloned());
        if let Some(name) = &node.name {
            if kind == EntryKind::Attribute {
                entry = entry.with_modifiers(markup_modifiers(name));
            }
            entry = entry.with_name(name.clone());
        }
        entry.blank_lines_before = self
            .document
            .and_then(|doc| blank_lines_between(doc, prev_end, node.range.start()));
        entry
    }
}

/// Count whitespace-only lines strictly between `from` and `to`.
fn blank_lines_between(doc: &str, from: TextSize, to: TextSize) -> Option<usize> {
    if from > to {
        return None;
    }
    let gap = doc.get(usize::from(from)..usize::from(to))?;
    let segments: Vec<&str> = gap.split('\n').collect();
    if segments.len() < 3 {
        return Some(0);
    }
    // First and last segments are partial lines around the gap.
    Some(
        segments[1..segments.len() - 1]
            .iter()
            .filter(|line| line.trim().is_empty())
            .count(),
    )
}
