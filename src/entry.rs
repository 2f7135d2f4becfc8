//! Arrangement entries: orderable syntax elements plus extracted metadata.

use crate::models::tree::Modifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
/// Kind of an orderable element.
pub enum EntryKind {
    Attribute,
    Field,
    Method,
    Class,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Field => "field",
            Self::Method => "method",
            Self::Class => "class",
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attribute" => Ok(Self::Attribute),
            "field" => Ok(Self::Field),
            "method" => Ok(Self::Method),
            "class" => Ok(Self::Class),
            other => Err(format!("unknown entry kind `{other}`")),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Accessor role of a method, keyed by the property it accesses.
pub enum Accessor {
    Getter(String),
    Setter(String),
}

impl Accessor {
    /// Derive the role from bean-style names: `getFoo`/`isFoo` read `foo`,
    /// `setFoo` writes it.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(prop) = property_after(name, "get").or_else(|| property_after(name, "is")) {
            return Some(Self::Getter(prop));
        }
        property_after(name, "set").map(Self::Setter)
    }

    pub fn property(&self) -> &str {
        match self {
            Self::Getter(p) | Self::Setter(p) => p,
        }
    }
}

fn property_after(name: &str, prefix: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    let mut prop: String = first.to_lowercase().collect();
    prop.push_str(chars.as_str());
    Some(prop)
}

/// Modifiers implied by a markup attribute name.
pub fn markup_modifiers(name: &str) -> Vec<Modifier> {
    if name.starts_with(':') || name.starts_with("v-bind:") || name.starts_with('.') {
        vec![Modifier::Binding]
    } else if name.starts_with('@') || name.starts_with("v-on:") {
        vec![Modifier::Event]
    } else if name.starts_with("v-") || name.starts_with('#') {
        vec![Modifier::Directive]
    } else {
        Vec::new()
    }
}

/// An orderable element. Identity is its text range.
#[derive(Debug, Clone)]
pub struct ArrangementEntry {
    pub range: TextRange,
    /// Range of the sibling scope (tag or class) that owns this entry.
    pub parent: TextRange,
    pub kind: EntryKind,
    pub name: Option<String>,
    pub modifiers: BTreeSet<Modifier>,
    pub accessor: Option<Accessor>,
    /// Position among the extracted siblings of the same scope.
    pub ordinal: usize,
    /// Blank lines between the previous sibling (or scope start) and this
    /// entry; known only when a document was supplied.
    pub blank_lines_before: Option<usize>,
}

impl ArrangementEntry {
    pub fn new(kind: EntryKind, range: TextRange) -> Self {
        Self {
            range,
            parent: TextRange::empty(range.start()),
            kind,
            name: None,
            modifiers: BTreeSet::new(),
            accessor: None,
            ordinal: 0,
            blank_lines_before: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.accessor = match self.kind {
            EntryKind::Method => Accessor::from_name(&name),
            _ => None,
        };
        self.name = Some(name);
        self
    }

    pub fn with_modifiers<I, M>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Modifier>,
    {
        self.modifiers.extend(modifiers.into_iter().map(Into::into));
        self
    }

    pub fn in_scope(mut self, parent: TextRange) -> Self {
        self.parent = parent;
        self
    }

    pub fn at(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn has_modifier(&self, modifier: &Modifier) -> bool {
        self.modifiers.contains(modifier)
    }
}

impl PartialEq for ArrangementEntry {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
    }
}

impl Eq for ArrangementEntry {}

impl Hash for ArrangementEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.range.hash(state);
    }
}

impl fmt::Display for ArrangementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} `{}`", self.kind, name),
            None => write!(f, "{} at {}", self.kind, display_range(self.range)),
        }
    }
}

/// Render a range as `start..end`.
pub fn display_range(range: TextRange) -> String {
    format!("{}..{}", u32::from(range.start()), u32::from(range.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextSize;

    fn r(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_accessor_roles_from_bean_names() {
        assert_eq!(Accessor::from_name("getFoo"), Some(Accessor::Getter("foo".into())));
        assert_eq!(Accessor::from_name("isReady"), Some(Accessor::Getter("ready".into())));
        assert_eq!(Accessor::from_name("setFoo"), Some(Accessor::Setter("foo".into())));
        assert_eq!(Accessor::from_name("settle"), None);
        assert_eq!(Accessor::from_name("get"), None);
        assert_eq!(Accessor::from_name("island"), None);
    }

    #[test]
    fn test_accessor_only_for_methods() {
        let field = ArrangementEntry::new(EntryKind::Field, r(0, 5)).with_name("getFoo");
        assert!(field.accessor.is_none());
        let method = ArrangementEntry::new(EntryKind::Method, r(0, 5)).with_name("getFoo");
        assert_eq!(method.accessor.as_ref().map(Accessor::property), Some("foo"));
    }

    #[test]
    fn test_markup_modifiers() {
        assert_eq!(markup_modifiers(":value"), vec![Modifier::Binding]);
        assert_eq!(markup_modifiers("v-bind:title"), vec![Modifier::Binding]);
        assert_eq!(markup_modifiers("@click"), vec![Modifier::Event]);
        assert_eq!(markup_modifiers("v-on:input"), vec![Modifier::Event]);
        assert_eq!(markup_modifiers("v-if"), vec![Modifier::Directive]);
        assert_eq!(markup_modifiers("#default"), vec![Modifier::Directive]);
        assert!(markup_modifiers("class").is_empty());
    }

    #[test]
    fn test_identity_is_the_range() {
        let a = ArrangementEntry::new(EntryKind::Field, r(3, 9)).with_name("a");
        let b = ArrangementEntry::new(EntryKind::Method, r(3, 9)).with_name("b");
        let c = ArrangementEntry::new(EntryKind::Field, r(10, 12)).with_name("a");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
