//! Syntax tree handed over by the host.
//!
//! The engine never parses source text. A host supplies a tree of
//! `SyntaxNode`s, usually as a JSON tree document:
//!
//! ```json
//! {
//!   "language": "vue",
//!   "source": "App.vue",
//!   "root": { "kind": "file", "range": [0, 64], "children": [] }
//! }
//! ```
//!
//! Ranges are `[start, end)` byte offsets into the source text.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
/// Closed set of node kinds the extractor dispatches on.
pub enum NodeKind {
    File,
    Tag,
    Attribute,
    Class,
    Field,
    Method,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
/// Qualifier attached to a node (visibility, storage, markup flavour).
pub enum Modifier {
    Public,
    /// Package-visible (no explicit visibility keyword in the source language).
    Package,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    /// Markup directive such as `v-if` or `#default`.
    Directive,
    /// Markup binding such as `:value` or `v-bind:value`.
    Binding,
    /// Markup event listener such as `@click` or `v-on:click`.
    Event,
    Other(String),
}

impl Modifier {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Public => "public",
            Self::Package => "package",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Static => "static",
            Self::Final => "final",
            Self::Abstract => "abstract",
            Self::Directive => "directive",
            Self::Binding => "binding",
            Self::Event => "event",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for Modifier {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Self::Public,
            "package" | "package-private" | "package_private" => Self::Package,
            "protected" => Self::Protected,
            "private" => Self::Private,
            "static" => Self::Static,
            "final" => Self::Final,
            "abstract" => Self::Abstract,
            "directive" => Self::Directive,
            "binding" => Self::Binding,
            "event" => Self::Event,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Modifier {
    fn from(s: String) -> Self {
        Modifier::from(s.as_str())
    }
}

impl From<Modifier> for String {
    fn from(m: Modifier) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// A node of the supplied syntax tree.
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub range: TextRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            name: None,
            modifiers: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// A tree document as produced by a host-side parser.
pub struct SyntaxTree {
    pub language: String,
    /// Optional path to the source text, relative to the tree document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub root: SyntaxNode,
}

impl SyntaxTree {
    /// Read and decode a JSON tree document.
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let data = fs::read_to_string(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| TreeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Source text referenced by `source`, resolved next to `tree_path`.
    ///
    /// Returns `None` when the document is not declared or cannot be read;
    /// the document only feeds spacing metadata, never ordering.
    pub fn document(&self, tree_path: &Path) -> Option<String> {
        let rel = self.source.as_ref()?;
        let path = match tree_path.parent() {
            Some(dir) if rel.is_relative() => dir.join(rel),
            _ => rel.clone(),
        };
        match fs::read_to_string(&path) {
            Ok(s) => Some(s),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "document not readable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextSize;

    #[test]
    fn test_modifier_tokens_round_trip() {
        assert_eq!(Modifier::from("PUBLIC"), Modifier::Public);
        assert_eq!(Modifier::from("package-private"), Modifier::Package);
        assert_eq!(Modifier::from("inline"), Modifier::Other("inline".into()));
        assert_eq!(Modifier::from(" Volatile "), Modifier::Other("volatile".into()));
        assert_eq!(Modifier::from("Volatile"), Modifier::from("volatile"));
        assert_eq!(String::from(Modifier::Event), "event");
    }

    #[test]
    fn test_tree_document_decodes_ranges_and_modifiers() {
        let doc = r#"{
            "language": "java",
            "root": {
                "kind": "class",
                "range": [0, 40],
                "name": "Foo",
                "children": [
                    { "kind": "field", "range": [12, 30], "name": "x", "modifiers": ["private", "static"] }
                ]
            }
        }"#;
        let tree: SyntaxTree = serde_json::from_str(doc).unwrap();
        assert_eq!(tree.language, "java");
        assert_eq!(tree.root.range, TextRange::new(TextSize::new(0), TextSize::new(40)));
        let field = &tree.root.children[0];
        assert_eq!(field.kind, NodeKind::Field);
        assert!(field.modifiers.contains(&Modifier::Private));
        assert!(field.modifiers.contains(&Modifier::Static));
        assert!(tree.source.is_none());
    }

    #[test]
    fn test_document_resolves_relative_to_tree_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("App.vue"), "<div id=\"a\"></div>").unwrap();
        let tree = SyntaxTree {
            language: "vue".into(),
            source: Some(PathBuf::from("App.vue")),
            root: SyntaxNode::new(
                NodeKind::File,
                TextRange::new(TextSize::new(0), TextSize::new(18)),
            ),
        };
        let text = tree.document(&dir.path().join("App.tree.json"));
        assert_eq!(text.as_deref(), Some("<div id=\"a\"></div>"));
    }
}
