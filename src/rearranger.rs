//! Host-facing arrangement interface.
//!
//! A host (editor plugin, formatter, the CLI) holds a `Rearranger` and asks
//! it whether a language is supported before handing it trees.

use crate::entry::ArrangementEntry;
use crate::extract::extract;
use crate::insert::new_element_entries;
use crate::models::tree::SyntaxNode;
use crate::rules::RuleSet;
use crate::serializer::SettingsSerializer;
use crate::spacing::{spacing, Spacing};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Vue,
    Html,
    Java,
    Kotlin,
    TypeScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Vue,
        Language::Html,
        Language::Java,
        Language::Kotlin,
        Language::TypeScript,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vue => "vue",
            Self::Html => "html",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::TypeScript => "typescript",
        }
    }

    /// Markup languages arrange attributes; the others arrange members.
    pub fn is_markup(self) -> bool {
        matches!(self, Self::Vue | Self::Html)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vue" => Ok(Self::Vue),
            "html" | "htm" => Ok(Self::Html),
            "java" => Ok(Self::Java),
            "kotlin" | "kt" => Ok(Self::Kotlin),
            "typescript" | "ts" => Ok(Self::TypeScript),
            other => Err(format!("unsupported language `{other}`")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arrangement operations a host composes into its own pipeline.
pub trait Rearranger {
    /// Whether trees of `language` can be arranged.
    fn supports(&self, language: &str) -> bool;

    /// Names of the languages `supports` accepts, for diagnostics.
    fn languages(&self) -> Vec<String>;

    /// Entries of `root` within `ranges`, in source order.
    fn parse(
        &self,
        root: &SyntaxNode,
        document: Option<&str>,
        ranges: &[TextRange],
        rules: &RuleSet,
    ) -> Vec<ArrangementEntry>;

    /// Existing entries plus the single entry of the new-element scope, or
    /// `None` when that scope does not hold exactly one entry.
    fn parse_with_new(
        &self,
        root: &SyntaxNode,
        document: Option<&str>,
        ranges: &[TextRange],
        new_scope: TextRange,
        rules: &RuleSet,
    ) -> Option<(Vec<ArrangementEntry>, ArrangementEntry)>;

    fn blank_lines(
        &self,
        rules: &RuleSet,
        parent: TextRange,
        previous: Option<&ArrangementEntry>,
        target: &ArrangementEntry,
    ) -> Spacing;

    fn serializer(&self) -> &SettingsSerializer;
}

/// Rearranger over the bundled tree model.
#[derive(Debug, Clone)]
pub struct StdRearranger {
    languages: BTreeSet<Language>,
    serializer: SettingsSerializer,
}

impl Default for StdRearranger {
    fn default() -> Self {
        Self::all()
    }
}

impl StdRearranger {
    pub fn new(
        languages: impl IntoIterator<Item = Language>,
        serializer: SettingsSerializer,
    ) -> Self {
        Self {
            languages: languages.into_iter().collect(),
            serializer,
        }
    }

    /// Attribute arrangement for markup documents.
    pub fn markup() -> Self {
        Self::new(
            Language::ALL.into_iter().filter(|l| l.is_markup()),
            SettingsSerializer::default(),
        )
    }

    /// Member arrangement for class-based languages.
    pub fn members() -> Self {
        Self::new(
            Language::ALL.into_iter().filter(|l| !l.is_markup()),
            SettingsSerializer::default(),
        )
    }

    pub fn all() -> Self {
        Self::new(Language::ALL, SettingsSerializer::default())
    }
}

impl Rearranger for StdRearranger {
    fn supports(&self, language: &str) -> bool {
        language
            .parse::<Language>()
            .is_ok_and(|l| self.languages.contains(&l))
    }

    fn languages(&self) -> Vec<String> {
        self.languages.iter().map(|l| l.as_str().to_string()).collect()
    }

    fn parse(
        &self,
        root: &SyntaxNode,
        document: Option<&str>,
        ranges: &[TextRange],
        rules: &RuleSet,
    ) -> Vec<ArrangementEntry> {
        extract(root, document, ranges, rules)
    }

    fn parse_with_new(
        &self,
        root: &SyntaxNode,
        document: Option<&str>,
        ranges: &[TextRange],
        new_scope: TextRange,
        rules: &RuleSet,
    ) -> Option<(Vec<ArrangementEntry>, ArrangementEntry)> {
        let mut new = new_element_entries(extract(root, document, &[new_scope], rules), new_scope);
        if new.len() != 1 {
            return None;
        }
        let entry = new.pop()?;
        Some((extract(root, document, ranges, rules), entry))
    }

    fn blank_lines(
        &self,
        rules: &RuleSet,
        parent: TextRange,
        previous: Option<&ArrangementEntry>,
        target: &ArrangementEntry,
    ) -> Spacing {
        spacing(rules, parent, previous, target)
    }

    fn serializer(&self) -> &SettingsSerializer {
        &self.serializer
    }
}
