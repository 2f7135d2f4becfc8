//! Blank-line advice between arranged entries.

use crate::entry::ArrangementEntry;
use crate::rules::RuleSet;
use serde::Serialize;
use text_size::TextRange;

/// Blank lines wanted before an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "lines")]
pub enum Spacing {
    Lines(usize),
    /// Leave whatever is there.
    NoOpinion,
}

impl Spacing {
    pub fn lines(self) -> Option<usize> {
        match self {
            Self::Lines(n) => Some(n),
            Self::NoOpinion => None,
        }
    }
}

/// Blank lines before `target` when it follows `previous` in the canonical
/// order of `parent`. `previous` is `None` for the first entry; a previous
/// entry from another scope counts as none.
///
/// Entries ranked by the same rule (or both unranked) use `within_rule`,
/// entries from different rules use `between_rules`.
pub fn spacing(
    rules: &RuleSet,
    parent: TextRange,
    previous: Option<&ArrangementEntry>,
    target: &ArrangementEntry,
) -> Spacing {
    let Some(settings) = rules.spacing() else {
        return Spacing::NoOpinion;
    };
    let lines = match previous.filter(|prev| prev.parent == parent) {
        None => settings.leading,
        Some(prev) => {
            let same_rule = rules.find_match(prev).map(|r| r.ordinal)
                == rules.find_match(target).map(|r| r.ordinal);
            if same_rule {
                settings.within_rule
            } else {
                settings.between_rules
            }
        }
    };
    lines.map_or(Spacing::NoOpinion, Spacing::Lines)
}
