//! Arrangement settings schema: the stable external form of a `RuleSet`.
//!
//! A settings file declares, in order:
//! - `rules`: rule tokens. Each token is either a literal match
//!   (`match = [{ field, op, value }]`, optional `order`) or an alias
//!   reference (`alias = "visibility"`).
//! - `groupings`: grouping rule tokens, applied in declaration order.
//! - `aliases`: named, reusable rule bundles (may reference other aliases).
//! - `kinds`: optional filter of orderable entry kinds.
//! - `spacing`: optional blank-line counts; absent means "no opinion".
//!
//! Sections left out of a file fall back to the serializer defaults.

use crate::entry::EntryKind;
use crate::models::tree::Modifier;
use serde::{Deserialize, Serialize};

/// Name of the built-in visibility alias.
pub const VISIBILITY_ALIAS: &str = "visibility";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
/// Root settings document.
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleToken>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupings: Option<Vec<GroupingRule>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<AliasDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<EntryKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingSettings>,
}

impl Settings {
    /// Built-in defaults: arrange by visibility, keep getters next to setters.
    pub fn builtin() -> Self {
        Self {
            rules: Some(vec![RuleToken::alias(VISIBILITY_ALIAS)]),
            groupings: Some(vec![GroupingRule::GettersAndSetters]),
            aliases: Vec::new(),
            kinds: None,
            spacing: None,
        }
    }

    /// Fill sections missing from `self` with the ones from `defaults`.
    pub fn or_defaults(self, defaults: &Settings) -> Settings {
        Settings {
            rules: self.rules.or_else(|| defaults.rules.clone()),
            groupings: self.groupings.or_else(|| defaults.groupings.clone()),
            aliases: if self.aliases.is_empty() {
                defaults.aliases.clone()
            } else {
                self.aliases
            },
            kinds: self.kinds.or_else(|| defaults.kinds.clone()),
            spacing: self.spacing.or_else(|| defaults.spacing.clone()),
        }
    }
}

/// Aliases every rule set knows about; they cannot be redefined.
pub fn builtin_aliases() -> Vec<AliasDef> {
    let visibility = [
        Modifier::Public,
        Modifier::Package,
        Modifier::Protected,
        Modifier::Private,
    ]
    .into_iter()
    .map(|m| RuleToken::matching(vec![MatchCondition::modifier(m)]))
    .collect();
    vec![AliasDef {
        name: VISIBILITY_ALIAS.to_string(),
        rules: visibility,
    }]
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged, deny_unknown_fields)]
/// One entry of the `rules` list.
pub enum RuleToken {
    Alias {
        alias: String,
    },
    Match {
        #[serde(rename = "match")]
        conditions: Vec<MatchCondition>,
        #[serde(default, skip_serializing_if = "SortOrder::is_keep")]
        order: SortOrder,
    },
}

impl RuleToken {
    pub fn alias(name: impl Into<String>) -> Self {
        Self::Alias { alias: name.into() }
    }

    pub fn matching(conditions: Vec<MatchCondition>) -> Self {
        Self::Match {
            conditions,
            order: SortOrder::Keep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// Named bundle of rule tokens.
pub struct AliasDef {
    pub name: String,
    pub rules: Vec<RuleToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Predicate over entry metadata, e.g. `modifier = public`.
pub struct MatchCondition {
    pub field: ConditionField,
    #[serde(default, skip_serializing_if = "Operator::is_eq")]
    pub op: Operator,
    pub value: String,
}

impl MatchCondition {
    pub fn modifier(modifier: Modifier) -> Self {
        Self {
            field: ConditionField::Modifier,
            op: Operator::Eq,
            value: modifier.as_str().to_string(),
        }
    }

    pub fn kind(kind: EntryKind) -> Self {
        Self {
            field: ConditionField::Kind,
            op: Operator::Eq,
            value: kind.as_str().to_string(),
        }
    }

    pub fn name(op: Operator, value: impl Into<String>) -> Self {
        Self {
            field: ConditionField::Name,
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
/// Entry metadata a condition inspects.
pub enum ConditionField {
    Kind,
    Name,
    /// Membership in the modifier set.
    Modifier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Comparison operator of a condition.
pub enum Operator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    /// Regular expression match.
    #[serde(rename = "~")]
    Matches,
}

impl Operator {
    pub fn is_eq(&self) -> bool {
        matches!(self, Self::Eq)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Matches => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Order of entries matched by the same rule.
pub enum SortOrder {
    /// Original source order.
    #[default]
    Keep,
    /// Lexicographic by name, ties in source order.
    ByName,
}

impl SortOrder {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Relation that pins a secondary entry right after its primary.
pub enum GroupingRule {
    /// A setter follows the getter of the same property.
    GettersAndSetters,
}

impl GroupingRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GettersAndSetters => "getters-and-setters",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Blank-line counts. Every absent value means "no opinion".
pub struct SpacingSettings {
    /// Before the first entry of a scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading: Option<usize>,
    /// Between entries ranked by different rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between_rules: Option<usize>,
    /// Between entries ranked by the same rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_rule: Option<usize>,
}
