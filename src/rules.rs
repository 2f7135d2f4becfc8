//! Rule set construction and matching.
//!
//! A `RuleSet` is built once per configuration. Alias references are
//! expanded depth-first into a flat list of `MatchRule`s; the index of a rule
//! in that list is its ordinal priority. All configuration errors (cycles,
//! undefined or duplicate aliases, bad patterns) surface here and never
//! during matching.

use crate::entry::{ArrangementEntry, EntryKind};
use crate::error::ConfigError;
use crate::models::settings::{
    builtin_aliases, ConditionField, GroupingRule, MatchCondition, Operator, RuleToken, Settings,
    SortOrder, SpacingSettings,
};
use crate::models::tree::Modifier;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Condition with its expected value decoded for fast evaluation.
#[derive(Debug, Clone)]
struct CompiledCondition {
    field: ConditionField,
    op: Operator,
    expected: Expected,
}

#[derive(Debug, Clone)]
enum Expected {
    Text(String),
    Kind(EntryKind),
    Modifier(Modifier),
    Pattern(Regex),
}

impl CompiledCondition {
    fn compile(cond: &MatchCondition) -> Result<Self, ConfigError> {
        let expected = match (cond.op, cond.field) {
            (Operator::Matches, _) => {
                Expected::Pattern(Regex::new(&cond.value).map_err(|source| {
                    ConfigError::InvalidPattern {
                        pattern: cond.value.clone(),
                        source,
                    }
                })?)
            }
            (_, ConditionField::Modifier) => {
                Expected::Modifier(Modifier::from(cond.value.as_str()))
            }
            (_, ConditionField::Kind) => {
                Expected::Kind(cond.value.parse().map_err(|message| {
                    ConfigError::InvalidCondition {
                        field: "kind",
                        value: cond.value.clone(),
                        message,
                    }
                })?)
            }
            _ => Expected::Text(cond.value.trim().to_string()),
        };
        Ok(Self {
            field: cond.field,
            op: cond.op,
            expected,
        })
    }

    fn matches(&self, entry: &ArrangementEntry) -> bool {
        match (self.field, &self.expected) {
            (ConditionField::Modifier, Expected::Modifier(m)) => {
                let has = entry.has_modifier(m);
                match self.op {
                    Operator::Ne => !has,
                    _ => has,
                }
            }
            (ConditionField::Modifier, Expected::Pattern(re)) => {
                entry.modifiers.iter().any(|m| re.is_match(m.as_str()))
            }
            (ConditionField::Kind, Expected::Kind(kind)) => {
                let eq = entry.kind == *kind;
                match self.op {
                    Operator::Ne => !eq,
                    _ => eq,
                }
            }
            (ConditionField::Kind, Expected::Pattern(re)) => re.is_match(entry.kind.as_str()),
            (ConditionField::Name, Expected::Text(v)) => {
                let eq = entry.name.as_deref() == Some(v.as_str());
                match self.op {
                    Operator::Ne => !eq,
                    _ => eq,
                }
            }
            (ConditionField::Name, Expected::Pattern(re)) => {
                entry.name.as_deref().is_some_and(|n| re.is_match(n))
            }
            // compile() decodes each field into its own value kind
            _ => false,
        }
    }

    fn describe(&self) -> String {
        let field = match self.field {
            ConditionField::Kind => "kind",
            ConditionField::Name => "name",
            ConditionField::Modifier => "modifier",
        };
        let value = match &self.expected {
            Expected::Text(s) => s.clone(),
            Expected::Kind(k) => k.as_str().to_string(),
            Expected::Modifier(m) => m.as_str().to_string(),
            Expected::Pattern(re) => re.as_str().to_string(),
        };
        format!("{} {} {}", field, self.op.as_str(), value)
    }
}

/// A flattened rule: a conjunction of conditions plus the sort order used
/// among the entries it matches.
#[derive(Debug, Clone)]
pub struct MatchRule {
    conditions: Vec<CompiledCondition>,
    order: SortOrder,
    /// Alias this rule was expanded from, outermost first.
    origin: Option<String>,
}

impl MatchRule {
    fn compile(
        conditions: &[MatchCondition],
        order: SortOrder,
        origin: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let conditions = conditions
            .iter()
            .map(CompiledCondition::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            conditions,
            order,
            origin: origin.map(str::to_string),
        })
    }

    /// True when every condition holds. A rule without conditions matches
    /// everything.
    pub fn matches(&self, entry: &ArrangementEntry) -> bool {
        self.conditions.iter().all(|c| c.matches(entry))
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Human-readable form, e.g. `modifier = public and kind = field`.
    pub fn describe(&self) -> String {
        if self.conditions.is_empty() {
            return "*".to_string();
        }
        self.conditions
            .iter()
            .map(CompiledCondition::describe)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// Result of a successful match: the rule and its ordinal.
#[derive(Debug, Clone, Copy)]
pub struct Rank<'r> {
    pub ordinal: usize,
    pub rule: &'r MatchRule,
}

/// Expanded, read-only arrangement configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    settings: Settings,
    rules: Vec<MatchRule>,
    groupings: Vec<GroupingRule>,
    kinds: Option<BTreeSet<EntryKind>>,
    spacing: Option<SpacingSettings>,
}

impl Default for RuleSet {
    fn default() -> Self {
        match RuleSet::from_settings(Settings::builtin()) {
            Ok(rules) => rules,
            // Built-in settings reference only built-in aliases without patterns.
            Err(_) => RuleSet::empty(),
        }
    }
}

impl RuleSet {
    /// A rule set that ranks nothing and groups nothing.
    pub fn empty() -> Self {
        Self {
            settings: Settings {
                rules: Some(Vec::new()),
                groupings: Some(Vec::new()),
                ..Settings::default()
            },
            rules: Vec::new(),
            groupings: Vec::new(),
            kinds: None,
            spacing: None,
        }
    }

    /// Build from rule and grouping tokens, with built-in aliases only.
    pub fn new(rules: Vec<RuleToken>, groupings: Vec<GroupingRule>) -> Result<Self, ConfigError> {
        Self::from_settings(Settings {
            rules: Some(rules),
            groupings: Some(groupings),
            ..Settings::default()
        })
    }

    /// Build from a settings document. Missing sections take the built-in
    /// defaults.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let settings = settings.or_defaults(&Settings::builtin());

        let mut aliases: IndexMap<String, Vec<RuleToken>> = IndexMap::new();
        for def in builtin_aliases().into_iter().chain(settings.aliases.iter().cloned()) {
            if aliases.contains_key(&def.name) {
                return Err(ConfigError::DuplicateAlias { name: def.name });
            }
            aliases.insert(def.name, def.rules);
        }

        validate_aliases(&aliases)?;

        let mut expander = Expander::new(&aliases);
        expander.expand(settings.rules.as_deref().unwrap_or_default(), None)?;
        let rules = expander.out;

        let groupings = settings.groupings.clone().unwrap_or_default();
        let kinds = settings
            .kinds
            .as_ref()
            .map(|ks| ks.iter().copied().collect::<BTreeSet<_>>());
        let spacing = settings.spacing.clone();

        tracing::debug!(
            rules = rules.len(),
            groupings = groupings.len(),
            aliases = aliases.len(),
            "rule set expanded"
        );

        Ok(Self {
            settings,
            rules,
            groupings,
            kinds,
            spacing,
        })
    }

    /// Settings this rule set was built from, aliases unexpanded.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Flattened rules; the index is the ordinal.
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn groupings(&self) -> &[GroupingRule] {
        &self.groupings
    }

    pub fn spacing(&self) -> Option<&SpacingSettings> {
        self.spacing.as_ref()
    }

    /// Whether entries of `kind` take part in arrangement.
    pub fn is_orderable(&self, kind: EntryKind) -> bool {
        self.kinds.as_ref().is_none_or(|ks| ks.contains(&kind))
    }

    /// First rule the entry satisfies, scanning in ordinal order.
    pub fn find_match(&self, entry: &ArrangementEntry) -> Option<Rank<'_>> {
        let found = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(entry))
            .map(|(ordinal, rule)| Rank { ordinal, rule });
        tracing::trace!(entry = %entry, ordinal = ?found.map(|r| r.ordinal), "matched");
        found
    }
}

/// Check every alias, referenced or not, visiting each definition once.
fn validate_aliases(aliases: &IndexMap<String, Vec<RuleToken>>) -> Result<(), ConfigError> {
    let mut done = HashSet::new();
    for name in aliases.keys() {
        let mut stack = vec![name.as_str()];
        validate_alias(aliases, name, &mut stack, &mut done)?;
    }
    Ok(())
}

fn validate_alias<'a>(
    aliases: &'a IndexMap<String, Vec<RuleToken>>,
    name: &'a str,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), ConfigError> {
    if done.contains(name) {
        return Ok(());
    }
    let tokens = aliases
        .get(name)
        .ok_or_else(|| ConfigError::UndefinedAlias {
            name: name.to_string(),
        })?;
    for token in tokens {
        match token {
            RuleToken::Match { conditions, order } => {
                MatchRule::compile(conditions, *order, Some(name))?;
            }
            RuleToken::Alias { alias } => {
                if stack.contains(&alias.as_str()) {
                    let mut chain: Vec<String> = stack.iter().map(|n| n.to_string()).collect();
                    chain.push(alias.clone());
                    return Err(ConfigError::AliasCycle { chain });
                }
                if !aliases.contains_key(alias) {
                    return Err(ConfigError::UndefinedAlias {
                        name: alias.clone(),
                    });
                }
                stack.push(alias);
                validate_alias(aliases, alias, stack, done)?;
                stack.pop();
            }
        }
    }
    done.insert(name);
    Ok(())
}

struct Expander<'a> {
    aliases: &'a IndexMap<String, Vec<RuleToken>>,
    stack: Vec<String>,
    out: Vec<MatchRule>,
}

impl<'a> Expander<'a> {
    fn new(aliases: &'a IndexMap<String, Vec<RuleToken>>) -> Self {
        Self {
            aliases,
            stack: Vec::new(),
            out: Vec::new(),
        }
    }

    fn expand(&mut self, tokens: &[RuleToken], origin: Option<&str>) -> Result<(), ConfigError> {
        for token in tokens {
            match token {
                RuleToken::Match { conditions, order } => {
                    self.out.push(MatchRule::compile(conditions, *order, origin)?);
                }
                RuleToken::Alias { alias } => {
                    if self.stack.iter().any(|n| n == alias) {
                        let mut chain = self.stack.clone();
                        chain.push(alias.clone());
                        return Err(ConfigError::AliasCycle { chain });
                    }
                    let aliases = self.aliases;
                    let def = aliases
                        .get(alias)
                        .ok_or_else(|| ConfigError::UndefinedAlias {
                            name: alias.clone(),
                        })?;
                    self.stack.push(alias.clone());
                    // Rules keep the outermost alias as their origin.
                    self.expand(def, origin.or(Some(alias.as_str())))?;
                    self.stack.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{AliasDef, VISIBILITY_ALIAS};
    use rstest::rstest;
    use text_size::{TextRange, TextSize};

    fn r(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    fn field(name: &str, modifiers: &[&str]) -> ArrangementEntry {
        ArrangementEntry::new(EntryKind::Field, r(0, 1))
            .with_name(name)
            .with_modifiers(modifiers.iter().copied())
    }

    fn condition(field: ConditionField, op: Operator, value: &str) -> MatchCondition {
        MatchCondition {
            field,
            op,
            value: value.into(),
        }
    }

    fn describe_all(rules: &RuleSet) -> Vec<String> {
        rules.rules().iter().map(MatchRule::describe).collect()
    }

    #[test]
    fn test_visibility_alias_expands_in_fixed_order() {
        let rules = RuleSet::new(vec![RuleToken::alias(VISIBILITY_ALIAS)], Vec::new()).unwrap();
        assert_eq!(
            describe_all(&rules),
            vec![
                "modifier = public",
                "modifier = package",
                "modifier = protected",
                "modifier = private"
            ]
        );
        assert!(rules.rules().iter().all(|m| m.origin() == Some("visibility")));
    }

    #[test]
    fn test_alias_expands_in_place() {
        let rules = RuleSet::new(
            vec![
                RuleToken::matching(vec![MatchCondition::modifier(Modifier::Static)]),
                RuleToken::alias(VISIBILITY_ALIAS),
                RuleToken::matching(vec![MatchCondition::kind(EntryKind::Method)]),
            ],
            Vec::new(),
        )
        .unwrap();
        let described = describe_all(&rules);
        assert_eq!(described.len(), 6);
        assert_eq!(described[0], "modifier = static");
        assert_eq!(described[1], "modifier = public");
        assert_eq!(described[4], "modifier = private");
        assert_eq!(described[5], "kind = method");
    }

    #[test]
    fn test_self_referencing_alias_is_rejected() {
        let settings = Settings {
            aliases: vec![AliasDef {
                name: "loop".into(),
                rules: vec![RuleToken::alias("loop")],
            }],
            ..Settings::default()
        };
        let err = RuleSet::from_settings(settings).unwrap_err();
        match err {
            ConfigError::AliasCycle { chain } => assert_eq!(chain, vec!["loop", "loop"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_transitive_cycle_is_rejected_even_when_unused() {
        let settings = Settings {
            rules: Some(vec![RuleToken::alias(VISIBILITY_ALIAS)]),
            aliases: vec![
                AliasDef {
                    name: "a".into(),
                    rules: vec![RuleToken::alias("b")],
                },
                AliasDef {
                    name: "b".into(),
                    rules: vec![RuleToken::alias("a")],
                },
            ],
            ..Settings::default()
        };
        assert!(matches!(
            RuleSet::from_settings(settings),
            Err(ConfigError::AliasCycle { .. })
        ));
    }

    #[test]
    fn test_nested_aliases_are_not_cycles() {
        let settings = Settings {
            rules: Some(vec![RuleToken::alias("members")]),
            aliases: vec![AliasDef {
                name: "members".into(),
                rules: vec![
                    RuleToken::alias(VISIBILITY_ALIAS),
                    RuleToken::alias(VISIBILITY_ALIAS),
                ],
            }],
            ..Settings::default()
        };
        let rules = RuleSet::from_settings(settings).unwrap();
        assert_eq!(rules.rules().len(), 8);
        assert_eq!(rules.rules()[0].origin(), Some("members"));
    }

    #[test]
    fn test_deeply_shared_unused_aliases_load_quickly() {
        let mut aliases = vec![AliasDef {
            name: "a0".into(),
            rules: vec![RuleToken::matching(vec![MatchCondition::kind(EntryKind::Field)])],
        }];
        for i in 1..64 {
            let prev = format!("a{}", i - 1);
            aliases.push(AliasDef {
                name: format!("a{i}"),
                rules: vec![RuleToken::alias(prev.clone()), RuleToken::alias(prev)],
            });
        }
        let settings = Settings {
            rules: Some(Vec::new()),
            aliases,
            ..Settings::default()
        };
        // Full expansion of a63 would hold 2^63 rules.
        let rules = RuleSet::from_settings(settings).unwrap();
        assert!(rules.rules().is_empty());
    }

    #[test]
    fn test_bad_condition_in_unused_alias_is_rejected() {
        let settings = Settings {
            aliases: vec![AliasDef {
                name: "typo".into(),
                rules: vec![RuleToken::matching(vec![MatchCondition {
                    field: ConditionField::Kind,
                    op: Operator::Eq,
                    value: "feild".into(),
                }])],
            }],
            ..Settings::default()
        };
        assert!(matches!(
            RuleSet::from_settings(settings),
            Err(ConfigError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_undefined_alias_is_rejected() {
        let err = RuleSet::new(vec![RuleToken::alias("nope")], Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedAlias { ref name } if name == "nope"));
        assert_eq!(err.to_string(), "alias `nope` is not defined");
    }

    #[test]
    fn test_builtin_alias_cannot_be_redefined() {
        let settings = Settings {
            aliases: vec![AliasDef {
                name: VISIBILITY_ALIAS.into(),
                rules: Vec::new(),
            }],
            ..Settings::default()
        };
        assert!(matches!(
            RuleSet::from_settings(settings),
            Err(ConfigError::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = RuleSet::new(
            vec![RuleToken::matching(vec![MatchCondition::name(Operator::Matches, "(")])],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_find_match_returns_first_rule() {
        let rules = RuleSet::new(
            vec![
                RuleToken::matching(vec![MatchCondition::kind(EntryKind::Field)]),
                RuleToken::alias(VISIBILITY_ALIAS),
            ],
            Vec::new(),
        )
        .unwrap();
        let rank = rules.find_match(&field("x", &["public"])).unwrap();
        assert_eq!(rank.ordinal, 0);
        let method = ArrangementEntry::new(EntryKind::Method, r(0, 1))
            .with_name("m")
            .with_modifiers(["private"]);
        assert_eq!(rules.find_match(&method).map(|r| r.ordinal), Some(4));
        let bare = ArrangementEntry::new(EntryKind::Method, r(0, 1)).with_name("m");
        assert!(rules.find_match(&bare).is_none());
    }

    #[rstest]
    #[case(MatchCondition::modifier(Modifier::Public), true)]
    #[case(MatchCondition::modifier(Modifier::Private), false)]
    #[case(condition(ConditionField::Modifier, Operator::Ne, "private"), true)]
    #[case(MatchCondition::kind(EntryKind::Field), true)]
    #[case(condition(ConditionField::Kind, Operator::Ne, "field"), false)]
    #[case(MatchCondition::name(Operator::Eq, "count"), true)]
    #[case(MatchCondition::name(Operator::Ne, "count"), false)]
    #[case(MatchCondition::name(Operator::Matches, "^co"), true)]
    #[case(MatchCondition::name(Operator::Matches, "^x"), false)]
    #[case(condition(ConditionField::Modifier, Operator::Matches, "^st"), true)]
    fn test_condition_matching(#[case] cond: MatchCondition, #[case] expected: bool) {
        let rules = RuleSet::new(vec![RuleToken::matching(vec![cond])], Vec::new()).unwrap();
        let entry = field("count", &["public", "static"]);
        assert_eq!(rules.find_match(&entry).is_some(), expected);
    }

    #[rstest]
    #[case(Operator::Eq, "feild")]
    #[case(Operator::Ne, "methods")]
    #[case(Operator::Eq, "")]
    fn test_unknown_kind_value_is_rejected(#[case] op: Operator, #[case] value: &str) {
        let cond = MatchCondition {
            field: ConditionField::Kind,
            op,
            value: value.into(),
        };
        let err = RuleSet::new(vec![RuleToken::matching(vec![cond])], Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCondition { field: "kind", .. }));
        assert!(err.to_string().starts_with(&format!("invalid `kind` condition value `{value}`")));
    }

    #[test]
    fn test_unknown_modifiers_match_regardless_of_case() {
        let cond = MatchCondition {
            field: ConditionField::Modifier,
            op: Operator::Eq,
            value: "volatile".into(),
        };
        let rules = RuleSet::new(vec![RuleToken::matching(vec![cond])], Vec::new()).unwrap();
        assert!(rules.find_match(&field("x", &["Volatile"])).is_some());
        assert!(rules.find_match(&field("y", &["VOLATILE"])).is_some());
        assert!(rules.find_match(&field("z", &["transient"])).is_none());
    }

    #[test]
    fn test_kind_value_is_case_insensitive() {
        let cond = MatchCondition {
            field: ConditionField::Kind,
            op: Operator::Eq,
            value: " Field ".into(),
        };
        let rules = RuleSet::new(vec![RuleToken::matching(vec![cond])], Vec::new()).unwrap();
        assert!(rules.find_match(&field("x", &[])).is_some());
        assert_eq!(rules.rules()[0].describe(), "kind = field");
    }

    #[test]
    fn test_conditions_are_a_conjunction() {
        let rules = RuleSet::new(
            vec![RuleToken::matching(vec![
                MatchCondition::modifier(Modifier::Public),
                MatchCondition::modifier(Modifier::Static),
            ])],
            Vec::new(),
        )
        .unwrap();
        assert!(rules.find_match(&field("a", &["public", "static"])).is_some());
        assert!(rules.find_match(&field("b", &["public"])).is_none());
    }

    #[test]
    fn test_default_rule_set() {
        let rules = RuleSet::default();
        assert_eq!(rules.rules().len(), 4);
        assert_eq!(rules.groupings(), &[GroupingRule::GettersAndSetters]);
        assert!(rules.spacing().is_none());
        assert!(rules.is_orderable(EntryKind::Attribute));
    }

    #[test]
    fn test_kind_filter() {
        let settings = Settings {
            kinds: Some(vec![EntryKind::Attribute]),
            ..Settings::default()
        };
        let rules = RuleSet::from_settings(settings).unwrap();
        assert!(rules.is_orderable(EntryKind::Attribute));
        assert!(!rules.is_orderable(EntryKind::Method));
    }
}
