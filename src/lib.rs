//! rearrange core library.
//!
//! Computes the canonical order of orderable sibling elements (attributes of
//! a markup tag, members of a class) in a syntax tree supplied by a host, and
//! where a single new element should be inserted so that order holds.
//!
//! High-level modules:
//! - `extract`: Entry extraction restricted to text ranges.
//! - `rules`: Rule set construction, alias expansion, first-match ranking.
//! - `order`: Canonical order resolution, grouping rules, violations.
//! - `insert`: Insertion planning for a single new element.
//! - `spacing`: Blank-line advice between entries.
//! - `serializer`: TOML/YAML/JSON settings codec.
//! - `rearranger`: Host-facing `Rearranger` trait and `StdRearranger`.
//! - `cli`, `config`, `lint`, `output`, `utils`: the `rearrange` binary.
//! - `models`: Tree documents, settings schema, lint output structs.

pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod extract;
pub mod insert;
pub mod lint;
pub mod models;
pub mod order;
pub mod output;
pub mod rearranger;
pub mod rules;
pub mod serializer;
pub mod spacing;
pub mod utils;

pub use entry::{ArrangementEntry, EntryKind};
pub use error::{ConfigError, TreeError};
pub use extract::extract;
pub use insert::{plan_insertion, plan_insertion_in, Insertion};
pub use order::{arrange, CanonicalOrder};
pub use rearranger::{Rearranger, StdRearranger};
pub use rules::{MatchRule, RuleSet};
pub use serializer::{SettingsFormat, SettingsSerializer};
pub use spacing::{spacing, Spacing};
