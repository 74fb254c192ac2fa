//! Per-operation command specification.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rule::OptionRule;

/// Whether a successful run of an operation mutates the image/container store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePolicy {
    /// Listing or inspection; success reports `changed = false`.
    ReadOnly,
    /// Success reports `changed = true`.
    Mutating,
}

impl ChangePolicy {
    /// The changed flag reported on success.
    pub fn changed_on_success(&self) -> bool {
        matches!(self, Self::Mutating)
    }
}

impl fmt::Display for ChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::Mutating => write!(f, "mutating"),
        }
    }
}

/// The immutable table describing one operation.
///
/// Tokens are emitted as: subcommand, then `options` in declaration order,
/// then `positionals` in declaration order.
///
/// # Example
///
/// ```
/// use cbk::command::{OperationSpec, OptionRule, ChangePolicy};
///
/// let spec = OperationSpec::new("rm", ChangePolicy::Mutating)
///     .option(OptionRule::switch("all", "--all"))
///     .positional(OptionRule::positional("name").optional())
///     .exclusive(&["name", "all"])
///     .one_of(&["name", "all"]);
///
/// assert_eq!(spec.subcommand, "rm");
/// assert!(spec.rule("all").is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Operation name used for lookup.
    pub name: String,

    /// Subcommand token passed to the binary.
    pub subcommand: String,

    /// Option rules in emission order.
    #[serde(default)]
    pub options: Vec<OptionRule>,

    /// Positional rules in emission order.
    #[serde(default)]
    pub positionals: Vec<OptionRule>,

    /// Groups of parameters that must not be present together.
    #[serde(default)]
    pub exclusive: Vec<Vec<String>>,

    /// Groups of parameters of which at least one must be present.
    #[serde(default)]
    pub one_of: Vec<Vec<String>>,

    /// Changed-state policy.
    pub policy: ChangePolicy,
}

impl OperationSpec {
    /// Create a spec whose name equals its subcommand.
    pub fn new(subcommand: &str, policy: ChangePolicy) -> Self {
        Self {
            name: subcommand.to_string(),
            subcommand: subcommand.to_string(),
            options: Vec::new(),
            positionals: Vec::new(),
            exclusive: Vec::new(),
            one_of: Vec::new(),
            policy,
        }
    }

    /// Append an option rule.
    pub fn option(mut self, rule: OptionRule) -> Self {
        self.options.push(rule);
        self
    }

    /// Append a positional rule.
    pub fn positional(mut self, rule: OptionRule) -> Self {
        self.positionals.push(rule);
        self
    }

    /// Declare a mutual exclusion group.
    pub fn exclusive(mut self, keys: &[&str]) -> Self {
        self.exclusive
            .push(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Declare an "at least one of" group.
    pub fn one_of(mut self, keys: &[&str]) -> Self {
        self.one_of.push(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// All rules, options first.
    pub fn rules(&self) -> impl Iterator<Item = &OptionRule> {
        self.options.iter().chain(self.positionals.iter())
    }

    /// Find a rule by key or alias.
    pub fn rule(&self, name: &str) -> Option<&OptionRule> {
        self.rules().find(|r| r.accepts(name))
    }
}
