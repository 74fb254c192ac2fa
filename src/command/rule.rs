//! Declarative option rules: how one parameter becomes command-line tokens.

use serde::{Deserialize, Serialize};

/// How many tokens a rule emits and where they go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Flag only, no value token. Used by boolean rules.
    Flag,
    /// Flag followed by one value token.
    Value,
    /// Flag and value repeated per list element, or one flag with the
    /// elements joined when the rule has a `combine` separator.
    Repeat,
    /// Bare value tokens appended after all options.
    Positional,
}

/// Declared kind of a parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `true`/`false`.
    Bool,
    /// Free text.
    String,
    /// Filesystem path; `~` is expanded.
    Path,
    /// Signed integer.
    Int,
    /// List of strings. A bare string is accepted as a one-element list.
    List,
}

impl ValueKind {
    /// Name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Path => "path",
            Self::Int => "int",
            Self::List => "list",
        }
    }
}

/// Which boolean value causes a flag to be emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Emit the flag when the parameter is `true`.
    #[default]
    EmitOnTrue,
    /// Emit the flag when the parameter is `false` (negated flags such as
    /// `--notruncate` for `truncate: false`).
    EmitOnFalse,
}

impl Polarity {
    /// The boolean value that triggers emission.
    pub fn trigger(&self) -> bool {
        matches!(self, Self::EmitOnTrue)
    }
}

/// Mapping from one parameter to its flag/value emission behavior.
///
/// # Example
///
/// ```
/// use cbk::command::{OptionRule, Arity, ValueKind, Polarity};
///
/// let rule = OptionRule::switch("heading", "--noheading").negated();
/// assert_eq!(rule.arity, Arity::Flag);
/// assert_eq!(rule.kind, ValueKind::Bool);
/// assert_eq!(rule.polarity, Polarity::EmitOnFalse);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRule {
    /// Parameter key.
    pub key: String,

    /// Alternate parameter names accepted for this rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Flag token. Empty for positionals.
    #[serde(default)]
    pub flag: String,

    /// Token arity.
    pub arity: Arity,

    /// Declared value kind.
    pub kind: ValueKind,

    /// Boolean polarity; only meaningful for `Bool` rules.
    #[serde(default)]
    pub polarity: Polarity,

    /// Emit even when the value is its kind's zero value (`0`, `""`).
    #[serde(default)]
    pub always_emit: bool,

    /// Join repeatable values with this separator behind a single flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<String>,

    /// For positionals: the build fails when the value is missing.
    #[serde(default)]
    pub required: bool,

    /// For positionals: accept values starting with `-`. Off by default so
    /// a value cannot be read as a flag by the tool.
    #[serde(default)]
    pub allow_leading_dash: bool,
}

impl OptionRule {
    fn new(key: &str, flag: &str, arity: Arity, kind: ValueKind) -> Self {
        Self {
            key: key.to_string(),
            aliases: Vec::new(),
            flag: flag.to_string(),
            arity,
            kind,
            polarity: Polarity::EmitOnTrue,
            always_emit: false,
            combine: None,
            required: false,
            allow_leading_dash: false,
        }
    }

    /// Boolean flag emitted when the parameter is `true`.
    pub fn switch(key: &str, flag: &str) -> Self {
        Self::new(key, flag, Arity::Flag, ValueKind::Bool)
    }

    /// Flag followed by a string value.
    pub fn value(key: &str, flag: &str) -> Self {
        Self::new(key, flag, Arity::Value, ValueKind::String)
    }

    /// Flag followed by a path value.
    pub fn path(key: &str, flag: &str) -> Self {
        Self::new(key, flag, Arity::Value, ValueKind::Path)
    }

    /// Flag followed by an integer value.
    pub fn int(key: &str, flag: &str) -> Self {
        Self::new(key, flag, Arity::Value, ValueKind::Int)
    }

    /// Flag repeated once per list element.
    pub fn repeat(key: &str, flag: &str) -> Self {
        Self::new(key, flag, Arity::Repeat, ValueKind::List)
    }

    /// Required positional string.
    pub fn positional(key: &str) -> Self {
        Self::new(key, "", Arity::Positional, ValueKind::String).required()
    }

    /// Optional positional list, one bare token per element.
    pub fn positional_list(key: &str) -> Self {
        Self::new(key, "", Arity::Positional, ValueKind::List)
    }

    /// Accept an alternate parameter name.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Emit the flag when the parameter is `false`.
    pub fn negated(mut self) -> Self {
        self.polarity = Polarity::EmitOnFalse;
        self
    }

    /// Emit zero values too.
    pub fn always(mut self) -> Self {
        self.always_emit = true;
        self
    }

    /// Join repeatable values behind one flag.
    pub fn combined(mut self, separator: &str) -> Self {
        self.combine = Some(separator.to_string());
        self
    }

    /// Mark the rule as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept positional values that start with `-` (trailing command
    /// arguments such as `-la`).
    pub fn allow_dashes(mut self) -> Self {
        self.allow_leading_dash = true;
        self
    }

    /// Mark the rule as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// All parameter names that address this rule, key first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `name` is this rule's key or one of its aliases.
    pub fn accepts(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Whether this is a positional rule.
    pub fn is_positional(&self) -> bool {
        self.arity == Arity::Positional
    }
}
