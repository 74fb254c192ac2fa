//! Argument builder: parameter set + operation spec -> argument vector.
//!
//! The builder is a pure function. Validation happens in a fixed order
//! (unknown keys, value kinds and alias clashes, exclusion groups,
//! required-one-of groups, required positionals) and completes before any
//! token is emitted, so a rejected parameter set never yields a partial
//! vector.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use super::error::BuildError;
use super::params::{ParamValue, ParameterSet};
use super::rule::{Arity, OptionRule, ValueKind};
use super::spec::OperationSpec;

/// Ordered tokens for one invocation, subcommand first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    /// Borrow the tokens.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Take the tokens.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    fn push(&mut self, token: impl Into<String>) {
        self.0.push(token.into());
    }
}

impl Deref for ArgumentVector {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for ArgumentVector {
    /// Space-joined tokens, quoting those that contain whitespace or are
    /// empty. For logs only; the vector is never passed through a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|t| {
                if t.is_empty() || t.chars().any(char::is_whitespace) {
                    format!("{:?}", t)
                } else {
                    t.clone()
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// A parameter value checked against its rule's kind.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl Resolved {
    fn tokens(&self) -> Vec<String> {
        match self {
            Self::Bool(b) => vec![b.to_string()],
            Self::Int(i) => vec![i.to_string()],
            Self::Text(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }
}

/// Build the argument vector for `spec` from `params`.
///
/// # Example
///
/// ```
/// use cbk::command::{build, builtin_registry, CommandRegistry, ParameterSet};
///
/// let registry = builtin_registry();
/// let spec = registry.get("rm").unwrap();
/// let argv = build(spec, &ParameterSet::new().with("all", true)).unwrap();
/// assert_eq!(argv.as_slice(), ["rm", "--all"]);
/// ```
pub fn build(spec: &OperationSpec, params: &ParameterSet) -> Result<ArgumentVector, BuildError> {
    for key in params.keys() {
        if spec.rule(key).is_none() {
            return Err(BuildError::unknown_parameter(&spec.name, key));
        }
    }

    let mut resolved: HashMap<&str, Resolved> = HashMap::new();
    for rule in spec.rules() {
        if let Some(value) = lookup(spec, rule, params)? {
            let value = resolve(rule, value)?;
            check_leading_dash(rule, &value)?;
            if is_present(rule, &value) {
                resolved.insert(rule.key.as_str(), value);
            }
        }
    }

    for group in &spec.exclusive {
        let supplied: Vec<&str> = group
            .iter()
            .filter_map(|k| present_key(spec, &resolved, k))
            .collect();
        if supplied.len() > 1 {
            return Err(BuildError::conflicting(&spec.name, supplied));
        }
    }

    for group in &spec.one_of {
        if group.iter().all(|k| present_key(spec, &resolved, k).is_none()) {
            return Err(BuildError::missing(&spec.name, group.iter().map(String::as_str)));
        }
    }

    for rule in spec.rules().filter(|r| r.required) {
        if !resolved.contains_key(rule.key.as_str()) {
            return Err(BuildError::missing(&spec.name, [rule.key.as_str()]));
        }
    }

    let mut argv = ArgumentVector::default();
    argv.push(&spec.subcommand);

    for rule in spec.rules() {
        if let Some(value) = resolved.get(rule.key.as_str()) {
            emit(&mut argv, rule, value);
        }
    }

    Ok(argv)
}

/// Canonical key of the rule addressed by `name`, if that rule emits tokens.
fn present_key<'s>(
    spec: &'s OperationSpec,
    resolved: &HashMap<&str, Resolved>,
    name: &str,
) -> Option<&'s str> {
    spec.rule(name)
        .map(|r| r.key.as_str())
        .filter(|key| resolved.contains_key(key))
}

/// Find the value for a rule under its key or one of its aliases.
fn lookup<'a>(
    spec: &OperationSpec,
    rule: &OptionRule,
    params: &'a ParameterSet,
) -> Result<Option<&'a ParamValue>, BuildError> {
    let supplied: Vec<(&str, &ParamValue)> = rule
        .names()
        .filter_map(|name| params.get(name).map(|v| (name, v)))
        .collect();

    match supplied.as_slice() {
        [] => Ok(None),
        [(_, value)] => Ok(Some(*value)),
        many => Err(BuildError::conflicting(
            &spec.name,
            many.iter().map(|(name, _)| *name),
        )),
    }
}

fn resolve(rule: &OptionRule, value: &ParamValue) -> Result<Resolved, BuildError> {
    let mismatch = || BuildError::invalid_value(&rule.key, rule.kind.as_str(), value.type_name());

    match (rule.kind, value) {
        (ValueKind::Bool, ParamValue::Bool(b)) => Ok(Resolved::Bool(*b)),
        (ValueKind::Int, ParamValue::Int(i)) => Ok(Resolved::Int(*i)),
        (ValueKind::String, ParamValue::Str(s)) => Ok(Resolved::Text(s.clone())),
        (ValueKind::Path, ParamValue::Str(s)) => {
            Ok(Resolved::Text(shellexpand::tilde(s).into_owned()))
        }
        (ValueKind::List, ParamValue::List(items)) => Ok(Resolved::List(items.clone())),
        (ValueKind::List, ParamValue::Str(s)) => Ok(Resolved::List(vec![s.clone()])),
        _ => Err(mismatch()),
    }
}

/// Positional values must not look like flags unless the rule allows it.
fn check_leading_dash(rule: &OptionRule, value: &Resolved) -> Result<(), BuildError> {
    if !rule.is_positional() || rule.allow_leading_dash {
        return Ok(());
    }
    match value.tokens().into_iter().find(|t| t.starts_with('-')) {
        Some(token) => Err(BuildError::invalid_value(
            &rule.key,
            "value not starting with '-'",
            token,
        )),
        None => Ok(()),
    }
}

/// Presence predicate: does this value emit tokens under this rule?
fn is_present(rule: &OptionRule, value: &Resolved) -> bool {
    match value {
        Resolved::Bool(b) => *b == rule.polarity.trigger(),
        Resolved::Int(i) => *i != 0 || rule.always_emit,
        Resolved::Text(s) => !s.is_empty() || rule.always_emit,
        Resolved::List(items) => !items.is_empty(),
    }
}

fn emit(argv: &mut ArgumentVector, rule: &OptionRule, value: &Resolved) {
    match rule.arity {
        Arity::Flag => argv.push(&rule.flag),
        Arity::Value => {
            argv.push(&rule.flag);
            argv.push(value.tokens().join(rule.combine.as_deref().unwrap_or(",")));
        }
        Arity::Repeat => match &rule.combine {
            Some(separator) => {
                argv.push(&rule.flag);
                argv.push(value.tokens().join(separator));
            }
            None => {
                for token in value.tokens() {
                    argv.push(&rule.flag);
                    argv.push(token);
                }
            }
        },
        Arity::Positional => {
            for token in value.tokens() {
                argv.push(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::spec::ChangePolicy;

    fn sample_spec() -> OperationSpec {
        OperationSpec::new("sample", ChangePolicy::Mutating)
            .option(OptionRule::switch("quiet", "--quiet"))
            .option(OptionRule::switch("heading", "--noheading").negated())
            .option(OptionRule::value("format", "--format"))
            .option(OptionRule::int("retries", "--retries"))
            .option(OptionRule::int("level", "--level").always())
            .option(OptionRule::repeat("env", "--env"))
            .option(OptionRule::repeat("caps", "--cap-add").combined(","))
            .option(OptionRule::path("authfile", "--authfile"))
            .positional(OptionRule::positional("container").alias("name"))
            .positional(OptionRule::positional_list("args").allow_dashes())
    }

    fn argv(spec: &OperationSpec, params: ParameterSet) -> Vec<String> {
        build(spec, &params).unwrap().into_inner()
    }

    #[test]
    fn test_only_required_positionals() {
        let spec = sample_spec();
        assert_eq!(
            argv(&spec, ParameterSet::new().with("container", "c1")),
            vec!["sample", "c1"]
        );
    }

    #[test]
    fn test_declaration_order_not_parameter_order() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("args", vec!["x"])
            .with("format", "oci")
            .with("container", "c1")
            .with("quiet", true);

        assert_eq!(
            argv(&spec, params),
            vec!["sample", "--quiet", "--format", "oci", "c1", "x"]
        );
    }

    #[test]
    fn test_bool_polarity() {
        let spec = sample_spec();
        let base = || ParameterSet::new().with("container", "c1");

        assert_eq!(argv(&spec, base().with("quiet", false)), vec!["sample", "c1"]);
        assert_eq!(argv(&spec, base().with("heading", true)), vec!["sample", "c1"]);
        assert_eq!(
            argv(&spec, base().with("heading", false)),
            vec!["sample", "--noheading", "c1"]
        );
    }

    #[test]
    fn test_zero_values_are_absent() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("format", "")
            .with("retries", 0i64)
            .with("env", Vec::<String>::new());

        assert_eq!(argv(&spec, params), vec!["sample", "c1"]);
    }

    #[test]
    fn test_always_emit_zero() {
        let spec = sample_spec();
        let params = ParameterSet::new().with("container", "c1").with("level", 0i64);

        assert_eq!(argv(&spec, params), vec!["sample", "--level", "0", "c1"]);
    }

    #[test]
    fn test_repeatable_and_combined() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("env", vec!["A=1", "B=2"])
            .with("caps", vec!["CAP_NET_ADMIN", "CAP_SYS_ADMIN"]);

        assert_eq!(
            argv(&spec, params),
            vec![
                "sample",
                "--env",
                "A=1",
                "--env",
                "B=2",
                "--cap-add",
                "CAP_NET_ADMIN,CAP_SYS_ADMIN",
                "c1"
            ]
        );
    }

    #[test]
    fn test_scalar_accepted_for_list() {
        let spec = sample_spec();
        let params = ParameterSet::new().with("container", "c1").with("env", "A=1");

        assert_eq!(argv(&spec, params), vec!["sample", "--env", "A=1", "c1"]);
    }

    #[test]
    fn test_positional_rejects_flag_like_value() {
        let spec = sample_spec();

        let err = build(&spec, &ParameterSet::new().with("name", "--quiet")).unwrap_err();
        assert_eq!(
            err,
            BuildError::invalid_value("container", "value not starting with '-'", "--quiet")
        );

        let strict = OperationSpec::new("strict", ChangePolicy::Mutating)
            .positional(OptionRule::positional_list("names"));
        let err = build(&strict, &ParameterSet::new().with("names", vec!["ok", "-x"]))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { ref found, .. } if found == "-x"));
    }

    #[test]
    fn test_positional_list_order() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("args", vec!["ls", "-la", "/tmp"]);

        assert_eq!(argv(&spec, params), vec!["sample", "c1", "ls", "-la", "/tmp"]);

        let single = ParameterSet::new().with("container", "c1").with("args", vec!["pwd"]);
        assert_eq!(argv(&spec, single), vec!["sample", "c1", "pwd"]);
    }

    #[test]
    fn test_alias_resolves_to_rule() {
        let spec = sample_spec();
        assert_eq!(
            argv(&spec, ParameterSet::new().with("name", "c1")),
            vec!["sample", "c1"]
        );
    }

    #[test]
    fn test_key_and_alias_conflict() {
        let spec = sample_spec();
        let params = ParameterSet::new().with("container", "c1").with("name", "c2");

        let err = build(&spec, &params).unwrap_err();
        assert_eq!(err, BuildError::conflicting("sample", ["container", "name"]));
    }

    #[test]
    fn test_path_tilde_expansion() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("authfile", "~/auth.json");

        let tokens = argv(&spec, params);
        assert_eq!(tokens[1], "--authfile");
        assert!(!tokens[2].starts_with('~'));
        assert!(tokens[2].ends_with("auth.json"));
    }

    #[test]
    fn test_missing_required_positional() {
        let spec = sample_spec();
        let err = build(&spec, &ParameterSet::new().with("quiet", true)).unwrap_err();
        assert_eq!(err, BuildError::missing("sample", ["container"]));
    }

    #[test]
    fn test_empty_required_positional_is_missing() {
        let spec = sample_spec();
        let err = build(&spec, &ParameterSet::new().with("container", "")).unwrap_err();
        assert!(matches!(err, BuildError::MissingRequiredOption { .. }));
    }

    #[test]
    fn test_invalid_value_kind() {
        let spec = sample_spec();
        let params = ParameterSet::new().with("container", "c1").with("quiet", "yes");

        let err = build(&spec, &params).unwrap_err();
        assert_eq!(err, BuildError::invalid_value("quiet", "bool", "string"));
    }

    #[test]
    fn test_unknown_parameter() {
        let spec = sample_spec();
        let params = ParameterSet::new().with("container", "c1").with("qiet", true);

        let err = build(&spec, &params).unwrap_err();
        assert_eq!(err, BuildError::unknown_parameter("sample", "qiet"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("format", ParamValue::Null);

        assert_eq!(argv(&spec, params), vec!["sample", "c1"]);
    }

    #[test]
    fn test_exclusive_and_one_of_groups() {
        let spec = OperationSpec::new("rm", ChangePolicy::Mutating)
            .option(OptionRule::switch("all", "--all"))
            .positional(OptionRule::positional("name").optional())
            .exclusive(&["name", "all"])
            .one_of(&["name", "all"]);

        assert_eq!(
            build(&spec, &ParameterSet::new()).unwrap_err(),
            BuildError::missing("rm", ["name", "all"])
        );
        assert_eq!(
            build(&spec, &ParameterSet::new().with("name", "c1").with("all", true)).unwrap_err(),
            BuildError::conflicting("rm", ["name", "all"])
        );
        // all=false is not "present", so it does not clash with name.
        assert_eq!(
            argv(&spec, ParameterSet::new().with("name", "c1").with("all", false)),
            vec!["rm", "c1"]
        );
    }

    #[test]
    fn test_deterministic() {
        let spec = sample_spec();
        let params = ParameterSet::new()
            .with("container", "c1")
            .with("env", vec!["A=1", "B=2"])
            .with("quiet", true)
            .with("retries", 3i64);

        let first = build(&spec, &params).unwrap();
        for _ in 0..10 {
            assert_eq!(build(&spec, &params).unwrap(), first);
        }
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let argv = ArgumentVector::from(vec![
            "config".to_string(),
            "--cmd".to_string(),
            "sleep 10".to_string(),
            "c1".to_string(),
        ]);
        assert_eq!(argv.to_string(), r#"config --cmd "sleep 10" c1"#);
    }
}
