//! Parameter values supplied by the caller for one operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::error::BuildError;

/// A single parameter value.
///
/// Values arrive as JSON from the orchestration layer, so this enum is
/// deserialized untagged: `true`, `3`, `"text"`, `["a", "b"]` and `null`
/// map onto the matching variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Explicit null, treated the same as an absent parameter.
    Null,
    /// Boolean switch.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// String or path value.
    Str(String),
    /// List of strings.
    List(Vec<String>),
}

impl ParamValue {
    /// Short name of the JSON shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Immutable mapping from parameter name to value for one call.
///
/// Keys are kept sorted so that iteration (and therefore error reporting)
/// is deterministic.
///
/// # Example
///
/// ```
/// use cbk::command::{ParameterSet, ParamValue};
///
/// let params = ParameterSet::new()
///     .with("container", "c1")
///     .with("quiet", true);
///
/// assert_eq!(params.get("container"), Some(&ParamValue::Str("c1".into())));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter using builder pattern.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Build a parameter set from a JSON object.
    ///
    /// `null` input yields an empty set; anything other than an object is
    /// rejected.
    pub fn from_json(value: Value) -> Result<Self, BuildError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(_) => serde_json::from_value(value).map_err(|e| BuildError::InvalidValue {
                key: "<parameters>".to_string(),
                expected: "object of bool, int, string or string list values".to_string(),
                found: e.to_string(),
            }),
            other => Err(BuildError::InvalidValue {
                key: "<parameters>".to_string(),
                expected: "object".to_string(),
                found: json_type_name(&other).to_string(),
            }),
        }
    }

    /// Get a value by key. Null values are reported as absent.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Iterate over all keys, including those holding null.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
