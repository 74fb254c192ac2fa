//! Registry trait and default implementation for operation specs.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::spec::{ChangePolicy, OperationSpec};
use super::tables;

/// Errors raised when registering operation specs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// An operation with the same name is already registered.
	#[error("operation already registered: {name}")]
	DuplicateName {
		/// Name of the duplicate operation.
		name: String,
	},

	/// The spec is malformed (e.g. a positional rule in the option list).
	#[error("invalid operation spec {name}: {message}")]
	InvalidSpec {
		/// Name of the offending operation.
		name: String,
		/// What is wrong with it.
		message: String,
	},
}

/// A registry of operation specs, looked up by operation name.
///
/// This trait is object-safe and can be used with `dyn CommandRegistry`.
///
/// # Example
///
/// ```
/// use cbk::command::{CommandRegistry, DefaultCommandRegistry, OperationSpec, ChangePolicy};
///
/// let mut registry = DefaultCommandRegistry::new();
/// registry.register(OperationSpec::new("version", ChangePolicy::ReadOnly)).unwrap();
///
/// assert!(registry.contains("version"));
/// assert_eq!(registry.len(), 1);
/// ```
pub trait CommandRegistry {
	/// Register a spec.
	///
	/// Returns an error if a spec with the same name already exists or the
	/// spec is malformed.
	fn register(&mut self, spec: OperationSpec) -> Result<(), RegistryError>;

	/// Get a spec by operation name.
	fn get(&self, name: &str) -> Option<&OperationSpec>;

	/// List all specs, sorted by name.
	fn list(&self) -> Vec<&OperationSpec>;

	/// List specs with the given change policy, sorted by name.
	fn list_by_policy(&self, policy: ChangePolicy) -> Vec<&OperationSpec>;

	/// Check if an operation exists.
	fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Number of registered specs.
	fn len(&self) -> usize;

	/// Check if the registry is empty.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// All operation names, sorted.
	fn names(&self) -> Vec<&str>;
}

/// Default implementation of `CommandRegistry` backed by a HashMap.
#[derive(Debug, Default, Clone)]
pub struct DefaultCommandRegistry {
	specs: HashMap<String, OperationSpec>,
}

impl DefaultCommandRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry holding the built-in buildah operations.
	pub fn with_builtins() -> Self {
		tables::builtin_specs().into_iter().collect()
	}

	/// Register a spec, replacing any existing one with the same name.
	///
	/// Used to let configuration override built-in tables.
	pub fn register_or_replace(
		&mut self,
		spec: OperationSpec,
	) -> Result<Option<OperationSpec>, RegistryError> {
		validate(&spec)?;
		Ok(self.specs.insert(spec.name.clone(), spec))
	}

	/// Iterate over all specs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &OperationSpec)> {
		self.specs.iter()
	}
}

impl CommandRegistry for DefaultCommandRegistry {
	fn register(&mut self, spec: OperationSpec) -> Result<(), RegistryError> {
		if self.specs.contains_key(&spec.name) {
			return Err(RegistryError::DuplicateName { name: spec.name });
		}
		validate(&spec)?;
		self.specs.insert(spec.name.clone(), spec);
		Ok(())
	}

	fn get(&self, name: &str) -> Option<&OperationSpec> {
		self.specs.get(name)
	}

	fn list(&self) -> Vec<&OperationSpec> {
		let mut specs: Vec<&OperationSpec> = self.specs.values().collect();
		specs.sort_by(|a, b| a.name.cmp(&b.name));
		specs
	}

	fn list_by_policy(&self, policy: ChangePolicy) -> Vec<&OperationSpec> {
		self.list()
			.into_iter()
			.filter(|spec| spec.policy == policy)
			.collect()
	}

	fn len(&self) -> usize {
		self.specs.len()
	}

	fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.specs.keys().map(|s| s.as_str()).collect();
		names.sort_unstable();
		names
	}
}

impl FromIterator<OperationSpec> for DefaultCommandRegistry {
	fn from_iter<T: IntoIterator<Item = OperationSpec>>(iter: T) -> Self {
		let specs = iter
			.into_iter()
			.map(|spec| (spec.name.clone(), spec))
			.collect();
		Self { specs }
	}
}

/// The process-wide built-in registry, built on first use and never mutated.
pub fn builtin_registry() -> &'static DefaultCommandRegistry {
	static BUILTIN: OnceLock<DefaultCommandRegistry> = OnceLock::new();
	BUILTIN.get_or_init(DefaultCommandRegistry::with_builtins)
}

fn validate(spec: &OperationSpec) -> Result<(), RegistryError> {
	let invalid = |message: String| RegistryError::InvalidSpec {
		name: spec.name.clone(),
		message,
	};

	if spec.subcommand.trim().is_empty() {
		return Err(invalid("subcommand is empty".to_string()));
	}
	if let Some(rule) = spec.options.iter().find(|r| r.is_positional()) {
		return Err(invalid(format!("option {} has positional arity", rule.key)));
	}
	if let Some(rule) = spec.positionals.iter().find(|r| !r.is_positional()) {
		return Err(invalid(format!("positional {} has option arity", rule.key)));
	}
	if let Some(rule) = spec.options.iter().find(|r| r.flag.is_empty()) {
		return Err(invalid(format!("option {} has no flag", rule.key)));
	}

	let mut seen: Vec<&str> = Vec::new();
	for name in spec.rules().flat_map(|r| r.names()) {
		if seen.contains(&name) {
			return Err(invalid(format!("parameter {} is declared twice", name)));
		}
		seen.push(name);
	}

	for key in spec.exclusive.iter().chain(spec.one_of.iter()).flatten() {
		if spec.rule(key).is_none() {
			return Err(invalid(format!("group refers to unknown parameter {}", key)));
		}
	}

	Ok(())
}
