//! Translator registry: a thread-safe, name-keyed lookup of translator instances.
//!
//! Grounded on `TranslationPipeline`'s registration methods in `other_examples/75da8d08`,
//! generalised into a plain `RwLock<HashMap<...>>`, and on the original agentgateway's own
//! enum-dispatch `AIProvider` idiom (`other_examples/2385e10c`, `other_examples/c6391760`) for
//! the capability-trait split, adapted from enum-dispatch to trait-object dispatch since this
//! crate ships exactly one concrete translator rather than that enum's six providers.

use std::collections::HashMap;
use std::sync::Arc;

use agent_core::prelude::Strng;
use agent_core::strng;
use parking_lot::RwLock;
use tracing::warn;

use crate::error::RegistryError;
use crate::llm::Translator;

/// A reader/writer-locked, name-keyed collection of `Arc<dyn Translator>`. Reads dominate, since
/// lookups happen once per ingress request while registration happens only at startup or on
/// dynamic reload.
#[derive(Default)]
pub struct Registry {
	translators: RwLock<HashMap<Strng, Arc<dyn Translator>>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `instance` under `name`, overwriting any previous registration with a warning.
	/// Rejects an empty name outright.
	pub fn register(&self, name: Strng, instance: Arc<dyn Translator>) -> Result<(), RegistryError> {
		if name.is_empty() {
			return Err(RegistryError::EmptyName);
		}
		let mut translators = self.translators.write();
		if translators.insert(name.clone(), instance).is_some() {
			warn!("overwriting existing translator registration for {name:?}");
		}
		Ok(())
	}

	/// Looks up a translator by name; on miss, the error carries the sorted list of known names
	/// so the caller can surface a useful message.
	pub fn get(&self, name: &str) -> Result<Arc<dyn Translator>, RegistryError> {
		let translators = self.translators.read();
		translators
			.get(name)
			.cloned()
			.ok_or_else(|| RegistryError::NotFound {
				name: name.to_string(),
				available: self.available_names_locked(&translators),
			})
	}

	/// A snapshot copy of every registered translator, keyed by name.
	pub fn get_all(&self) -> HashMap<Strng, Arc<dyn Translator>> {
		self.translators.read().clone()
	}

	/// The sorted list of registered names.
	pub fn available_names(&self) -> Vec<Strng> {
		self.available_names_locked(&self.translators.read())
	}

	fn available_names_locked(&self, translators: &HashMap<Strng, Arc<dyn Translator>>) -> Vec<Strng> {
		let mut names: Vec<Strng> = translators.keys().cloned().collect();
		names.sort();
		names
	}
}
