//! Name-keyed validator registry
//!
//! Maps validator names to factories that build a validator from a
//! `ValidationContext`. A registry is an ordinary value: build one at start-up
//! and pass it to whatever needs lookups. Registries can be merged with
//! `import_from`/`export_to`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::context::ValidationContext;
use super::traits::Validator;
use crate::error::{DevsetupError, Result};

/// Builds a validator from a context
pub type ValidatorFactory = Arc<dyn Fn(&ValidationContext) -> Result<Arc<dyn Validator>> + Send + Sync>;

/// A validator type that knows its registry name and how to build itself
pub trait RegisteredValidator: Validator + Sized + 'static {
    /// Registry key
    const NAME: &'static str;

    /// Construct from the settings in a context
    fn from_context(ctx: &ValidationContext) -> Result<Self>;
}

/// A single registration
#[derive(Clone)]
pub struct RegistryEntry {
    /// Registry key
    pub name: String,
    /// Rust type the factory produces
    pub type_name: &'static str,
    factory: ValidatorFactory,
}

impl RegistryEntry {
    /// Build a validator through this entry's factory
    pub fn create(&self, ctx: &ValidationContext) -> Result<Arc<dyn Validator>> {
        (self.factory)(ctx)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Lookup table from validator names to factories
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator type under its own name
    pub fn register<V: RegisteredValidator>(&mut self) -> Result<()> {
        self.register_with(V::NAME, V::from_context)
    }

    /// Register a validator type with a custom factory
    pub fn register_with<V, F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        V: Validator + 'static,
        F: Fn(&ValidationContext) -> Result<V> + Send + Sync + 'static,
    {
        let build: ValidatorFactory =
            Arc::new(move |ctx: &ValidationContext| -> Result<Arc<dyn Validator>> { Ok(Arc::new(factory(ctx)?)) });
        self.insert(name.into(), std::any::type_name::<V>(), build)
    }

    /// Register a factory returning trait objects directly
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(&ValidationContext) -> Result<Arc<dyn Validator>> + Send + Sync + 'static,
    {
        self.insert(name.into(), "dyn Validator", Arc::new(factory))
    }

    fn insert(&mut self, name: String, type_name: &'static str, factory: ValidatorFactory) -> Result<()> {
        if self.entries.contains_key(&name) {
            return Err(DevsetupError::DuplicateValidator(name));
        }
        tracing::debug!(validator = %name, type_name, "Registered validator");
        self.entries.insert(
            name.clone(),
            RegistryEntry {
                name,
                type_name,
                factory,
            },
        );
        Ok(())
    }

    /// Build the validator registered under `name`
    pub fn create_validator(&self, name: &str, ctx: &ValidationContext) -> Result<Arc<dyn Validator>> {
        self.entries
            .get(name)
            .ok_or_else(|| DevsetupError::UnknownValidator(name.to_string()))?
            .create(ctx)
    }

    /// Build several validators, preserving the order of `names`
    pub fn create_validators<S: AsRef<str>>(&self, names: &[S], ctx: &ValidationContext) -> Result<Vec<Arc<dyn Validator>>> {
        names
            .iter()
            .map(|name| self.create_validator(name.as_ref(), ctx))
            .collect()
    }

    /// Registered names in sorted order
    pub fn list_validators(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Remove a registration, returning whether it existed
    pub fn unregister_validator(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy registrations from `other` whose names are not taken here.
    ///
    /// Existing names are kept, never overwritten. Returns how many entries
    /// were imported.
    pub fn import_from(&mut self, other: &ValidatorRegistry) -> usize {
        let mut imported = 0;
        for (name, entry) in &other.entries {
            if self.entries.contains_key(name) {
                tracing::debug!(validator = %name, "Skipping import, name already registered");
                continue;
            }
            self.entries.insert(name.clone(), entry.clone());
            imported += 1;
        }
        imported
    }

    /// Copy registrations from this registry into `other`
    pub fn export_to(&self, other: &mut ValidatorRegistry) -> usize {
        other.import_from(self)
    }
}
