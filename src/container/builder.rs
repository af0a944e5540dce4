//! String-keyed service registry mutated during bootstrap.
//!
//! The builder holds every definition registered while the security
//! configuration is processed. Wiring happens once, single-threaded,
//! before any request handling; the builder is plain owned data.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::definition::Definition;

/// Registration table for service definitions.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerBuilder {
    definitions: BTreeMap<String, Definition>,
}

impl ContainerBuilder {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under `id`, replacing any previous one.
    ///
    /// Returns a mutable handle to the stored definition so callers can
    /// chain argument and method-call wiring.
    pub fn set_definition(&mut self, id: impl Into<String>, definition: Definition) -> &mut Definition {
        match self.definitions.entry(id.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(definition);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(definition),
        }
    }

    /// Look up a definition by id.
    pub fn get_definition(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id)
    }

    /// Whether a definition is registered under `id`.
    pub fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the container holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve a definition by flattening its inheritance chain.
    ///
    /// Parent template arguments and method calls form the base; arguments
    /// set on the child replace the parent's at the same index, and the
    /// child's method calls run after the parent's. A missing parent or an
    /// inheritance cycle is a configuration error.
    pub fn resolve(&self, id: &str) -> Result<Definition> {
        let mut chain = Vec::new();
        let mut current = id;
        loop {
            let definition = match self.get_definition(current) {
                Some(d) => d,
                None if current == id => bail!("No service definition registered for \"{}\"", id),
                None => bail!(
                    "Service \"{}\" inherits from unknown template \"{}\"",
                    id,
                    current
                ),
            };
            if chain.iter().any(|(seen, _)| *seen == current) {
                bail!("Inheritance cycle detected while resolving \"{}\"", id);
            }
            chain.push((current, definition));
            match &definition.parent {
                Some(parent) => current = parent.as_str(),
                None => break,
            }
        }

        // Apply from the root template down to the requested definition.
        let mut resolved = Definition::service();
        for (_, definition) in chain.iter().rev() {
            for (index, argument) in &definition.arguments {
                resolved.arguments.insert(*index, argument.clone());
            }
            resolved.method_calls.extend(definition.method_calls.iter().cloned());
        }
        resolved.is_abstract = chain[0].1.is_abstract;
        Ok(resolved)
    }

    /// Resolve every concrete definition, failing on the first broken one.
    pub fn verify(&self) -> Result<()> {
        for (id, definition) in &self.definitions {
            if definition.is_abstract {
                continue;
            }
            self.resolve(id)?;
        }
        Ok(())
    }
}
