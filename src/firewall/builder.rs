//! Assembles the security object graph from configuration.
//!
//! Seeds the framework templates, then walks the configured firewalls
//! and dispatches each mechanism section to its factory. The legacy
//! pipeline collects provider references into a per-firewall
//! authentication manager; the newer pipeline collects authenticator
//! references instead.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info};

use super::config::{FirewallConfig, SecurityConfig};
use crate::container::{Argument, ContainerBuilder, Definition};
use crate::saml::SamlSpFactory;
use crate::security::{handlers, FactoryRegistry};

/// Builds the bootstrap container from a security configuration.
pub struct SecurityBuilder {
    registry: FactoryRegistry,
}

impl SecurityBuilder {
    /// Create a builder over the given factory registry.
    pub fn new(registry: FactoryRegistry) -> Self {
        Self { registry }
    }

    /// Create a builder with the built-in factories registered.
    pub fn with_default_factories() -> Result<Self> {
        let mut registry = FactoryRegistry::new();
        registry.register(Box::new(SamlSpFactory::new()))?;
        Ok(Self::new(registry))
    }

    /// The factory registry this builder dispatches through.
    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Build the container: templates, then one pass per firewall, then a
    /// resolution check over every concrete definition.
    pub fn build(&self, config: &SecurityConfig) -> Result<ContainerBuilder> {
        config.validate().map_err(|e| anyhow!(e))?;

        let mut container = ContainerBuilder::new();
        handlers::register_handler_templates(&mut container);
        for factory in self.registry.iter() {
            factory.register_templates(&mut container);
        }

        for (name, firewall) in &config.firewalls {
            self.build_firewall(&mut container, name, firewall)?;
        }

        container.verify()?;
        Ok(container)
    }

    fn build_firewall(
        &self,
        container: &mut ContainerBuilder,
        name: &str,
        firewall: &FirewallConfig,
    ) -> Result<()> {
        for key in firewall.mechanisms.keys() {
            if self.registry.get(key).is_none() {
                bail!(
                    "Unknown authentication mechanism \"{}\" on firewall \"{}\" (available: {})",
                    key,
                    name,
                    self.registry.keys().join(", ")
                );
            }
        }

        let user_provider_id = firewall.user_provider_id();
        if let Some(ref id) = user_provider_id {
            container.set_definition(id.clone(), Definition::service());
        }

        if firewall.authenticators {
            // Validated upstream: the authenticator pipeline names a provider.
            let user_provider = user_provider_id
                .as_deref()
                .ok_or_else(|| anyhow!("Firewall \"{}\" has no user provider", name))?;

            let mut authenticator_ids = Vec::new();
            for factory in self.registry.iter() {
                let section = match firewall.mechanisms.get(factory.key()) {
                    Some(section) => section,
                    None => continue,
                };
                debug!(
                    firewall = %name,
                    mechanism = %factory.key(),
                    position = %factory.position(),
                    "Dispatching mechanism section"
                );
                let id = factory.create_authenticator(container, name, section, user_provider)?;
                authenticator_ids.push(id);
            }

            let manager_id = format!("security.authenticator.manager.{}", name);
            container
                .set_definition(&manager_id, Definition::service())
                .replace_argument(0, Argument::ReferenceList(authenticator_ids.clone()));

            info!(
                firewall = %name,
                authenticators = authenticator_ids.len(),
                manager_id = %manager_id,
                "Assembled firewall on the authenticator pipeline"
            );
        } else {
            let mut provider_ids = Vec::new();
            for factory in self.registry.iter() {
                let section = match firewall.mechanisms.get(factory.key()) {
                    Some(section) => section,
                    None => continue,
                };
                debug!(
                    firewall = %name,
                    mechanism = %factory.key(),
                    position = %factory.position(),
                    "Dispatching mechanism section"
                );
                let id = factory.create_auth_provider(
                    container,
                    name,
                    section,
                    user_provider_id.as_deref(),
                )?;
                provider_ids.push(id);
                factory.create_listener(container, name)?;
            }

            let manager_id = format!("security.authentication.manager.{}", name);
            container
                .set_definition(&manager_id, Definition::service())
                .replace_argument(0, Argument::ReferenceList(provider_ids.clone()));

            info!(
                firewall = %name,
                providers = provider_ids.len(),
                manager_id = %manager_id,
                "Assembled firewall"
            );
        }

        Ok(())
    }
}
