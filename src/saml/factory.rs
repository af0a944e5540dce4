//! SAML SP authentication factory.
//!
//! Registers the per-firewall authentication provider and listener
//! (legacy pipeline) or authenticator (newer pipeline) as children of the
//! framework-level SAML SP templates, wiring configuration keys onto
//! positional constructor arguments.

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::config::SamlSpConfig;
use crate::container::{Argument, ContainerBuilder, Definition};
use crate::security::factory::{Position, SecurityFactory};
use crate::security::handlers;

/// Abstract provider template per-firewall providers inherit from.
pub const PROVIDER_TEMPLATE: &str = "security.authentication.provider.lightsaml_sp";

/// Abstract listener template per-firewall listeners inherit from.
pub const LISTENER_TEMPLATE: &str = "security.authentication.listener.lightsaml_sp";

/// Abstract authenticator template (newer pipeline).
pub const AUTHENTICATOR_TEMPLATE: &str = "security.authenticator.lightsaml_sp";

/// Configuration key under which firewalls select this mechanism.
pub const FACTORY_KEY: &str = "light_saml_sp";

/// Built-in username mapper the provider template defaults to.
pub const DEFAULT_USERNAME_MAPPER: &str = "lightsaml_sp.username_mapper.simple";

/// Built-in attribute mapper the provider template defaults to.
pub const DEFAULT_ATTRIBUTE_MAPPER: &str = "lightsaml_sp.attribute_mapper.simple";

/// Built-in token factory the provider template defaults to.
pub const DEFAULT_TOKEN_FACTORY: &str = "lightsaml_sp.token_factory";

/// Response validator wired into the provider template.
pub const RESPONSE_VALIDATOR: &str = "lightsaml_sp.validator.response";

/// Service dispatching forwarded requests, wired when `use_forward` is set.
pub const REQUEST_DISPATCHER: &str = "request_dispatcher";

// Positional arguments of the provider template.
const ARG_FIREWALL_ID: usize = 0;
const ARG_USER_PROVIDER: usize = 1;
const ARG_FORCE: usize = 2;
const ARG_RESPONSE_VALIDATOR: usize = 3;
const ARG_USERNAME_MAPPER: usize = 4;
const ARG_USER_CREATOR: usize = 5;
const ARG_ATTRIBUTE_MAPPER: usize = 6;
const ARG_TOKEN_FACTORY: usize = 7;

/// Factory wiring the SAML SP mechanism into firewalls.
#[derive(Debug, Default)]
pub struct SamlSpFactory;

impl SamlSpFactory {
    /// Create the factory.
    pub fn new() -> Self {
        Self
    }

    /// Register the provider for a firewall, typed variant.
    ///
    /// Always sets the firewall id and force flag; each collaborator
    /// reference is set only when explicitly configured, leaving the
    /// template's built-in collaborator in place otherwise. The returned
    /// id is deterministic per firewall.
    pub fn register_provider(
        &self,
        container: &mut ContainerBuilder,
        firewall_id: &str,
        config: &SamlSpConfig,
        user_provider_id: Option<&str>,
    ) -> String {
        let provider_id = format!("{}.{}", PROVIDER_TEMPLATE, firewall_id);

        let provider = container.set_definition(&provider_id, Definition::child_of(PROVIDER_TEMPLATE));
        provider
            .replace_argument(ARG_FIREWALL_ID, Argument::literal(firewall_id))
            .replace_argument(ARG_FORCE, Argument::literal(config.force));

        if let Some(user_provider) = user_provider_id {
            provider.replace_argument(ARG_USER_PROVIDER, Argument::reference(user_provider));
        }
        if let Some(ref mapper) = config.username_mapper {
            provider.replace_argument(ARG_USERNAME_MAPPER, Argument::reference(mapper));
        }
        if let Some(ref creator) = config.user_creator {
            provider.replace_argument(ARG_USER_CREATOR, Argument::reference(creator));
        }
        if let Some(ref mapper) = config.attribute_mapper {
            provider.replace_argument(ARG_ATTRIBUTE_MAPPER, Argument::reference(mapper));
        }
        if let Some(ref factory) = config.token_factory {
            provider.replace_argument(ARG_TOKEN_FACTORY, Argument::reference(factory));
        }

        debug!(firewall = %firewall_id, provider_id = %provider_id, "Registered SAML SP provider");
        provider_id
    }

    /// Register the authenticator for a firewall, typed variant.
    pub fn register_authenticator(
        &self,
        container: &mut ContainerBuilder,
        firewall_name: &str,
        config: &SamlSpConfig,
        user_provider_id: &str,
    ) -> Result<String> {
        if config.csrf_token_generator.is_some() {
            bail!(
                "The \"csrf_token_generator\" option on \"{}\" does not exist, use \"enable_csrf\" instead",
                FACTORY_KEY
            );
        }

        let options = config.authenticator_options();
        let success_handler = handlers::create_success_handler(
            container,
            firewall_name,
            FACTORY_KEY,
            config.success_handler.as_deref(),
            config.success_handler_options(),
        );
        let failure_handler = handlers::create_failure_handler(
            container,
            firewall_name,
            FACTORY_KEY,
            config.failure_handler.as_deref(),
            config.failure_handler_options(),
        );

        let authenticator_id = format!("{}.{}", AUTHENTICATOR_TEMPLATE, firewall_name);
        let use_forward = config.use_forward;

        let authenticator =
            container.set_definition(&authenticator_id, Definition::child_of(AUTHENTICATOR_TEMPLATE));
        authenticator
            .replace_argument(1, Argument::reference(user_provider_id))
            .replace_argument(2, Argument::reference(success_handler))
            .replace_argument(3, Argument::reference(failure_handler))
            .replace_argument(4, Argument::Literal(options));

        if use_forward {
            authenticator.add_method_call(
                "set_request_dispatcher",
                vec![Argument::reference(REQUEST_DISPATCHER)],
            );
        }

        debug!(
            firewall = %firewall_name,
            authenticator_id = %authenticator_id,
            "Registered SAML SP authenticator"
        );
        Ok(authenticator_id)
    }
}

impl SecurityFactory for SamlSpFactory {
    fn key(&self) -> &'static str {
        FACTORY_KEY
    }

    fn position(&self) -> Position {
        Position::Form
    }

    fn priority(&self) -> i32 {
        0
    }

    fn listener_id(&self) -> &'static str {
        LISTENER_TEMPLATE
    }

    fn register_templates(&self, container: &mut ContainerBuilder) {
        let mut provider_template = Definition::template();
        provider_template
            .replace_argument(ARG_RESPONSE_VALIDATOR, Argument::reference(RESPONSE_VALIDATOR))
            .replace_argument(ARG_USERNAME_MAPPER, Argument::reference(DEFAULT_USERNAME_MAPPER))
            .replace_argument(ARG_ATTRIBUTE_MAPPER, Argument::reference(DEFAULT_ATTRIBUTE_MAPPER))
            .replace_argument(ARG_TOKEN_FACTORY, Argument::reference(DEFAULT_TOKEN_FACTORY));
        container.set_definition(PROVIDER_TEMPLATE, provider_template);

        container.set_definition(LISTENER_TEMPLATE, Definition::template());
        container.set_definition(AUTHENTICATOR_TEMPLATE, Definition::template());

        // Collaborators are referenced by id only; their construction is
        // owned elsewhere.
        container.set_definition(DEFAULT_USERNAME_MAPPER, Definition::service());
        container.set_definition(DEFAULT_ATTRIBUTE_MAPPER, Definition::service());
        container.set_definition(DEFAULT_TOKEN_FACTORY, Definition::service());
        container.set_definition(RESPONSE_VALIDATOR, Definition::service());
        container.set_definition(REQUEST_DISPATCHER, Definition::service());
    }

    fn create_auth_provider(
        &self,
        container: &mut ContainerBuilder,
        firewall_id: &str,
        config: &serde_json::Value,
        user_provider_id: Option<&str>,
    ) -> Result<String> {
        let config = parse_config(config, firewall_id)?;
        Ok(self.register_provider(container, firewall_id, &config, user_provider_id))
    }

    fn create_listener(&self, container: &mut ContainerBuilder, firewall_id: &str) -> Result<String> {
        let listener_id = format!("{}.{}", LISTENER_TEMPLATE, firewall_id);
        container
            .set_definition(&listener_id, Definition::child_of(LISTENER_TEMPLATE))
            .replace_argument(2, Argument::literal(firewall_id));

        debug!(firewall = %firewall_id, listener_id = %listener_id, "Registered SAML SP listener");
        Ok(listener_id)
    }

    fn create_authenticator(
        &self,
        container: &mut ContainerBuilder,
        firewall_name: &str,
        config: &serde_json::Value,
        user_provider_id: &str,
    ) -> Result<String> {
        let config = parse_config(config, firewall_name)?;
        self.register_authenticator(container, firewall_name, &config, user_provider_id)
    }
}

fn parse_config(config: &serde_json::Value, firewall_id: &str) -> Result<SamlSpConfig> {
    let config: SamlSpConfig = serde_json::from_value(config.clone())
        .with_context(|| format!("Invalid \"{}\" section on firewall \"{}\"", FACTORY_KEY, firewall_id))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid \"{}\" section on firewall \"{}\": {}", FACTORY_KEY, firewall_id, e))?;
    Ok(config)
}
