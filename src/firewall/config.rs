//! Security configuration schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level security configuration: firewalls by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Named authentication boundaries.
    #[serde(default)]
    pub firewalls: BTreeMap<String, FirewallConfig>,
}

impl SecurityConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, firewall) in &self.firewalls {
            if name.is_empty() {
                return Err("Firewall names must not be empty".to_string());
            }
            if firewall.authenticators && firewall.provider.is_none() {
                return Err(format!(
                    "Firewall \"{}\" uses the authenticator pipeline and must name a user provider",
                    name
                ));
            }
        }
        Ok(())
    }
}

/// Configuration for one firewall.
///
/// Keys other than `provider` and `authenticators` are mechanism
/// sections, dispatched to the factory registered under that key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallConfig {
    /// Name of the user provider backing this firewall, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Select the newer authenticator pipeline for this firewall.
    #[serde(default)]
    pub authenticators: bool,

    /// Mechanism sections keyed by factory key.
    #[serde(flatten)]
    pub mechanisms: BTreeMap<String, serde_json::Value>,
}

impl FirewallConfig {
    /// Container id of the configured user provider, if one is named.
    pub fn user_provider_id(&self) -> Option<String> {
        self.provider
            .as_ref()
            .map(|name| format!("security.user.provider.concrete.{}", name))
    }
}
