//! Authentication mechanism factory contract.
//!
//! Each mechanism (SAML SP today) implements `SecurityFactory`. The
//! firewall builder dispatches the matching section of a firewall's
//! configuration to the factory, which registers the services that
//! mechanism needs for that firewall.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::container::ContainerBuilder;

/// Where in the per-firewall pipeline a mechanism's listener participates.
///
/// Listeners run in this order; mechanisms at the same position are
/// ordered by factory priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Pre-authentication (e.g. client certificates, external identity).
    PreAuth,
    /// Interactive form-style login.
    Form,
    /// HTTP-level challenge (basic, digest).
    Http,
    /// Remember-me cookie resolution.
    RememberMe,
}

impl Position {
    /// All positions in pipeline order.
    pub const ALL: [Position; 4] = [
        Position::PreAuth,
        Position::Form,
        Position::Http,
        Position::RememberMe,
    ];

    /// Configuration-facing name of this position.
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::PreAuth => "pre_auth",
            Position::Form => "form",
            Position::Http => "http",
            Position::RememberMe => "remember_me",
        }
    }

    /// Parse from the configuration-facing name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre_auth" => Some(Position::PreAuth),
            "form" => Some(Position::Form),
            "http" => Some(Position::Http),
            "remember_me" => Some(Position::RememberMe),
            _ => None,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Factory for one authentication mechanism.
///
/// The raw JSON section of the firewall configuration keyed by `key()`
/// is handed to the registration operations; each factory owns its own
/// schema and defaulting.
pub trait SecurityFactory {
    /// Configuration key under which firewalls select this mechanism.
    fn key(&self) -> &'static str;

    /// Pipeline position of this mechanism's listener.
    fn position(&self) -> Position;

    /// Ordering hint among mechanisms at the same position (higher first).
    fn priority(&self) -> i32;

    /// Id of the abstract listener template per-firewall listeners
    /// inherit from.
    fn listener_id(&self) -> &'static str;

    /// Seed the abstract templates and collaborator placeholders this
    /// mechanism's registrations inherit from or reference.
    fn register_templates(&self, container: &mut ContainerBuilder);

    /// Register the authentication provider for a firewall and return its
    /// service id.
    fn create_auth_provider(
        &self,
        container: &mut ContainerBuilder,
        firewall_id: &str,
        config: &serde_json::Value,
        user_provider_id: Option<&str>,
    ) -> Result<String>;

    /// Register the per-firewall listener as a child of the listener
    /// template and return its service id.
    fn create_listener(
        &self,
        container: &mut ContainerBuilder,
        firewall_id: &str,
    ) -> Result<String>;

    /// Register the authenticator for a firewall (newer pipeline) and
    /// return its service id.
    fn create_authenticator(
        &self,
        container: &mut ContainerBuilder,
        firewall_name: &str,
        config: &serde_json::Value,
        user_provider_id: &str,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_names_roundtrip() {
        for position in Position::ALL {
            assert_eq!(Position::parse(position.as_str()), Some(position));
        }
        assert_eq!(Position::parse("unknown"), None);
    }

    #[test]
    fn test_position_pipeline_order() {
        assert!(Position::PreAuth < Position::Form);
        assert!(Position::Form < Position::Http);
        assert!(Position::Http < Position::RememberMe);
    }
}
