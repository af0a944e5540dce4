//! SAML SP firewall configuration schema.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Configuration for the SAML SP mechanism of one firewall.
///
/// Collaborator keys distinguish explicit presence from absence: an
/// absent key leaves the corresponding argument of the provider template
/// untouched, so the template's built-in collaborator is used. Unknown
/// keys are ignored; omitting every key yields a valid provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamlSpConfig {
    /// Reject an existing authenticated session whose identity does not
    /// match the incoming assertion.
    #[serde(default = "default_true")]
    pub force: bool,

    /// Username mapper service id.
    #[serde(default)]
    pub username_mapper: Option<String>,

    /// User creator service id, for provisioning unknown users.
    #[serde(default)]
    pub user_creator: Option<String>,

    /// Attribute mapper service id.
    #[serde(default)]
    pub attribute_mapper: Option<String>,

    /// Token factory service id.
    #[serde(default)]
    pub token_factory: Option<String>,

    /// Path the assertion consumer listener intercepts.
    #[serde(default = "default_check_path")]
    pub check_path: String,

    /// Path unauthenticated users are sent to.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Forward to the login path internally instead of redirecting.
    #[serde(default)]
    pub use_forward: bool,

    /// Where to send the user after login when no target is stored.
    #[serde(default = "default_target_path")]
    pub default_target_path: String,

    /// Always redirect to `default_target_path` after login.
    #[serde(default)]
    pub always_use_default_target_path: bool,

    /// Where to send the user after a failed login.
    #[serde(default)]
    pub failure_path: Option<String>,

    /// Enable CSRF protection on the login flow.
    #[serde(default)]
    pub enable_csrf: bool,

    /// Custom success handler service id.
    #[serde(default)]
    pub success_handler: Option<String>,

    /// Custom failure handler service id.
    #[serde(default)]
    pub failure_handler: Option<String>,

    /// Removed legacy key; only ever read to reject it.
    #[serde(default)]
    pub csrf_token_generator: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_check_path() -> String {
    "/login_check".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_target_path() -> String {
    "/".to_string()
}

impl Default for SamlSpConfig {
    fn default() -> Self {
        Self {
            force: true,
            username_mapper: None,
            user_creator: None,
            attribute_mapper: None,
            token_factory: None,
            check_path: default_check_path(),
            login_path: default_login_path(),
            use_forward: false,
            default_target_path: default_target_path(),
            always_use_default_target_path: false,
            failure_path: None,
            enable_csrf: false,
            success_handler: None,
            failure_handler: None,
            csrf_token_generator: None,
        }
    }
}

impl SamlSpConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.check_path.starts_with('/') {
            return Err(format!("check_path must start with '/': {}", self.check_path));
        }
        if !self.login_path.starts_with('/') {
            return Err(format!("login_path must start with '/': {}", self.login_path));
        }
        if let Some(ref path) = self.failure_path {
            if !path.starts_with('/') {
                return Err(format!("failure_path must start with '/': {}", path));
            }
        }
        Ok(())
    }

    /// The subset of keys the authenticator recognizes as options.
    ///
    /// Collaborator references and handler ids are wired as arguments,
    /// not options, and are filtered out here.
    pub fn authenticator_options(&self) -> Value {
        let mut options = Map::new();
        options.insert("check_path".to_string(), json!(self.check_path));
        options.insert("login_path".to_string(), json!(self.login_path));
        options.insert("use_forward".to_string(), json!(self.use_forward));
        options.insert(
            "default_target_path".to_string(),
            json!(self.default_target_path),
        );
        options.insert(
            "always_use_default_target_path".to_string(),
            json!(self.always_use_default_target_path),
        );
        if let Some(ref path) = self.failure_path {
            options.insert("failure_path".to_string(), json!(path));
        }
        options.insert("enable_csrf".to_string(), json!(self.enable_csrf));
        Value::Object(options)
    }

    /// Target-path options handed to the success handler.
    pub fn success_handler_options(&self) -> Value {
        json!({
            "always_use_default_target_path": self.always_use_default_target_path,
            "default_target_path": self.default_target_path,
            "login_path": self.login_path,
        })
    }

    /// Options handed to the failure handler.
    pub fn failure_handler_options(&self) -> Value {
        let mut options = Map::new();
        options.insert("login_path".to_string(), json!(self.login_path));
        if let Some(ref path) = self.failure_path {
            options.insert("failure_path".to_string(), json!(path));
        }
        Value::Object(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SamlSpConfig::default();
        assert!(config.force);
        assert!(config.username_mapper.is_none());
        assert!(config.user_creator.is_none());
        assert!(config.attribute_mapper.is_none());
        assert!(config.token_factory.is_none());
        assert_eq!(config.check_path, "/login_check");
        assert_eq!(config.login_path, "/login");
        assert!(!config.use_forward);
        assert!(!config.enable_csrf);
    }

    #[test]
    fn test_empty_section_is_valid() {
        let config: SamlSpConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(config.force);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config: SamlSpConfig = serde_json::from_value(serde_json::json!({
            "force": false,
            "some_future_key": "value",
        }))
        .unwrap();
        assert!(!config.force);
    }

    #[test]
    fn test_validation() {
        let mut config = SamlSpConfig::default();
        assert!(config.validate().is_ok());

        config.check_path = "login_check".to_string();
        assert!(config.validate().is_err());

        config.check_path = "/login_check".to_string();
        config.failure_path = Some("oops".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_authenticator_options_filtering() {
        let mut config = SamlSpConfig::default();
        config.username_mapper = Some("app.username_mapper".to_string());
        config.success_handler = Some("app.success_handler".to_string());
        config.csrf_token_generator = Some("legacy.csrf".to_string());

        let options = config.authenticator_options();
        let options = options.as_object().unwrap();
        assert!(options.contains_key("check_path"));
        assert!(options.contains_key("use_forward"));
        assert!(!options.contains_key("username_mapper"));
        assert!(!options.contains_key("success_handler"));
        assert!(!options.contains_key("csrf_token_generator"));
        // failure_path only appears once configured
        assert!(!options.contains_key("failure_path"));
    }

    #[test]
    fn test_failure_path_included_when_set() {
        let mut config = SamlSpConfig::default();
        config.failure_path = Some("/login_failed".to_string());

        let options = config.authenticator_options();
        assert_eq!(options["failure_path"], "/login_failed");
        let failure_options = config.failure_handler_options();
        assert_eq!(failure_options["failure_path"], "/login_failed");
    }
}
