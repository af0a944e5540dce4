//! Registry of authentication mechanism factories.

use anyhow::{bail, Result};

use super::factory::SecurityFactory;

/// Factories keyed by their configuration key.
///
/// Iteration follows pipeline order: position first, then priority
/// (higher first), then key.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: Vec<Box<dyn SecurityFactory>>,
}

impl FactoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory.
    ///
    /// A second factory with an already-registered key is a configuration
    /// error.
    pub fn register(&mut self, factory: Box<dyn SecurityFactory>) -> Result<()> {
        if self.get(factory.key()).is_some() {
            bail!(
                "An authentication factory is already registered for key \"{}\"",
                factory.key()
            );
        }
        self.factories.push(factory);
        self.factories.sort_by(|a, b| {
            a.position()
                .cmp(&b.position())
                .then(b.priority().cmp(&a.priority()))
                .then(a.key().cmp(b.key()))
        });
        Ok(())
    }

    /// Look up a factory by configuration key.
    pub fn get(&self, key: &str) -> Option<&dyn SecurityFactory> {
        self.factories
            .iter()
            .find(|f| f.key() == key)
            .map(|f| f.as_ref())
    }

    /// Registered keys in pipeline order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.key()).collect()
    }

    /// Factories in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn SecurityFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerBuilder;
    use crate::security::factory::Position;

    struct StubFactory {
        key: &'static str,
        position: Position,
        priority: i32,
    }

    impl SecurityFactory for StubFactory {
        fn key(&self) -> &'static str {
            self.key
        }

        fn position(&self) -> Position {
            self.position
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn listener_id(&self) -> &'static str {
            "security.authentication.listener.stub"
        }

        fn register_templates(&self, _container: &mut ContainerBuilder) {}

        fn create_auth_provider(
            &self,
            _container: &mut ContainerBuilder,
            firewall_id: &str,
            _config: &serde_json::Value,
            _user_provider_id: Option<&str>,
        ) -> Result<String> {
            Ok(format!("stub.provider.{}", firewall_id))
        }

        fn create_listener(
            &self,
            _container: &mut ContainerBuilder,
            firewall_id: &str,
        ) -> Result<String> {
            Ok(format!("stub.listener.{}", firewall_id))
        }

        fn create_authenticator(
            &self,
            _container: &mut ContainerBuilder,
            firewall_name: &str,
            _config: &serde_json::Value,
            _user_provider_id: &str,
        ) -> Result<String> {
            Ok(format!("stub.authenticator.{}", firewall_name))
        }
    }

    fn stub(key: &'static str, position: Position, priority: i32) -> Box<dyn SecurityFactory> {
        Box::new(StubFactory {
            key,
            position,
            priority,
        })
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = FactoryRegistry::new();
        assert!(registry.is_empty());

        registry.register(stub("stub_auth", Position::Form, 0)).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("stub_auth").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = FactoryRegistry::new();
        registry.register(stub("stub_auth", Position::Form, 0)).unwrap();

        let err = registry
            .register(stub("stub_auth", Position::Http, 5))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_pipeline_ordering() {
        let mut registry = FactoryRegistry::new();
        registry.register(stub("form_low", Position::Form, 0)).unwrap();
        registry.register(stub("http_auth", Position::Http, 0)).unwrap();
        registry.register(stub("cert_auth", Position::PreAuth, 0)).unwrap();
        registry.register(stub("form_high", Position::Form, 10)).unwrap();

        assert_eq!(
            registry.keys(),
            vec!["cert_auth", "form_high", "form_low", "http_auth"]
        );
    }
}
