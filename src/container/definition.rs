//! Service definition model.
//!
//! A definition describes how the container will construct one service:
//! an optional parent template it inherits from, positional constructor
//! arguments, and post-construction method calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A constructor or method argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    /// An inline value, stored as JSON.
    Literal(serde_json::Value),
    /// A reference to another registered service by id.
    Reference(String),
    /// An ordered collection of references to other services.
    ReferenceList(Vec<String>),
}

impl Argument {
    /// Build a literal argument from any JSON-convertible value.
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Argument::Literal(value.into())
    }

    /// Build a reference argument to the given service id.
    pub fn reference(id: impl Into<String>) -> Self {
        Argument::Reference(id.into())
    }

    /// Get the referenced service id, if this is a reference.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Argument::Reference(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Get the inline value, if this is a literal.
    pub fn as_literal(&self) -> Option<&serde_json::Value> {
        match self {
            Argument::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// A post-construction wiring step: a named method call with arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name on the constructed service.
    pub method: String,
    /// Arguments passed to the call.
    pub arguments: Vec<Argument>,
}

/// A service definition in the container.
///
/// Positional arguments are sparse: an index left unset on a child
/// definition falls through to the parent template when the definition
/// is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Template this definition inherits from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Abstract definitions are templates only and are never instantiated.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Positional constructor arguments, keyed by index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<usize, Argument>,

    /// Post-construction method calls, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_calls: Vec<MethodCall>,
}

impl Definition {
    /// Create an abstract template definition.
    pub fn template() -> Self {
        Self {
            is_abstract: true,
            ..Default::default()
        }
    }

    /// Create a concrete definition with no parent.
    pub fn service() -> Self {
        Self::default()
    }

    /// Create a definition inheriting from the given template.
    pub fn child_of(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Default::default()
        }
    }

    /// Set the positional argument at `index`, replacing any previous value.
    pub fn replace_argument(&mut self, index: usize, argument: Argument) -> &mut Self {
        self.arguments.insert(index, argument);
        self
    }

    /// Get the positional argument at `index`, if set on this definition.
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(&index)
    }

    /// Append a method-call wiring step.
    pub fn add_method_call(
        &mut self,
        method: impl Into<String>,
        arguments: Vec<Argument>,
    ) -> &mut Self {
        self.method_calls.push(MethodCall {
            method: method.into(),
            arguments,
        });
        self
    }

    /// Find a method call by name.
    pub fn method_call(&self, method: &str) -> Option<&MethodCall> {
        self.method_calls.iter().find(|c| c.method == method)
    }
}
