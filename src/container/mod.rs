//! Bootstrap service container.
//!
//! A minimal string-keyed registry: definitions inherit from named
//! templates, carry positional constructor arguments (literals or
//! references), and collect method-call wiring steps.

pub mod builder;
pub mod definition;

pub use builder::ContainerBuilder;
pub use definition::{Argument, Definition, MethodCall};
