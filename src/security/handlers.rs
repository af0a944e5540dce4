//! Success and failure handler registration.
//!
//! Every mechanism that completes an interactive login wires a success
//! and a failure handler. A firewall may name a custom handler service,
//! in which case the registration decorates it; otherwise the default
//! handler template is used with the mechanism's target-path options.

use serde_json::Value;

use crate::container::{Argument, ContainerBuilder, Definition};

/// Default success handler template.
pub const SUCCESS_HANDLER_TEMPLATE: &str = "security.authentication.success_handler";

/// Default failure handler template.
pub const FAILURE_HANDLER_TEMPLATE: &str = "security.authentication.failure_handler";

/// Wrapper template decorating a firewall-supplied success handler.
pub const CUSTOM_SUCCESS_HANDLER_TEMPLATE: &str = "security.authentication.custom_success_handler";

/// Wrapper template decorating a firewall-supplied failure handler.
pub const CUSTOM_FAILURE_HANDLER_TEMPLATE: &str = "security.authentication.custom_failure_handler";

/// Seed the handler templates into the container.
pub fn register_handler_templates(container: &mut ContainerBuilder) {
    container.set_definition(SUCCESS_HANDLER_TEMPLATE, Definition::template());
    container.set_definition(FAILURE_HANDLER_TEMPLATE, Definition::template());
    container.set_definition(CUSTOM_SUCCESS_HANDLER_TEMPLATE, Definition::template());
    container.set_definition(CUSTOM_FAILURE_HANDLER_TEMPLATE, Definition::template());
}

/// Register the success handler for a firewall and return its service id.
///
/// `custom_handler` is the service id the firewall configured, if any.
/// `options` carries the mechanism's success options (target paths).
pub fn create_success_handler(
    container: &mut ContainerBuilder,
    firewall_id: &str,
    key: &str,
    custom_handler: Option<&str>,
    options: Value,
) -> String {
    let handler_id = format!("{}.{}.{}", SUCCESS_HANDLER_TEMPLATE, firewall_id, key);

    match custom_handler {
        Some(custom) => {
            container
                .set_definition(&handler_id, Definition::child_of(CUSTOM_SUCCESS_HANDLER_TEMPLATE))
                .replace_argument(0, Argument::reference(custom))
                .replace_argument(1, Argument::Literal(options))
                .replace_argument(2, Argument::literal(firewall_id));
        }
        None => {
            container
                .set_definition(&handler_id, Definition::child_of(SUCCESS_HANDLER_TEMPLATE))
                .add_method_call("set_options", vec![Argument::Literal(options)])
                .add_method_call("set_firewall_name", vec![Argument::literal(firewall_id)]);
        }
    }

    handler_id
}

/// Register the failure handler for a firewall and return its service id.
pub fn create_failure_handler(
    container: &mut ContainerBuilder,
    firewall_id: &str,
    key: &str,
    custom_handler: Option<&str>,
    options: Value,
) -> String {
    let handler_id = format!("{}.{}.{}", FAILURE_HANDLER_TEMPLATE, firewall_id, key);

    match custom_handler {
        Some(custom) => {
            container
                .set_definition(&handler_id, Definition::child_of(CUSTOM_FAILURE_HANDLER_TEMPLATE))
                .replace_argument(0, Argument::reference(custom))
                .replace_argument(1, Argument::Literal(options));
        }
        None => {
            container
                .set_definition(&handler_id, Definition::child_of(FAILURE_HANDLER_TEMPLATE))
                .add_method_call("set_options", vec![Argument::Literal(options)]);
        }
    }

    handler_id
}
