// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allow-list check for container operations.

use crate::config::Container;

/// Check that `name` is a configured container and that `action` is in its
/// allow list.
///
/// Returns a human-readable reason on denial, `None` when permitted.
pub fn check_permission(containers: &[Container], name: &str, action: &str) -> Option<String> {
    let Some(container) = containers.iter().find(|c| c.name == name) else {
        return Some(format!("Container \"{}\" is not in the allowed list", name));
    };
    if container.allow.iter().any(|op| op == action) {
        return None;
    }
    let allowed = container.allow.join(", ");
    Some(format!(
        "Action \"{}\" is not allowed for container \"{}\" (allowed: {})",
        action, name, allowed
    ))
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod tests;
