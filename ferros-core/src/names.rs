//! ROS2 name validation and expansion.
//!
//! Implements the naming rules from the ROS2 topic and service names design
//! (<https://design.ros2.org/articles/topic_and_service_names.html>):
//!
//! - Topic/service names: alphanumerics, `_` and `/`; may start with `~`;
//!   must not start with a digit, end with `/`, or contain `//` or `__`.
//! - Node names: alphanumerics and `_` only.
//! - Namespaces: absolute (`/`-prefixed) topic-like names; `/` alone is the
//!   root namespace.

use crate::error::{Error, Result};
use std::fmt;

/// The kind of name being validated, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A topic or service name.
    Topic,
    /// A node base name.
    Node,
    /// A namespace.
    Namespace,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "topic"),
            Self::Node => write!(f, "node"),
            Self::Namespace => write!(f, "namespace"),
        }
    }
}

fn invalid(kind: NameKind, name: &str, reason: &str) -> Error {
    Error::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Validate a ROS2 topic or service name.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when the name violates the naming rules.
pub fn validate_topic_name(name: &str) -> Result<()> {
    let kind = NameKind::Topic;

    if name.is_empty() {
        return Err(invalid(kind, name, "must not be empty"));
    }

    // `~` alone or `~/rest`
    let rest = if let Some(stripped) = name.strip_prefix('~') {
        if !stripped.is_empty() && !stripped.starts_with('/') {
            return Err(invalid(kind, name, "tilde must be followed by a slash"));
        }
        stripped
    } else {
        name
    };

    if rest.ends_with('/') {
        return Err(invalid(kind, name, "must not end with a slash"));
    }
    if rest.contains("//") {
        return Err(invalid(kind, name, "must not contain repeated slashes"));
    }
    if rest.contains("__") {
        return Err(invalid(kind, name, "must not contain repeated underscores"));
    }

    for token in rest.split('/') {
        if token.is_empty() {
            continue;
        }
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid(kind, name, "tokens must not start with a digit"));
        }
        if let Some(c) = token.chars().find(|c| !is_name_char(*c)) {
            return Err(invalid(kind, name, &format!("invalid character '{c}'")));
        }
    }

    Ok(())
}

/// Validate a ROS2 node base name.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when the name violates the naming rules.
pub fn validate_node_name(name: &str) -> Result<()> {
    let kind = NameKind::Node;

    if name.is_empty() {
        return Err(invalid(kind, name, "must not be empty"));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid(kind, name, "must not start with a digit"));
    }
    if name.contains("__") {
        return Err(invalid(kind, name, "must not contain repeated underscores"));
    }
    if let Some(c) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(invalid(kind, name, &format!("invalid character '{c}'")));
    }

    Ok(())
}

/// Validate a ROS2 namespace.
///
/// The root namespace `/` is valid; every other namespace is an absolute
/// topic-like name.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when the namespace violates the rules.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let kind = NameKind::Namespace;

    if namespace.is_empty() {
        return Err(invalid(kind, namespace, "must not be empty"));
    }
    if !namespace.starts_with('/') {
        return Err(invalid(kind, namespace, "must start with a slash"));
    }
    if namespace == "/" {
        return Ok(());
    }
    if namespace.contains('~') {
        return Err(invalid(kind, namespace, "must not contain a tilde"));
    }

    validate_topic_name(namespace).map_err(|_| invalid(kind, namespace, "invalid namespace path"))
}

/// Build the fully qualified node name from a namespace and a node name.
pub fn build_node_fqn(namespace: &str, node_name: &str) -> String {
    if namespace == "/" || namespace.is_empty() {
        format!("/{node_name}")
    } else {
        format!("{namespace}/{node_name}")
    }
}

/// Expand a topic name to its fully qualified form.
///
/// - Absolute names (`/...`) are returned as-is.
/// - Private names (`~` or `~/...`) are prefixed with the node FQN.
/// - Relative names are prefixed with the namespace.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] when `name` fails validation.
pub fn expand_topic_name(namespace: &str, node_name: &str, name: &str) -> Result<String> {
    validate_topic_name(name)?;

    if let Some(rest) = name.strip_prefix('~') {
        let fqn = build_node_fqn(namespace, node_name);
        return Ok(format!("{fqn}{rest}"));
    }

    if name.starts_with('/') {
        return Ok(name.to_string());
    }

    if namespace == "/" || namespace.is_empty() {
        Ok(format!("/{name}"))
    } else {
        Ok(format!("{namespace}/{name}"))
    }
}
