//! Content-related types for the Gemini API.
//!
//! This module contains types for representing content, messages, and their parts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One part of a content message.
///
/// Only text parts are modelled explicitly; any other field the API sends
/// (function calls, inline data, ...) is kept in `other` so callers can tell
/// a non-text part apart from an empty one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Part {
    /// The text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Remaining fields of the part.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            other: Map::new(),
        }
    }

    /// Name of the first non-text field, if this part carries one.
    pub fn shape(&self) -> Option<&str> {
        self.other.keys().next().map(String::as_str)
    }
}

/// A content message with a role and parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the content author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part text content with the given role.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }
}

/// The role of a message author.
///
/// Roles outside `user` and `model` are preserved verbatim in `Other` so the
/// generation builder can reject them with the offending value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// User role.
    User,
    /// Model role.
    Model,
    /// Any role this client does not recognise.
    Other(String),
}

impl Role {
    /// The wire name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "model" => Role::Model,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
