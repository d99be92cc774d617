//! The normalized identity record attached to tracked calls.

use crate::config::{DEFAULT_SUBJECT_TYPE, ORIGIN_AUTHENTICATED};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies who triggered an outbound call.
///
/// Serialized with the field names the OutboundIQ backend expects
/// (`userId`, `userType`, `context`). Fields are fixed once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserContext {
    /// The subject's identifier, if one could be determined.
    #[serde(rename = "userId")]
    subject_id: Option<String>,

    /// The kind of subject (e.g. `"User"`, `"admin"`, `"Customer"`).
    #[serde(rename = "userType")]
    subject_type: String,

    /// Where the identity came from (e.g. `"authenticated"`, `"webhook"`).
    #[serde(rename = "context")]
    origin_kind: String,
}

impl UserContext {
    /// Creates a user context from its three parts.
    #[must_use]
    pub fn new(
        subject_id: Option<String>,
        subject_type: impl Into<String>,
        origin_kind: impl Into<String>,
    ) -> Self {
        Self {
            subject_id,
            subject_type: subject_type.into(),
            origin_kind: origin_kind.into(),
        }
    }

    /// Creates an authenticated user context.
    #[must_use]
    pub fn authenticated(subject_id: impl Into<String>, subject_type: impl Into<String>) -> Self {
        Self::new(Some(subject_id.into()), subject_type, ORIGIN_AUTHENTICATED)
    }

    /// Creates an anonymous context with the default subject type.
    #[must_use]
    pub fn anonymous(origin_kind: impl Into<String>) -> Self {
        Self::new(None, DEFAULT_SUBJECT_TYPE, origin_kind)
    }

    /// Returns the subject ID as a string slice, or None.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    /// Returns the kind of subject.
    #[must_use]
    pub fn subject_type(&self) -> &str {
        &self.subject_type
    }

    /// Returns where the identity came from.
    #[must_use]
    pub fn origin_kind(&self) -> &str {
        &self.origin_kind
    }

    /// Returns true if the identity came from an authenticated principal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.origin_kind == ORIGIN_AUTHENTICATED
    }

    /// Converts to a dictionary using the wire field names.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "userId".to_string(),
            self.subject_id
                .as_ref()
                .map_or(serde_json::Value::Null, |id| serde_json::json!(id)),
        );
        map.insert("userType".to_string(), serde_json::json!(self.subject_type));
        map.insert("context".to_string(), serde_json::json!(self.origin_kind));
        map
    }
}
