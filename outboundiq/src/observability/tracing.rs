//! Span attributes and spans for tracked requests.

use crate::context::RequestContext;
use crate::identity::UserContext;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attributes describing a request and the user it is attributed to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSpanAttributes {
    /// Request ID.
    pub request_id: Option<String>,
    /// HTTP method.
    pub method: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// User ID.
    pub user_id: Option<String>,
    /// User type.
    pub user_type: Option<String>,
    /// Origin of the user context.
    pub user_context: Option<String>,
}

impl RequestSpanAttributes {
    /// Creates empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds attributes from a request.
    #[must_use]
    pub fn from_request(request: &RequestContext) -> Self {
        Self {
            request_id: Some(request.request_id().to_string()),
            method: Some(request.method().to_string()),
            path: Some(request.path().to_string()),
            ..Self::default()
        }
    }

    /// Adds the attributed user.
    #[must_use]
    pub fn with_user(mut self, user: &UserContext) -> Self {
        self.user_id = user.subject_id().map(str::to_string);
        self.user_type = Some(user.subject_type().to_string());
        self.user_context = Some(user.origin_kind().to_string());
        self
    }

    /// Records the user fields that are set onto a span from [`request_span`].
    pub fn record_user(&self, span: &tracing::Span) {
        if let Some(ref v) = self.user_id {
            span.record("enduser.id", v.as_str());
        }
        if let Some(ref v) = self.user_type {
            span.record("enduser.type", v.as_str());
        }
        if let Some(ref v) = self.user_context {
            span.record("enduser.context", v.as_str());
        }
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        if let Some(ref v) = self.request_id {
            attrs.insert("http.request_id".to_string(), v.clone());
        }
        if let Some(ref v) = self.method {
            attrs.insert("http.request.method".to_string(), v.clone());
        }
        if let Some(ref v) = self.path {
            attrs.insert("url.path".to_string(), v.clone());
        }
        if let Some(ref v) = self.user_id {
            attrs.insert("enduser.id".to_string(), v.clone());
        }
        if let Some(ref v) = self.user_type {
            attrs.insert("enduser.type".to_string(), v.clone());
        }
        if let Some(ref v) = self.user_context {
            attrs.insert("enduser.context".to_string(), v.clone());
        }

        attrs
    }
}

/// Creates the span that request processing runs under.
///
/// User fields left unset here can be filled in later with
/// [`RequestSpanAttributes::record_user`].
#[must_use]
pub fn request_span(attributes: &RequestSpanAttributes) -> tracing::Span {
    let span = tracing::info_span!(
        "request",
        "http.request_id" = attributes.request_id.as_deref(),
        "http.request.method" = attributes.method.as_deref(),
        "url.path" = attributes.path.as_deref(),
        "enduser.id" = tracing::field::Empty,
        "enduser.type" = tracing::field::Empty,
        "enduser.context" = tracing::field::Empty,
    );
    attributes.record_user(&span);
    span
}
