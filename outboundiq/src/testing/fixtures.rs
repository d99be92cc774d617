//! Test fixtures for request context tests.

use crate::context::RequestContext;
use crate::identity::{JsonPrincipal, Principal, UserContext};
use uuid::Uuid;

/// A principal with explicitly set fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPrincipal {
    /// Value returned for `id`.
    pub id: Option<String>,
    /// Value returned for `sub`.
    pub subject: Option<String>,
    /// Value returned for `type`.
    pub principal_type: Option<String>,
    /// Value returned for `role`.
    pub role: Option<String>,
}

impl StaticPrincipal {
    /// Creates a principal with just an ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the explicit type.
    #[must_use]
    pub fn with_type(mut self, principal_type: impl Into<String>) -> Self {
        self.principal_type = Some(principal_type.into());
        self
    }

    /// Sets the token subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl Principal for StaticPrincipal {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn subject(&self) -> Option<String> {
        self.subject.clone()
    }

    fn principal_type(&self) -> Option<String> {
        self.principal_type.clone()
    }

    fn role(&self) -> Option<String> {
        self.role.clone()
    }

    fn type_name(&self) -> Option<&'static str> {
        None
    }
}

/// Builder for request handles in tests.
#[derive(Debug, Default)]
pub struct TestRequest {
    /// HTTP method, `GET` when unset.
    pub method: Option<String>,
    /// Path, `/` when unset.
    pub path: Option<String>,
    /// Fixed request ID.
    pub request_id: Option<Uuid>,
    /// Principal fields, attached as a [`JsonPrincipal`].
    pub principal: Option<serde_json::Value>,
    /// Manually attached user context.
    pub user_context: Option<UserContext>,
}

impl TestRequest {
    /// Creates a new test request builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a GET request to `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new().with_method("GET").with_path(path)
    }

    /// Creates a POST request to `path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new().with_method("POST").with_path(path)
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Attaches a JSON principal.
    #[must_use]
    pub fn with_principal(mut self, principal: serde_json::Value) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Attaches a manual user context.
    #[must_use]
    pub fn with_user_context(mut self, context: UserContext) -> Self {
        self.user_context = Some(context);
        self
    }

    /// Builds the request handle.
    #[must_use]
    pub fn build(self) -> RequestContext {
        let request = RequestContext::with_request_id(
            self.request_id.unwrap_or_else(Uuid::new_v4),
            self.method.unwrap_or_else(|| "GET".to_string()),
            self.path.unwrap_or_else(|| "/".to_string()),
        );

        if let Some(principal) = self.principal.and_then(JsonPrincipal::from_value) {
            request.set_principal(principal);
        }
        if let Some(context) = self.user_context {
            request.set_user_context(context);
        }

        request
    }
}
