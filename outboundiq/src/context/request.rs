//! The per-request handle bound into a scope.

use crate::identity::{Principal, UserContext};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A cheap-clone handle to one inbound request.
///
/// Clones share the same underlying request, so a principal set by an auth
/// layer or a user context set by application code is visible through every
/// clone, including the one bound in the current scope. Equality is handle
/// identity: two separately constructed requests are never equal.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<RequestInner>,
}

struct RequestInner {
    request_id: Uuid,
    method: String,
    path: String,
    received_at: DateTime<Utc>,
    /// Set by the auth layer.
    principal: RwLock<Option<Arc<dyn Principal>>>,
    /// Reserved slot for a manually attached user context.
    user_context: RwLock<Option<UserContext>>,
}

impl RequestContext {
    /// Creates a request handle with a generated request ID.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_request_id(Uuid::new_v4(), method, path)
    }

    /// Creates a request handle with a specific request ID.
    #[must_use]
    pub fn with_request_id(
        request_id: Uuid,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(RequestInner {
                request_id,
                method: method.into(),
                path: path.into(),
                received_at: Utc::now(),
                principal: RwLock::new(None),
                user_context: RwLock::new(None),
            }),
        }
    }

    /// Attaches a principal, builder style.
    #[must_use]
    pub fn with_principal(self, principal: impl Principal + 'static) -> Self {
        self.set_principal(principal);
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Returns when the request handle was created.
    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        self.inner.received_at
    }

    /// Sets the authenticated principal.
    pub fn set_principal(&self, principal: impl Principal + 'static) {
        self.set_shared_principal(Arc::new(principal));
    }

    /// Sets a principal that is shared with other owners.
    pub fn set_shared_principal(&self, principal: Arc<dyn Principal>) {
        *self.inner.principal.write() = Some(principal);
    }

    /// Returns the authenticated principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<Arc<dyn Principal>> {
        self.inner.principal.read().clone()
    }

    /// Returns true if a principal is attached.
    #[must_use]
    pub fn has_principal(&self) -> bool {
        self.inner.principal.read().is_some()
    }

    /// Attaches an explicit user context, overriding principal-based extraction.
    pub fn set_user_context(&self, context: UserContext) {
        *self.inner.user_context.write() = Some(context);
    }

    /// Removes a manually attached user context.
    pub fn clear_user_context(&self) -> Option<UserContext> {
        self.inner.user_context.write().take()
    }

    /// Returns the manually attached user context, if any.
    #[must_use]
    pub fn user_context_override(&self) -> Option<UserContext> {
        self.inner.user_context.read().clone()
    }

    /// Returns true if both handles refer to the same request.
    #[must_use]
    pub fn same_request(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for RequestContext {
    fn eq(&self, other: &Self) -> bool {
        self.same_request(other)
    }
}

impl Eq for RequestContext {}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.inner.request_id)
            .field("method", &self.inner.method)
            .field("path", &self.inner.path)
            .field("has_principal", &self.has_principal())
            .field("user_context", &*self.inner.user_context.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::JsonPrincipal;

    #[test]
    fn test_request_metadata() {
        let id = Uuid::new_v4();
        let request = RequestContext::with_request_id(id, "POST", "/charges");
        assert_eq!(request.request_id(), id);
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/charges");
        assert!(!request.has_principal());
        assert!(request.user_context_override().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let request = RequestContext::new("GET", "/");
        let clone = request.clone();

        clone.set_principal(JsonPrincipal::new().with_field("id", "1"));
        clone.set_user_context(UserContext::anonymous("webhook"));

        assert!(request.has_principal());
        assert_eq!(
            request.user_context_override(),
            Some(UserContext::anonymous("webhook"))
        );
        assert_eq!(request, clone);
    }

    #[test]
    fn test_distinct_requests_are_not_equal() {
        let id = Uuid::new_v4();
        let a = RequestContext::with_request_id(id, "GET", "/");
        let b = RequestContext::with_request_id(id, "GET", "/");
        assert_ne!(a, b);
        assert!(!a.same_request(&b));
    }

    #[test]
    fn test_clear_user_context() {
        let request = RequestContext::new("GET", "/");
        request.set_user_context(UserContext::authenticated("1", "User"));

        assert!(request.clear_user_context().is_some());
        assert!(request.user_context_override().is_none());
        assert!(request.clear_user_context().is_none());
    }

    #[test]
    fn test_debug_does_not_require_principal_debug() {
        let request = RequestContext::new("GET", "/debug")
            .with_principal(JsonPrincipal::new().with_field("id", "1"));
        let rendered = format!("{request:?}");
        assert!(rendered.contains("has_principal: true"));
        assert!(rendered.contains("/debug"));
    }
}
