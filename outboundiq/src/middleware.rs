//! Per-request middleware that makes the current user available to
//! outbound call tracking.
//!
//! Place [`UserContextMiddleware`] after the auth layer so the principal is
//! already attached when the request enters its scope:
//!
//! ```rust,ignore
//! use outboundiq::prelude::*;
//!
//! let middleware = UserContextMiddleware::new();
//!
//! // In the host framework's request handler:
//! let response = middleware
//!     .handle(request, |req| async move { handler(req).await })
//!     .await;
//! ```

use crate::config::ContextConfig;
use crate::context::{current_request, enter_scope, enter_scope_sync, RequestContext};
use crate::errors::OutboundIqError;
use crate::identity::{IdentityExtractor, UserContext};
use crate::observability::{init_logging, request_span, RequestSpanAttributes};
use crate::resolver::{global_registry, Registration, ResolverRegistry};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// Installs logging and returns middleware bound to the process-wide
/// registry.
///
/// Applications that already install their own tracing subscriber should
/// construct [`UserContextMiddleware::with_config`] directly instead.
pub fn init(config: ContextConfig) -> Result<UserContextMiddleware, OutboundIqError> {
    init_logging(&config)?;
    let middleware = UserContextMiddleware::with_config(config);
    tracing::info!(
        resolver_installed = middleware.registration().is_installed(),
        "OutboundIQ user context tracking initialized"
    );
    Ok(middleware)
}

/// Wraps each inbound request in a scope and publishes a resolver that
/// extracts the user context of whichever request is current.
#[derive(Debug, Clone)]
pub struct UserContextMiddleware {
    registry: Arc<ResolverRegistry>,
    registration: Registration,
}

impl UserContextMiddleware {
    /// Creates middleware using the process-wide registry and default
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Creates middleware using the process-wide registry.
    #[must_use]
    pub fn with_config(config: ContextConfig) -> Self {
        Self::with_registry(global_registry(), config)
    }

    /// Creates middleware publishing to an explicit registry.
    ///
    /// The resolver is installed on construction. If the registry already
    /// holds a resolver, that one stays in effect and `config` is unused.
    #[must_use]
    pub fn with_registry(registry: Arc<ResolverRegistry>, config: ContextConfig) -> Self {
        let registration = configure_resolver(&registry, IdentityExtractor::new(config));
        Self {
            registry,
            registration,
        }
    }

    /// Returns whether this middleware's resolver was the one installed.
    #[must_use]
    pub fn registration(&self) -> Registration {
        self.registration
    }

    /// Returns the registry the middleware publishes to.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    /// Runs the rest of the request's processing inside its scope.
    ///
    /// The request span records the attributed user on entry and again on
    /// completion, so a context attached by the handler is reflected.
    pub async fn handle<F, Fut>(&self, request: RequestContext, next: F) -> Fut::Output
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future,
    {
        let span = request_span(&RequestSpanAttributes::from_request(&request));
        let recorded = span.clone();
        let scoped = request.clone();
        enter_scope(scoped, async move {
            self.record_user(&recorded);
            let output = next(request).await;
            self.record_user(&recorded);
            output
        })
        .instrument(span)
        .await
    }

    /// Runs a synchronous handler inside the request's scope.
    pub fn handle_sync<F, R>(&self, request: RequestContext, next: F) -> R
    where
        F: FnOnce(RequestContext) -> R,
    {
        let span = request_span(&RequestSpanAttributes::from_request(&request));
        let _entered = span.enter();
        let recorded = span.clone();
        let scoped = request.clone();
        enter_scope_sync(scoped, move || {
            self.record_user(&recorded);
            let output = next(request);
            self.record_user(&recorded);
            output
        })
    }

    fn record_user(&self, span: &tracing::Span) {
        if let Some(user) = self.registry.invoke() {
            RequestSpanAttributes::new().with_user(&user).record_user(span);
        }
    }
}

impl Default for UserContextMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

fn configure_resolver(registry: &ResolverRegistry, extractor: IdentityExtractor) -> Registration {
    registry.register(move || current_request().and_then(|request| extractor.extract(&request)))
}

/// Attaches an explicit user context to a request.
///
/// Use this where automatic detection has nothing to go on, such as webhooks
/// that carry the customer in their payload. Calls tracked for the request
/// afterwards use this context even if a principal is attached.
pub fn set_request_user_context(request: &RequestContext, context: UserContext) {
    request.set_user_context(context);
}

/// Returns the request bound to the current scope, if any.
#[must_use]
pub fn get_current_request() -> Option<RequestContext> {
    current_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::JsonPrincipal;
    use crate::observability::capture::CapturedTrace;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn isolated() -> UserContextMiddleware {
        UserContextMiddleware::with_registry(Arc::new(ResolverRegistry::new()), ContextConfig::default())
    }

    fn authed_request(principal: serde_json::Value) -> RequestContext {
        RequestContext::new("GET", "/api/users")
            .with_principal(JsonPrincipal::from_value(principal).unwrap())
    }

    #[tokio::test]
    async fn test_resolves_principal_inside_handler() {
        let middleware = isolated();
        assert!(middleware.registration().is_installed());

        let resolved = middleware
            .handle(authed_request(json!({"id": "42", "role": "admin"})), |_req| async {
                tokio::task::yield_now().await;
                middleware.registry().invoke()
            })
            .await;

        assert_eq!(resolved, Some(UserContext::authenticated("42", "admin")));
    }

    #[tokio::test]
    async fn test_handler_receives_same_request() {
        let middleware = isolated();
        let request = RequestContext::new("POST", "/charges");

        let same = middleware
            .handle(request, |req| async move { get_current_request() == Some(req) })
            .await;

        assert!(same);
        assert_eq!(get_current_request(), None);
    }

    #[tokio::test]
    async fn test_manual_context_in_handler() {
        let middleware = isolated();
        let registry = middleware.registry().clone();
        let request = authed_request(json!({"id": "42"}));

        let resolved = middleware
            .handle(request, |req| async move {
                set_request_user_context(
                    &req,
                    UserContext::new(Some("cus_1".to_string()), "Customer", "webhook"),
                );
                registry.invoke()
            })
            .await;

        assert_eq!(
            resolved,
            Some(UserContext::new(Some("cus_1".to_string()), "Customer", "webhook"))
        );
    }

    #[tokio::test]
    async fn test_anonymous_request_resolves_none() {
        let middleware = isolated();
        let resolved = middleware
            .handle(RequestContext::new("GET", "/health"), |_req| async {
                middleware.registry().invoke()
            })
            .await;
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_second_middleware_keeps_first_resolver() {
        let registry = Arc::new(ResolverRegistry::new());
        let first = UserContextMiddleware::with_registry(registry.clone(), ContextConfig::default());
        let second = UserContextMiddleware::with_registry(
            registry.clone(),
            ContextConfig::new().with_default_subject_type("Member"),
        );

        assert_eq!(first.registration(), Registration::Installed);
        assert_eq!(second.registration(), Registration::AlreadyRegistered);

        let resolved = second.handle_sync(authed_request(json!({"id": 1})), |_req| registry.invoke());
        assert_eq!(resolved, Some(UserContext::authenticated("1", "User")));
    }

    #[test]
    fn test_handle_sync_restores_binding() {
        let middleware = isolated();
        let inside = middleware.handle_sync(RequestContext::new("GET", "/"), |_req| {
            get_current_request().is_some()
        });
        assert!(inside);
        assert_eq!(get_current_request(), None);
    }

    #[tokio::test]
    async fn test_request_span_records_attributed_user() {
        let trace = CapturedTrace::new();
        let _guard = trace.install();
        let middleware = isolated();

        middleware
            .handle(authed_request(json!({"id": "42", "role": "admin"})), |_req| async {})
            .await;

        assert_eq!(trace.request_field("url.path").as_deref(), Some("/api/users"));
        assert_eq!(trace.request_field("enduser.id").as_deref(), Some("42"));
        assert_eq!(trace.request_field("enduser.type").as_deref(), Some("admin"));
    }

    #[test]
    fn test_request_span_records_context_set_by_handler() {
        let trace = CapturedTrace::new();
        let _guard = trace.install();
        let middleware = isolated();

        middleware.handle_sync(RequestContext::new("POST", "/webhooks"), |req| {
            set_request_user_context(
                &req,
                UserContext::new(Some("cus_7".to_string()), "Customer", "webhook"),
            );
        });

        assert_eq!(trace.request_field("enduser.id").as_deref(), Some("cus_7"));
        assert_eq!(trace.request_field("enduser.context").as_deref(), Some("webhook"));
    }
}
