//! # OutboundIQ
//!
//! Request-scoped user context for OutboundIQ outbound call tracking.
//!
//! The instrumentation that records outbound HTTP calls runs deep inside
//! client libraries and has no idea which inbound request it is serving. This
//! crate bridges that gap:
//!
//! - **Request scoping**: bind a [`RequestContext`](context::RequestContext) to
//!   everything a request's future does, across every `.await`
//! - **Identity extraction**: derive a [`UserContext`](identity::UserContext)
//!   from the principal an auth layer attached to the request
//! - **Resolver publication**: expose "who is the current user" to the
//!   instrumentation through a single-slot registry
//! - **Manual override**: attach an explicit user context where no principal
//!   exists, such as webhooks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use outboundiq::prelude::*;
//!
//! let middleware = UserContextMiddleware::new();
//!
//! // Once per inbound request, after authentication:
//! let request = RequestContext::new("GET", "/api/payment")
//!     .with_principal(JsonPrincipal::from_value(claims).unwrap_or_default());
//!
//! middleware
//!     .handle(request, |req| async move {
//!         // Calls tracked in here resolve to the request's user.
//!         let user = resolve_user_context();
//!     })
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod identity;
pub mod middleware;
pub mod observability;
pub mod resolver;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ContextConfig;
    pub use crate::context::{
        bind_current, current_request, enter_scope, enter_scope_sync, spawn_scoped,
        RequestContext, ScopedTaskGroup,
    };
    pub use crate::errors::{ConfigError, OutboundIqError, TaskError};
    pub use crate::identity::{
        extract_user_context, IdentityExtractor, JsonPrincipal, Principal, UserContext,
    };
    pub use crate::middleware::{
        get_current_request, init, set_request_user_context, UserContextMiddleware,
    };
    pub use crate::resolver::{
        global_registry, resolve_user_context, set_user_context_resolver, Registration,
        ResolverRegistry,
    };
}
