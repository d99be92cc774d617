//! Request-scoped context propagation.
//!
//! This module provides:
//! - The [`RequestContext`] handle for one inbound request
//! - Task-local scope entry and lookup of the current request
//! - Helpers that carry the binding into spawned work

mod request;
mod scope;
mod task_group;

pub use request::RequestContext;
pub use scope::{
    bind_current, current_request, enter_scope, enter_scope_sync, has_active_scope, spawn_scoped,
    without_scope,
};
pub use task_group::ScopedTaskGroup;
