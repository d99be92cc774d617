//! Task-local storage of the current request.
//!
//! A request is bound for the extent of a future (or closure) passed to
//! [`enter_scope`]. The binding is stored per task-local scope rather than per
//! OS thread, so it follows the future across suspension points and worker
//! threads, and two futures interleaved on the same task each see only their
//! own binding. Work spawned with a plain `tokio::spawn` starts unbound; use
//! [`spawn_scoped`] or [`bind_current`] to carry the binding along.

use super::RequestContext;
use std::future::Future;
use tokio::task::JoinHandle;
use uuid::Uuid;

tokio::task_local! {
    static CURRENT_REQUEST: Option<RequestContext>;
}

/// Logs scope exit when dropped, so unwinding and cancellation are logged too.
struct ScopeExitLog {
    request_id: Uuid,
}

impl ScopeExitLog {
    fn enter(request: &RequestContext) -> Self {
        let request_id = request.request_id();
        tracing::debug!(%request_id, "Entering request scope");
        Self { request_id }
    }
}

impl Drop for ScopeExitLog {
    fn drop(&mut self) {
        tracing::debug!(request_id = %self.request_id, "Exited request scope");
    }
}

/// Runs `body` with `request` bound as the current request.
///
/// The previous binding (or none) is restored when `body` completes, returns
/// an error, panics, or is dropped before completion.
pub async fn enter_scope<F>(request: RequestContext, body: F) -> F::Output
where
    F: Future,
{
    let _exit = ScopeExitLog::enter(&request);
    CURRENT_REQUEST.scope(Some(request), body).await
}

/// Runs the closure `body` with `request` bound as the current request.
///
/// Restoration is unconditional, including when `body` panics.
pub fn enter_scope_sync<F, R>(request: RequestContext, body: F) -> R
where
    F: FnOnce() -> R,
{
    let _exit = ScopeExitLog::enter(&request);
    CURRENT_REQUEST.sync_scope(Some(request), body)
}

/// Runs `body` with no request bound, shadowing any enclosing binding.
pub async fn without_scope<F>(body: F) -> F::Output
where
    F: Future,
{
    CURRENT_REQUEST.scope(None, body).await
}

/// Returns the request bound to the calling task, if any.
#[must_use]
pub fn current_request() -> Option<RequestContext> {
    CURRENT_REQUEST
        .try_with(Clone::clone)
        .ok()
        .flatten()
}

/// Returns true if a request is bound to the calling task.
#[must_use]
pub fn has_active_scope() -> bool {
    CURRENT_REQUEST
        .try_with(Option::is_some)
        .unwrap_or(false)
}

/// Wraps `future` so that it runs under the binding current at the time of
/// this call.
///
/// Use this for callbacks and continuations that are handed to another
/// executor but still belong to the current request.
pub fn bind_current<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    CURRENT_REQUEST.scope(current_request(), future)
}

/// Spawns `future` on the tokio runtime, carrying the current binding into it.
pub fn spawn_scoped<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(bind_current(future))
}
