//! Structured task group whose tasks inherit the spawning request.

use super::scope::{bind_current, current_request};
use super::RequestContext;
use crate::errors::TaskError;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::RwLock;
use std::future::Future;
use tokio::task::{AbortHandle, JoinHandle};

/// A group of related tasks spawned on behalf of one request.
///
/// Each task runs under the request binding that was current when it was
/// spawned, so outbound calls made from fan-out work are attributed to the
/// originating request. If any task errors, the remaining tasks are aborted.
pub struct ScopedTaskGroup {
    /// Handles to spawned tasks, with their names.
    handles: RwLock<Vec<(String, JoinHandle<Result<(), String>>)>>,
    /// The first error encountered.
    first_error: RwLock<Option<TaskError>>,
}

impl ScopedTaskGroup {
    /// Creates a new task group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(Vec::new()),
            first_error: RwLock::new(None),
        }
    }

    /// Spawns a task in the group under the current request binding.
    pub fn spawn<Fut>(&self, name: &str, task: Fut)
    where
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        tracing::trace!(
            task = name,
            request_id = ?current_request().map(|r| r.request_id()),
            "Spawning scoped task"
        );
        let handle = tokio::spawn(bind_current(task));
        self.handles.write().push((name.to_string(), handle));
    }

    /// Spawns a task in the group bound to an explicit request.
    pub fn spawn_for<Fut>(&self, name: &str, request: RequestContext, task: Fut)
    where
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let handle = tokio::spawn(super::scope::enter_scope(request, task));
        self.handles.write().push((name.to_string(), handle));
    }

    /// Aborts all pending tasks in the group.
    pub fn abort_all(&self) {
        for (_, handle) in self.handles.read().iter() {
            handle.abort();
        }
    }

    /// Waits for all tasks to complete.
    ///
    /// Tasks are observed in completion order. The first failure aborts
    /// every task still running and is returned once they have all stopped.
    pub async fn wait(&self) -> Result<(), TaskError> {
        *self.first_error.write() = None;
        let handles = std::mem::take(&mut *self.handles.write());
        let aborts: Vec<AbortHandle> = handles.iter().map(|(_, h)| h.abort_handle()).collect();

        let mut pending: FuturesUnordered<_> = handles
            .into_iter()
            .map(|(name, handle)| async move { (name, handle.await) })
            .collect();

        while let Some((name, joined)) = pending.next().await {
            let error = match joined {
                Ok(Ok(())) => None,
                Ok(Err(message)) => Some(TaskError::Failed { name, message }),
                Err(join_error) => Some(TaskError::Join {
                    name,
                    message: join_error.to_string(),
                }),
            };

            if let Some(error) = error {
                let mut first_error = self.first_error.write();
                if first_error.is_none() {
                    tracing::debug!(task = error.task_name(), %error, "Scoped task failed");
                    *first_error = Some(error);
                    for abort in &aborts {
                        abort.abort();
                    }
                }
            }
        }

        self.first_error.read().clone().map_or(Ok(()), Err)
    }

    /// Returns the number of pending tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.handles.read().len()
    }
}

impl Default for ScopedTaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopedTaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedTaskGroup")
            .field("task_count", &self.task_count())
            .field("failed", &self.first_error.read().is_some())
            .finish()
    }
}
