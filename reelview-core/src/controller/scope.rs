//! Task scope owning a controller's in-flight fetches.

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinError, JoinSet};

use crate::resource::{Resource, ResourceStream};

/// Spawns fetch tasks whose emissions come back to the controller as updates.
///
/// Every task lives in a `JoinSet`, so dropping the scope when the
/// controller stops aborts whatever is still running.
pub struct FetchScope<U> {
    tasks: JoinSet<()>,
    updates: mpsc::UnboundedSender<U>,
}

impl<U: Send + 'static> FetchScope<U> {
    pub(crate) fn new(updates: mpsc::UnboundedSender<U>) -> Self {
        Self {
            tasks: JoinSet::new(),
            updates,
        }
    }

    /// Forwards each emission of `stream`, mapped into an update.
    pub fn forward<T, F>(&mut self, stream: ResourceStream<T>, map: F) -> AbortHandle
    where
        T: Send + 'static,
        F: Fn(Resource<T>) -> U + Send + 'static,
    {
        let updates = self.updates.clone();
        self.tasks.spawn(forward_stream(stream, map, updates))
    }

    /// Like `forward`, but only starts polling `stream` after `delay`.
    ///
    /// Aborting the returned handle before the delay elapses means the fetch
    /// never runs.
    pub fn forward_after<T, F>(
        &mut self,
        delay: Duration,
        stream: ResourceStream<T>,
        map: F,
    ) -> AbortHandle
    where
        T: Send + 'static,
        F: Fn(Resource<T>) -> U + Send + 'static,
    {
        let updates = self.updates.clone();
        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            forward_stream(stream, map, updates).await;
        })
    }

    /// Runs a single-shot future and delivers its output as an update.
    pub fn resolve<F>(&mut self, future: F) -> AbortHandle
    where
        F: Future<Output = U> + Send + 'static,
    {
        let updates = self.updates.clone();
        self.tasks.spawn(async move {
            let _ = updates.send(future.await);
        })
    }

    /// Number of tasks not yet reaped.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) async fn join_next(&mut self) -> Option<Result<(), JoinError>> {
        self.tasks.join_next().await
    }
}

async fn forward_stream<T, U, F>(
    mut stream: ResourceStream<T>,
    map: F,
    updates: mpsc::UnboundedSender<U>,
) where
    F: Fn(Resource<T>) -> U,
{
    while let Some(resource) = stream.next().await {
        if updates.send(map(resource)).is_err() {
            // Controller is gone
            break;
        }
    }
}
