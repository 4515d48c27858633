//! Handle for communicating with a controller actor.

use tokio::sync::{mpsc, oneshot, watch};

use super::ControllerError;
use super::commands::ControllerCommand;

/// Handle for sending events to a controller and observing its state.
///
/// This handle can be cloned and shared across tasks. The controller stops
/// once every handle has been dropped.
pub struct ControllerHandle<E, S> {
    sender: mpsc::Sender<ControllerCommand<E, S>>,
    state: watch::Receiver<S>,
}

impl<E, S> Clone for ControllerHandle<E, S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }
}

impl<E, S> std::fmt::Debug for ControllerHandle<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("stopped", &self.sender.is_closed())
            .finish()
    }
}

impl<E, S> ControllerHandle<E, S>
where
    E: Send + 'static,
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        sender: mpsc::Sender<ControllerCommand<E, S>>,
        state: watch::Receiver<S>,
    ) -> Self {
        Self { sender, state }
    }

    /// Sends a UI event to the controller.
    ///
    /// Returns once the event is queued; its effects show up in later
    /// snapshots.
    ///
    /// # Errors
    /// - `ControllerError::Stopped` - Controller has shut down
    pub async fn send(&self, event: E) -> Result<(), ControllerError> {
        self.sender
            .send(ControllerCommand::Event(event))
            .await
            .map_err(|_| ControllerError::Stopped)
    }

    /// Current state snapshot.
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    /// Waits until a snapshot satisfies `predicate` and returns it.
    ///
    /// The current snapshot is checked first.
    ///
    /// # Errors
    /// - `ControllerError::Stopped` - Controller shut down before the predicate held
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&S) -> bool,
    ) -> Result<S, ControllerError> {
        let mut receiver = self.state.clone();
        let state = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| ControllerError::Stopped)?;
        Ok(state.clone())
    }

    /// Waits until every event sent so far has been handled and every fetch
    /// those events started has been folded into the state.
    ///
    /// # Errors
    /// - `ControllerError::Stopped` - Controller has shut down
    pub async fn settle(&self) -> Result<S, ControllerError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(ControllerCommand::Settle { responder })
            .await
            .map_err(|_| ControllerError::Stopped)?;

        rx.await.map_err(|_| ControllerError::Stopped)
    }

    /// Stops the controller, aborting outstanding fetches.
    ///
    /// # Errors
    /// - `ControllerError::Stopped` - Controller had already shut down
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        let (responder, rx) = oneshot::channel();
        self.sender
            .send(ControllerCommand::Shutdown { responder })
            .await
            .map_err(|_| ControllerError::Stopped)?;

        rx.await.map_err(|_| ControllerError::Stopped)
    }

    /// Whether the controller has stopped.
    pub fn is_stopped(&self) -> bool {
        self.sender.is_closed()
    }
}
