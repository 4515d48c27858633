//! Command definitions for the controller actor model.

use tokio::sync::oneshot;

/// Commands that can be sent to a controller actor.
///
/// Screen events are forwarded to the controller; the remaining commands
/// are handled by the runtime itself.
pub enum ControllerCommand<E, S> {
    /// A UI event for the controller to handle.
    Event(E),
    /// Reply with the state once every fetch started so far has been folded in.
    Settle { responder: oneshot::Sender<S> },
    /// Shutdown the controller gracefully, aborting outstanding fetches.
    Shutdown { responder: oneshot::Sender<()> },
}
