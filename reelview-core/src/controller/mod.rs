//! Screen controllers built on a shared actor runtime
//!
//! A controller receives UI events, starts fetches through a `FetchScope`
//! and folds each fetch emission into a new state snapshot. The runtime in
//! `actor` owns the state and is its only writer.

pub mod actor;
pub mod commands;
pub mod details;
pub mod handle;
pub mod lists;
pub mod scope;
pub mod search;

#[cfg(test)]
pub(crate) mod test_mocks;

pub use actor::spawn_controller;
pub use commands::ControllerCommand;
pub use handle::ControllerHandle;
pub use scope::FetchScope;

/// Errors reported by controller handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("Controller has stopped")]
    Stopped,
}

/// Screen-specific logic driven by the actor runtime.
///
/// Both handlers receive the current snapshot and return the next one; the
/// runtime publishes it if it differs.
pub trait Controller: Send + 'static {
    /// Name used in log fields.
    const NAME: &'static str;

    type Event: Send + 'static;
    type Update: Send + 'static;
    type State: Clone + PartialEq + Send + Sync + 'static;

    /// Handles a UI event, possibly starting fetches.
    fn handle_event(
        &mut self,
        state: &Self::State,
        event: Self::Event,
        scope: &mut FetchScope<Self::Update>,
    ) -> Self::State;

    /// Folds one fetch emission into the state.
    fn handle_update(
        &mut self,
        state: &Self::State,
        update: Self::Update,
        scope: &mut FetchScope<Self::Update>,
    ) -> Self::State;
}
