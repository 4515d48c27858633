//! Actor loop shared by every screen controller.

use tokio::sync::{mpsc, oneshot, watch};

use super::Controller;
use super::commands::ControllerCommand;
use super::handle::ControllerHandle;
use super::scope::FetchScope;

/// Spawns a controller actor and returns its handle.
///
/// The actor processes UI events and fetch emissions one at a time, so each
/// fold into the state is atomic. Snapshots are published through a watch
/// channel seeded with `initial`.
///
/// # Examples
/// ```rust,no_run
/// # async fn demo(
/// #     media: std::sync::Arc<dyn reelview_core::MediaRepository>,
/// #     details: std::sync::Arc<dyn reelview_core::DetailsRepository>,
/// # ) -> Result<(), reelview_core::ControllerError> {
/// use reelview_core::controller::spawn_controller;
/// use reelview_core::controller::details::{DetailsController, DetailsEvent};
/// use reelview_core::domain::MediaType;
/// use reelview_core::state::DetailsState;
///
/// let controller = DetailsController::new(media, details);
/// let handle = spawn_controller(controller, DetailsState::default(), 100);
/// handle
///     .send(DetailsEvent::load(603, MediaType::Movie, "popular"))
///     .await?;
/// let state = handle.settle().await?;
/// println!("{:?}", state.media);
/// # Ok(())
/// # }
/// ```
pub fn spawn_controller<C: Controller>(
    controller: C,
    initial: C::State,
    command_buffer: usize,
) -> ControllerHandle<C::Event, C::State> {
    let (sender, receiver) = mpsc::channel(command_buffer.max(1));
    let (state_sender, state_receiver) = watch::channel(initial.clone());

    tokio::spawn(async move {
        run_actor_loop(controller, initial, receiver, state_sender).await;
    });

    ControllerHandle::new(sender, state_receiver)
}

/// Runs the main actor message processing loop.
///
/// The loop ends when a shutdown command arrives or every handle is dropped.
/// Dropping the scope on exit aborts fetches that are still running.
async fn run_actor_loop<C: Controller>(
    mut controller: C,
    mut state: C::State,
    mut commands: mpsc::Receiver<ControllerCommand<C::Event, C::State>>,
    state_sender: watch::Sender<C::State>,
) {
    let (update_sender, mut updates) = mpsc::unbounded_channel();
    let mut scope = FetchScope::new(update_sender);
    let mut settle_waiters: Vec<oneshot::Sender<C::State>> = Vec::new();

    tracing::debug!(controller = C::NAME, "Controller actor started");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ControllerCommand::Event(event)) => {
                    let next = controller.handle_event(&state, event, &mut scope);
                    publish(&state_sender, &mut state, next);
                }
                Some(ControllerCommand::Settle { responder }) => {
                    settle_waiters.push(responder);
                }
                Some(ControllerCommand::Shutdown { responder }) => {
                    tracing::debug!(controller = C::NAME, "Controller actor shutting down");
                    commands.close();
                    let _ = responder.send(());
                    break;
                }
                None => break,
            },

            Some(update) = updates.recv() => {
                let next = controller.handle_update(&state, update, &mut scope);
                publish(&state_sender, &mut state, next);
            }

            Some(joined) = scope.join_next(), if !scope.is_idle() => {
                if let Err(error) = joined {
                    if error.is_panic() {
                        tracing::warn!(controller = C::NAME, "Fetch task panicked: {}", error);
                    }
                }
            }
        }

        if !settle_waiters.is_empty() && scope.is_idle() && updates.is_empty() {
            for responder in settle_waiters.drain(..) {
                let _ = responder.send(state.clone());
            }
        }
    }

    tracing::debug!(
        controller = C::NAME,
        aborted = scope.active(),
        "Controller actor stopped"
    );
}

/// Replaces the held state and notifies observers if it changed.
fn publish<S: Clone + PartialEq>(sender: &watch::Sender<S>, state: &mut S, next: S) {
    if *state == next {
        return;
    }
    *state = next;
    sender.send_replace(state.clone());
}
