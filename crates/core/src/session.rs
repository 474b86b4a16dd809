//! The chat session: a single-threaded owner of the conversation store
//! plus the completion-request coordinator.
//!
//! All state lives on one spawned task; clonable [`Session`] handles
//! feed it commands over a channel, so every mutation happens in command
//! order on that task. The completion request itself is the only
//! suspension point, and its settlement comes back to the same task as
//! another command.

mod builder;
mod state;
#[cfg(test)]
mod tests;

use tokio::sync::{mpsc, oneshot};

use crate::conversation::{Conversation, ConversationStore};
pub use builder::SessionBuilder;
use state::{Command, SessionState, run_session};

/// Prefix prepended to a failed request's error text when the failure is
/// surfaced as an assistant reply.
pub const REPLY_ERROR_PREFIX: &str =
    "Sorry, I can't finish that request right now: ";

/// An immutable view of the session state, emitted to observers after
/// every state change and retrievable on demand.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// All conversations in their stable display order.
    pub conversations: Vec<Conversation>,
    /// Id of the active conversation.
    pub active_id: String,
    /// Whether the typing indicator should be rendered. This is already
    /// scoped to the active conversation: it goes true when a request is
    /// issued there and false the moment the user navigates away.
    pub typing: bool,
}

/// A chat session over a set of seeded conversations.
///
/// The handle is cheap to clone; all clones talk to the same session
/// task. Dropping every handle shuts the session down (an in-flight
/// request is cancelled at that point).
#[derive(Clone)]
pub struct Session {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl Session {
    fn spawn_from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            model_client,
            system_prompt,
            seeds,
            on_update,
            on_message,
            on_idle,
        } = builder;

        let state = SessionState {
            store: ConversationStore::from_seeds(seeds),
            model_client,
            system_prompt,
            typing: false,
            in_flight: None,
            next_request_id: 1,
            on_update,
            on_message,
            on_idle,
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(
            state,
            command_rx,
            command_tx.downgrade(),
        ));
        Self { command_tx }
    }

    /// Submits user text to the active conversation.
    ///
    /// Text that is empty after trimming is silently ignored. Otherwise
    /// the text is appended as a user message and a completion request
    /// is issued, superseding (and cancelling) any request still in
    /// flight.
    pub fn submit<S: Into<String>>(&self, text: S) {
        self.send(Command::Submit(text.into()));
    }

    /// Makes the conversation with the given id active, clearing the
    /// typing indicator. Unknown ids leave the selection unchanged.
    pub fn select_conversation<S: Into<String>>(&self, id: S) {
        self.send(Command::Select(id.into()));
    }

    /// Returns a snapshot of the current session state.
    ///
    /// The snapshot is taken after every command sent before this call
    /// has been handled.
    pub async fn snapshot(&self) -> Snapshot {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx));
        reply_rx
            .await
            .expect("session task has been dropped too early")
    }

    fn send(&self, command: Command) {
        self.command_tx
            .send(command)
            .expect("session task has been dropped too early");
    }
}
