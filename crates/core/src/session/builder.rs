use companion_model::CompletionProvider;

use super::{Session, Snapshot};
use crate::conversation::{ConversationSeed, Message};
use crate::model_client::ModelClient;

pub(super) type UpdateCallback = Box<dyn Fn(Snapshot) + Send + Sync>;
pub(super) type MessageCallback = Box<dyn Fn(&str, &Message) + Send + Sync>;
pub(super) type IdleCallback = Box<dyn Fn() + Send + Sync>;

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(super) model_client: ModelClient,
    pub(super) system_prompt: String,
    pub(super) seeds: Vec<ConversationSeed>,
    pub(super) on_update: Option<UpdateCallback>,
    pub(super) on_message: Option<MessageCallback>,
    pub(super) on_idle: Option<IdleCallback>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified completion provider.
    #[inline]
    pub fn with_completion_provider<P: CompletionProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: String::new(),
            seeds: vec![],
            on_update: None,
            on_message: None,
            on_idle: None,
        }
    }

    /// Sets the system prompt prepended to every completion request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the seed conversations. At least one is required.
    #[inline]
    pub fn with_conversations(
        mut self,
        seeds: Vec<ConversationSeed>,
    ) -> Self {
        self.seeds = seeds;
        self
    }

    /// Attaches a callback to be invoked with a fresh [`Snapshot`] after
    /// every state change.
    #[inline]
    pub fn on_update(
        mut self,
        on_update: impl Fn(Snapshot) + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(on_update));
        self
    }

    /// Attaches a callback to be invoked for every message appended to
    /// any conversation, with the owning conversation's id.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&str, &Message) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback to be invoked when a settlement leaves no
    /// request in flight.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the session and spawns its task.
    ///
    /// # Panics
    ///
    /// Panics if no seed conversations were provided.
    #[inline]
    pub fn build(self) -> Session {
        Session::spawn_from_builder(self)
    }
}
