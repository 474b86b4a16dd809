//! Conversation-related types and the conversation store.

use std::time::SystemTime;

use companion_model::PromptMessage;

/// The author of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChatRole {
    /// The person typing into the chat.
    User,
    /// The completion service.
    Assistant,
}

/// An immutable, timestamped, role-tagged unit of conversation content.
///
/// Messages are created by the store when appending and never mutated
/// afterwards; they are destroyed only with their owning conversation.
#[derive(Clone, Debug)]
pub struct Message {
    id: String,
    content: String,
    role: ChatRole,
    timestamp: SystemTime,
}

impl Message {
    /// Returns the store-assigned unique id of this message.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the message text.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns who authored this message.
    #[inline]
    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// Returns the creation instant of this message.
    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Projects this message to its wire-level role/content pair,
    /// dropping the id and timestamp.
    pub(crate) fn to_prompt(&self) -> PromptMessage {
        match self.role {
            ChatRole::User => PromptMessage::User(self.content.clone()),
            ChatRole::Assistant => {
                PromptMessage::Assistant(self.content.clone())
            }
        }
    }
}

/// A named, ordered thread of messages with display metadata.
#[derive(Clone, Debug)]
pub struct Conversation {
    id: String,
    title: String,
    description: String,
    timestamp: String,
    pinned: bool,
    unread: u32,
    messages: Vec<Message>,
}

impl Conversation {
    /// Returns the stable id of this conversation.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display title.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the one-line description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the display timestamp label. This is presentation data
    /// and plays no part in ordering.
    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns whether this conversation is pinned.
    #[inline]
    pub fn pinned(&self) -> bool {
        self.pinned
    }

    /// Returns the number of unread messages.
    #[inline]
    pub fn unread(&self) -> u32 {
        self.unread
    }

    /// Returns the message log, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// Seed data for one conversation, supplied by the initial data loader
/// at process start.
#[derive(Clone, Debug)]
pub struct ConversationSeed {
    /// Stable conversation id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// One-line description.
    pub description: String,
    /// Display timestamp label.
    pub timestamp: String,
    /// Whether the conversation is pinned.
    pub pinned: bool,
    /// Seeded unread count.
    pub unread: u32,
    /// Seeded message log, oldest first.
    pub messages: Vec<SeedMessage>,
}

/// One seeded message. The store assigns the real id and timestamp when
/// loading the seed.
#[derive(Clone, Debug)]
pub struct SeedMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// The message text.
    pub content: String,
}

/// Single source of truth for all conversations and the active-selection
/// pointer.
///
/// The store only ever grows: conversations come from the seed set and
/// are never deleted, and message logs are append-only, so insertion
/// order is chronological order. Exactly one conversation is active at
/// any time.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: String,
    next_message_id: u64,
}

impl ConversationStore {
    /// Builds the store from the seed set. The first seed becomes the
    /// active conversation.
    ///
    /// # Panics
    ///
    /// Panics if `seeds` is empty; a session without any conversation
    /// has nowhere to put a submission.
    pub fn from_seeds(seeds: Vec<ConversationSeed>) -> Self {
        assert!(
            !seeds.is_empty(),
            "at least one seed conversation is required"
        );

        let mut store = Self {
            conversations: Vec::with_capacity(seeds.len()),
            active_id: seeds[0].id.clone(),
            next_message_id: 0,
        };
        for seed in seeds {
            let ConversationSeed {
                id,
                title,
                description,
                timestamp,
                pinned,
                unread,
                messages,
            } = seed;
            let messages = messages
                .into_iter()
                .map(|msg| store.mint_message(msg.role, msg.content))
                .collect();
            store.conversations.push(Conversation {
                id,
                title,
                description,
                timestamp,
                pinned,
                unread,
                messages,
            });
        }
        store
    }

    fn mint_message(&mut self, role: ChatRole, content: String) -> Message {
        let id = format!("msg:{}", self.next_message_id);
        self.next_message_id += 1;
        Message {
            id,
            content,
            role,
            timestamp: SystemTime::now(),
        }
    }

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Makes the conversation with the given id active. Returns `false`
    /// (leaving the selection unchanged) when the id is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.conversations.iter().any(|c| c.id == id) {
            return false;
        }
        self.active_id = id.to_owned();
        true
    }

    /// Appends a user message to the given conversation and resets its
    /// unread counter.
    ///
    /// The caller must pass text that is non-empty after trimming.
    /// Returns the updated conversation, or `None` when the id is
    /// unknown.
    pub fn append_user_message(
        &mut self,
        conversation_id: &str,
        text: &str,
    ) -> Option<&Conversation> {
        let message = self.mint_message(ChatRole::User, text.to_owned());
        let conversation = self.conversation_mut(conversation_id)?;
        conversation.messages.push(message);
        conversation.unread = 0;
        Some(conversation)
    }

    /// Appends an assistant message to the given conversation.
    ///
    /// This succeeds whether or not the conversation is active: replies
    /// to a background thread still land in that thread. Returns the
    /// appended message, or `None` when the conversation no longer
    /// exists.
    pub fn append_assistant_message(
        &mut self,
        conversation_id: &str,
        content: &str,
    ) -> Option<&Message> {
        let message =
            self.mint_message(ChatRole::Assistant, content.to_owned());
        let conversation = self.conversation_mut(conversation_id)?;
        conversation.messages.push(message);
        conversation.messages.last()
    }

    /// Returns all conversations in their stable display order.
    #[inline]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Returns the id of the active conversation.
    #[inline]
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Returns the active conversation.
    pub fn active_conversation(&self) -> &Conversation {
        self.conversations
            .iter()
            .find(|c| c.id == self.active_id)
            .expect("internal state is inconsistent")
    }
}
