use serde::{Deserialize, Serialize};

/// A request to be sent to the completion service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompletionRequest {
    /// The input messages, in the order they should be presented to the
    /// model: one system entry followed by the conversation log.
    pub messages: Vec<PromptMessage>,
}

/// One role/content pair of the request payload.
///
/// This is the wire-level projection of a conversation message: ids and
/// timestamps are already dropped at this point.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum PromptMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// A previously generated assistant text.
    Assistant(String),
}

impl PromptMessage {
    /// Returns the content of this message.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            PromptMessage::System(content)
            | PromptMessage::User(content)
            | PromptMessage::Assistant(content) => content,
        }
    }
}
