use companion_model::{CompletionRequest, PromptMessage};
use serde::{Deserialize, Serialize};

use crate::OpenRouterConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &CompletionRequest,
    config: &OpenRouterConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
    }
}

#[inline]
fn create_message(msg: &PromptMessage) -> Message {
    match msg {
        PromptMessage::System(content) => Message::System {
            content: content.clone(),
        },
        PromptMessage::User(content) => Message::User {
            content: content.clone(),
        },
        PromptMessage::Assistant(content) => Message::Assistant {
            content: content.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenRouterConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = CompletionRequest {
            messages: vec![
                PromptMessage::System("You are a helpful assistant.".to_owned()),
                PromptMessage::User("Hello".to_owned()),
                PromptMessage::Assistant("Hi, how can I help?".to_owned()),
            ],
        };
        let config = OpenRouterConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Message::System {
                    content: "You are a helpful assistant.".to_owned(),
                },
                Message::User {
                    content: "Hello".to_owned(),
                },
                Message::Assistant {
                    content: "Hi, how can I help?".to_owned(),
                },
            ],
        };
        assert_eq!(create_request(&request, &config), expected);
    }

    #[test]
    fn test_request_wire_shape() {
        let config = OpenRouterConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let request = create_request(
            &CompletionRequest {
                messages: vec![PromptMessage::User("Hello".to_owned())],
            },
            &config,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "custom",
                "messages": [{ "role": "user", "content": "Hello" }],
            })
        );
    }

    #[test]
    fn test_parse_completion() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{
                "id": "gen-1",
                "choices": [{ "message": { "role": "assistant", "content": "hi there" } }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some("hi there")
        );
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let completion: ChatCompletion =
            serde_json::from_str(r#"{ "id": "gen-1" }"#).unwrap();
        assert!(completion.choices.is_empty());
    }
}
