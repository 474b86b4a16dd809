use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use companion_model::{
    CompletionProvider, CompletionReply, CompletionRequest, ErrorKind,
    PromptMessage, ProviderError,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct FakeProviderError(ErrorKind);

impl Display for FakeProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeProviderError {}

impl ProviderError for FakeProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message back after a short pause.
struct FakeProvider;

impl CompletionProvider for FakeProvider {
    type Error = FakeProviderError;

    fn request_completion(
        &self,
        req: &CompletionRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<CompletionReply, Self::Error>> + Send + 'static
    {
        let last_user = req.messages.iter().rev().find_map(|msg| match msg {
            PromptMessage::User(text) => Some(text.clone()),
            _ => None,
        });

        async move {
            let Some(text) = last_user else {
                return Err(FakeProviderError(ErrorKind::MalformedResponse));
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    Err(FakeProviderError(ErrorKind::Cancelled))
                }
                _ = sleep(Duration::from_millis(1)) => {
                    Ok(CompletionReply {
                        text: format!("You said {text}"),
                    })
                }
            }
        }
    }
}

#[tokio::test]
async fn test_completion() {
    let provider = FakeProvider;
    let req = CompletionRequest {
        messages: vec![
            PromptMessage::System("Be brief.".to_string()),
            PromptMessage::User("Good morning".to_string()),
        ],
    };
    let reply = provider
        .request_completion(&req, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(reply.text, "You said Good morning");
}

#[tokio::test]
async fn test_error() {
    let provider = FakeProvider;
    let req = CompletionRequest { messages: vec![] };
    let err = provider
        .request_completion(&req, CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_cancellation() {
    let provider = FakeProvider;
    let req = CompletionRequest {
        messages: vec![PromptMessage::User("Hi".to_string())],
    };
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = provider
        .request_completion(&req, cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}
