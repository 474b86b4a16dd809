use std::pin::Pin;
use std::sync::Arc;

use companion_model::{
    CompletionProvider, CompletionReply, CompletionRequest, ProviderError,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

type SendRequestResult = Result<CompletionReply, Box<dyn ProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(CompletionRequest, CancellationToken)
        -> BoxedSendRequestFuture + Send + Sync
>;

/// A wrapper around a completion provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: CompletionProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req, cancel| {
            let fut = provider.request_completion(&req, cancel);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    match fut.await {
                        Ok(reply) => {
                            trace!("finished a request");
                            Ok(reply)
                        }
                        Err(err) => {
                            if err.is_cancelled() {
                                debug!("request was cancelled");
                            } else {
                                error!("got an error: {err:?}");
                            }
                            Err(Box::new(err) as Box<dyn ProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the settled outcome.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe; dropping the returned future simply
    /// abandons the underlying request.
    #[inline]
    pub async fn send_request(
        &self,
        req: CompletionRequest,
        cancel: CancellationToken,
    ) -> SendRequestResult {
        (self.handler_fn)(req, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use companion_model::PromptMessage;
    use companion_test_model::{PresetOutcome, ScriptedProvider};

    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![PromptMessage::User("Hi".to_owned())],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let provider = ScriptedProvider::default();
        provider.add_outcome(PresetOutcome::Reply("How are you?".to_owned()));

        let model_client = ModelClient::new(provider);
        let reply = model_client
            .send_request(request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.text, "How are you?");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let provider = ScriptedProvider::default();
        provider.add_outcome(PresetOutcome::transport_failure("boom"));

        let model_client = ModelClient::new(provider);
        let err = model_client
            .send_request(request(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(!err.is_cancelled());
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_cancellation_passthrough() {
        let provider = ScriptedProvider::default();
        provider.add_outcome(PresetOutcome::Stall);

        let model_client = ModelClient::new(provider);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = model_client
            .send_request(request(), cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
