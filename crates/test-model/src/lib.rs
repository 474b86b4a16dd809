//! A local fake completion service for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use companion_model::{
    CompletionProvider, CompletionReply, CompletionRequest, ErrorKind,
    ProviderError,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub use preset::*;

/// Error type for [`ScriptedProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn cancelled() -> Self {
        Self::new("the request was cancelled", ErrorKind::Cancelled)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Inner {
    script: VecDeque<PresetOutcome>,
    requests: Vec<CompletionRequest>,
    delay: Option<Duration>,
}

/// A local fake completion service for testing purpose.
///
/// Before sending requests, you need to set up the script, which is how
/// the service should settle each request. Scripted outcomes are consumed
/// in order, one per request; when the script runs out, requests fail
/// with a transport error.
///
/// Every received request is recorded and can be inspected later with
/// [`recorded_requests`](Self::recorded_requests). Clones share the same
/// script and recording.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedProvider {
    /// Appends a scripted outcome for the next unanswered request.
    #[inline]
    pub fn add_outcome(&self, outcome: PresetOutcome) {
        self.inner.lock().unwrap().script.push_back(outcome);
    }

    /// Makes every settlement wait for `duration` first (cancellation
    /// still interrupts the wait).
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.inner.lock().unwrap().delay = Some(duration);
    }

    /// Returns every request received so far, in arrival order.
    #[inline]
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    type Error = Error;

    fn request_completion(
        &self,
        req: &CompletionRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<CompletionReply, Self::Error>> + Send + 'static
    {
        let inner = Arc::clone(&self.inner);
        let req = req.clone();

        async move {
            let (outcome, delay) = {
                let mut inner = inner.lock().unwrap();
                inner.requests.push(req);
                (inner.script.pop_front(), inner.delay)
            };
            let Some(outcome) = outcome else {
                return Err(Error::new(
                    "no scripted outcome left",
                    ErrorKind::Transport,
                ));
            };

            if let Some(delay) = delay {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(Error::cancelled()),
                    _ = sleep(delay) => {}
                }
            }

            match outcome {
                PresetOutcome::Reply(text) => {
                    if cancel.is_cancelled() {
                        return Err(Error::cancelled());
                    }
                    Ok(CompletionReply { text })
                }
                PresetOutcome::Failure { kind, message } => {
                    Err(Error::new(message, kind.into()))
                }
                PresetOutcome::Stall => {
                    cancel.cancelled().await;
                    Err(Error::cancelled())
                }
            }
        }
    }
}
