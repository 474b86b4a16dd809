use std::error::Error;

use tokio_util::sync::CancellationToken;

use crate::error::ErrorKind;
use crate::reply::CompletionReply;
use crate::request::CompletionRequest;

/// The error type for a completion provider.
pub trait ProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns whether this error is the cancellation signal.
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

/// A type that represents a completion service, which can turn a message
/// history into a single generated reply.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
pub trait CompletionProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Sends a request to the completion service.
    ///
    /// The returned future must settle with [`ErrorKind::Cancelled`]
    /// promptly once `cancel` fires, and implementations should check the
    /// token before doing any work at all.
    fn request_completion(
        &self,
        req: &CompletionRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<CompletionReply, Self::Error>> + Send + 'static;
}
