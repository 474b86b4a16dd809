//! A completion provider for OpenRouter-compatible APIs.
//!
//! The provider issues a single non-streaming `POST /chat/completions`
//! per request and extracts the first choice's message text.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use companion_model::{
    CompletionProvider, CompletionReply, CompletionRequest, ErrorKind,
    ProviderError,
};
use mime::Mime;
use reqwest::{Client, header};
use tokio_util::sync::CancellationToken;

pub use config::{OpenRouterConfig, OpenRouterConfigBuilder};

/// Error type for [`OpenRouterProvider`].
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

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// OpenRouter-compatible completion provider.
#[derive(Clone, Debug)]
pub struct OpenRouterProvider {
    client: Client,
    config: Arc<OpenRouterConfig>,
}

impl OpenRouterProvider {
    /// Creates a new `OpenRouterProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl CompletionProvider for OpenRouterProvider {
    type Error = Error;

    fn request_completion(
        &self,
        req: &CompletionRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<CompletionReply, Self::Error>> + Send + 'static
    {
        let payload = proto::create_request(req, &self.config);
        let client = self.client.clone();
        let config = Arc::clone(&self.config);

        async move {
            if config.api_key.is_empty() {
                return Err(Error::new(
                    "OpenRouter API key is not configured",
                    ErrorKind::Configuration,
                ));
            }
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }

            trace!("sending completion request: {payload:?}");

            let resp_fut = client
                .post(format!("{}{}", config.base_url, "/chat/completions"))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", config.api_key),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .header("HTTP-Referer", config.referer.as_str())
                .header("X-Title", config.title.as_str())
                .json(&payload)
                .send();
            let resp = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::cancelled()),
                resp = resp_fut => resp.map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::Transport)
                })?,
            };

            let status = resp.status();
            if !status.is_success() {
                let body = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(Error::cancelled()),
                    body = resp.text() => body.unwrap_or_default(),
                };
                let detail = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error")
                } else {
                    body.trim()
                };
                return Err(Error::new(
                    format!(
                        "completion request failed ({}): {detail}",
                        status.as_u16()
                    ),
                    ErrorKind::Transport,
                ));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_json = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype().as_str() == "json")
                .unwrap_or(false);
            if !is_json {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::MalformedResponse,
                ));
            }

            let completion = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::cancelled()),
                body = resp.json::<proto::ChatCompletion>() => {
                    body.map_err(|err| {
                        Error::new(format!("{err}"), ErrorKind::MalformedResponse)
                    })?
                }
            };

            extract_reply(completion)
        }
    }
}

fn extract_reply(
    completion: proto::ChatCompletion,
) -> Result<CompletionReply, Error> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|text| !text.is_empty())
        .map(|text| CompletionReply { text })
        .ok_or_else(|| {
            Error::new(
                "the service returned an empty completion",
                ErrorKind::MalformedResponse,
            )
        })
}
