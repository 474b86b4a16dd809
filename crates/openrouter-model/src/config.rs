use std::fmt::Debug;

/// Builder for [`OpenRouterConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OpenRouterConfigBuilder {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterConfigBuilder {
    /// Creates a builder with the given API key.
    ///
    /// The key may be empty; the provider then fails every request with a
    /// configuration error instead of refusing to construct, so the
    /// missing credential surfaces at first use.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            referer: None,
            title: None,
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the referer reported via the `HTTP-Referer` header.
    #[inline]
    pub fn with_referer<S: Into<String>>(mut self, referer: S) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Sets the app title reported via the `X-Title` header.
    #[inline]
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: self.api_key,
            model: self
                .model
                .unwrap_or_else(|| "x-ai/grok-4.1-fast".to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            referer: self
                .referer
                .unwrap_or_else(|| "http://localhost".to_string()),
            title: self.title.unwrap_or_else(|| "AI Chat Companion".to_string()),
        }
    }
}

impl Debug for OpenRouterConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

/// Configuration for the OpenRouter-compatible provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OpenRouterConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) referer: String,
    pub(crate) title: String,
}

impl Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OpenRouterConfigBuilder::with_api_key("xxx").build();
        assert_eq!(config.model, "x-ai/grok-4.1-fast");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.referer, "http://localhost");
        assert_eq!(config.title, "AI Chat Companion");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = OpenRouterConfigBuilder::with_api_key("secret").build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
