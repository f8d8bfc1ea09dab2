//! Transport configuration types.

use std::time::Duration;

use url::Url;

/// Configuration for the default HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Base URL that relative descriptor URLs are resolved against.
    pub base_url: Option<Url>,
    /// `User-Agent` sent when the request does not set one.
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            base_url: None,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Resolve a descriptor URL, joining relative URLs onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is relative and no base URL is set, or
    /// if it cannot be parsed.
    pub fn resolve_url(&self, url: &str) -> restsync_core::Result<Url> {
        match &self.base_url {
            Some(base) => base.join(url).map_err(Into::into),
            None => Url::parse(url).map_err(Into::into),
        }
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    timeout: Option<Duration>,
    base_url: Option<Url>,
    user_agent: Option<String>,
}

impl TransportConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the base URL for relative request URLs.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the default `User-Agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        let defaults = TransportConfig::default();
        TransportConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            base_url: self.base_url.or(defaults.base_url),
            user_agent: self.user_agent.or(defaults.user_agent),
        }
    }
}
