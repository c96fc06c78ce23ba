//! Transport configuration types.

use http::header::USER_AGENT;

/// Default `User-Agent` sent by [`ServiceTransport`](crate::ServiceTransport).
pub const DEFAULT_USER_AGENT: &str = concat!("weft/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`ServiceTransport`](crate::ServiceTransport).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// `User-Agent` header, added unless the request sets one.
    pub user_agent: String,
    /// Headers added to every request that does not set them.
    pub default_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: Vec::new(),
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Headers to add to a request, in order: defaults first, then `User-Agent`.
    ///
    /// Names already present in `existing` (case-insensitive) are skipped.
    pub(crate) fn missing_headers(&self, existing: &[(String, String)]) -> Vec<(String, String)> {
        let user_agent = (USER_AGENT.as_str().to_string(), self.user_agent.clone());
        let mut missing: Vec<(String, String)> = Vec::new();

        for (name, value) in self.default_headers.iter().chain(std::iter::once(&user_agent)) {
            let present = existing
                .iter()
                .chain(&missing)
                .any(|(key, _)| key.eq_ignore_ascii_case(name));
            if !present {
                missing.push((name.clone(), value.clone()));
            }
        }
        missing
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl TransportConfigBuilder {
    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        let defaults = TransportConfig::default();
        TransportConfig {
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            default_headers: self.default_headers,
        }
    }
}
