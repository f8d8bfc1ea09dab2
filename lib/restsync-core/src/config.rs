//! Translator defaults.

/// Defaults applied to options a caller leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncConfig {
    /// Tunnel PUT/PATCH/DELETE through POST with a method-override header.
    pub emulate_http: bool,
    /// Send bodies as a form-encoded `model` field instead of JSON.
    pub emulate_json: bool,
}

impl SyncConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }
}

/// Builder for [`SyncConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncConfigBuilder {
    emulate_http: Option<bool>,
    emulate_json: Option<bool>,
}

impl SyncConfigBuilder {
    /// Set the default for HTTP-method emulation.
    #[must_use]
    pub const fn emulate_http(mut self, enabled: bool) -> Self {
        self.emulate_http = Some(enabled);
        self
    }

    /// Set the default for JSON-form emulation.
    #[must_use]
    pub const fn emulate_json(mut self, enabled: bool) -> Self {
        self.emulate_json = Some(enabled);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SyncConfig {
        let defaults = SyncConfig::default();
        SyncConfig {
            emulate_http: self.emulate_http.unwrap_or(defaults.emulate_http),
            emulate_json: self.emulate_json.unwrap_or(defaults.emulate_json),
        }
    }
}
