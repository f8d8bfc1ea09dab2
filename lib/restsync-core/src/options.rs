//! Per-call sync options.
//!
//! [`SyncOptions`] is built fresh for each call. The translator never
//! writes defaults back into it; [`SyncOptions::resolve`] returns the
//! effective flags as a separate value.
//!
//! # Example
//!
//! ```
//! use restsync_core::{SyncConfig, SyncOptions};
//! use serde_json::json;
//!
//! let options = SyncOptions::new()
//!     .url("/todos")
//!     .data(json!({"page": 2}))
//!     .emulate_json(true)
//!     .on_error(|_response, message| eprintln!("sync failed: {message}"));
//!
//! let flags = options.resolve(&SyncConfig::default());
//! assert!(flags.emulate_json);
//! assert!(!flags.emulate_http);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{Callbacks, Outcome, Response, ResponseBody, SharedTransport, SyncConfig, Transport};

/// Options for one sync call.
#[derive(Default)]
pub struct SyncOptions {
    url: Option<String>,
    data: Option<Value>,
    attrs: Option<Value>,
    emulate_http: Option<bool>,
    emulate_json: Option<bool>,
    headers: HashMap<String, String>,
    transport: Option<SharedTransport>,
    callbacks: Callbacks,
    extra: Map<String, Value>,
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("url", &self.url)
            .field("data", &self.data)
            .field("attrs", &self.attrs)
            .field("emulate_http", &self.emulate_http)
            .field("emulate_json", &self.emulate_json)
            .field("headers", &self.headers)
            .field("transport", &self.transport.is_some())
            .field("callbacks", &self.callbacks)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Effective emulation flags after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFlags {
    /// HTTP-method emulation.
    pub emulate_http: bool,
    /// JSON-form emulation.
    pub emulate_json: bool,
}

impl SyncOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target URL; takes precedence over the model's URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Payload: appended as a query string for GET, passed through otherwise.
    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Body for writes, used instead of the model's JSON representation.
    #[must_use]
    pub fn attrs(mut self, attrs: impl Into<Value>) -> Self {
        self.attrs = Some(attrs.into());
        self
    }

    /// Enable or disable HTTP-method emulation for this call.
    #[must_use]
    pub const fn emulate_http(mut self, enabled: bool) -> Self {
        self.emulate_http = Some(enabled);
        self
    }

    /// Enable or disable JSON-form emulation for this call.
    #[must_use]
    pub const fn emulate_json(mut self, enabled: bool) -> Self {
        self.emulate_json = Some(enabled);
        self
    }

    /// Adds a request header. Names are case-insensitive; the last call wins.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Uses `transport` instead of the syncer's default.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses an already shared transport instead of the syncer's default.
    #[must_use]
    pub fn shared_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Field the translator does not interpret, passed on to the transport.
    #[must_use]
    pub fn extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Called with the decoded body when the request succeeds.
    #[must_use]
    pub fn on_success(
        mut self,
        callback: impl FnOnce(ResponseBody, &Response) + Send + 'static,
    ) -> Self {
        self.callbacks.success = Some(Box::new(callback));
        self
    }

    /// Called with the response (if any) and a message when the request fails.
    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl FnOnce(Option<&Response>, &str) + Send + 'static,
    ) -> Self {
        self.callbacks.error = Some(Box::new(callback));
        self
    }

    /// Called once after `success` or `error`.
    #[must_use]
    pub fn on_always(mut self, callback: impl FnOnce(&Outcome) + Send + 'static) -> Self {
        self.callbacks.always = Some(Box::new(callback));
        self
    }

    /// Explicit URL, if set.
    #[must_use]
    pub fn url_value(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Payload, if set.
    #[must_use]
    pub const fn data_value(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Write override, if set.
    #[must_use]
    pub const fn attrs_value(&self) -> Option<&Value> {
        self.attrs.as_ref()
    }

    /// Caller headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Uninterpreted fields.
    #[must_use]
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Applies `config` to the flags left unset; explicit values win.
    #[must_use]
    pub fn resolve(&self, config: &SyncConfig) -> ResolvedFlags {
        ResolvedFlags {
            emulate_http: self.emulate_http.unwrap_or(config.emulate_http),
            emulate_json: self.emulate_json.unwrap_or(config.emulate_json),
        }
    }

    pub(crate) fn take_callbacks(&mut self) -> Callbacks {
        std::mem::take(&mut self.callbacks)
    }

    pub(crate) fn take_transport(&mut self) -> Option<SharedTransport> {
        self.transport.take()
    }
}
