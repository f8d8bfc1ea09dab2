//! Capabilities the translator needs from a synced model.
//!
//! Implement [`Model`] on an adapter around your domain object. Each
//! capability has a default, so a model only overrides what it has.
//!
//! # Example
//!
//! ```
//! use restsync_core::{Model, SyncOptions};
//! use serde_json::{Value, json};
//!
//! struct Todo {
//!     id: u64,
//!     title: String,
//! }
//!
//! impl Model for Todo {
//!     fn to_json(&self, _options: &SyncOptions) -> Value {
//!         json!({"id": self.id, "title": self.title})
//!     }
//!
//!     fn url(&self) -> Option<String> {
//!         Some(format!("/todos/{}", self.id))
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::{BeforeSend, RequestDescriptor, RequestHandle, SyncOptions};

/// Transport configuration a model declares for its requests.
#[derive(Clone, Default)]
pub struct AjaxConfig {
    /// Extra headers; names are matched case-insensitively.
    pub headers: HashMap<String, String>,
    /// Ask the transport for a cross-domain capable request.
    pub use_cross_domain: bool,
    /// Raw fields applied to the outgoing transport request.
    pub raw_fields: Option<Map<String, Value>>,
    /// Hook run on the outgoing request just before it is sent.
    pub before_send: Option<BeforeSend>,
}

impl fmt::Debug for AjaxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxConfig")
            .field("headers", &self.headers)
            .field("use_cross_domain", &self.use_cross_domain)
            .field("raw_fields", &self.raw_fields)
            .field("before_send", &self.before_send.is_some())
            .finish()
    }
}

impl AjaxConfig {
    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Requests cross-domain transport behavior.
    #[must_use]
    pub const fn cross_domain(mut self, enabled: bool) -> Self {
        self.use_cross_domain = enabled;
        self
    }

    /// Adds a raw transport field.
    #[must_use]
    pub fn raw_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw_fields
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the pre-send hook.
    #[must_use]
    pub fn before_send(mut self, hook: BeforeSend) -> Self {
        self.before_send = Some(hook);
        self
    }
}

/// Notification emitted on a model by the translator.
#[derive(Debug)]
pub enum SyncEvent<'a> {
    /// A request was handed to the transport.
    Request {
        /// Handle returned by the transport.
        handle: &'a RequestHandle,
        /// Options the call was made with.
        options: &'a SyncOptions,
        /// Descriptor given to the transport.
        descriptor: &'a RequestDescriptor,
    },
}

impl SyncEvent<'_> {
    /// Event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
        }
    }
}

/// A domain object the translator can sync.
pub trait Model: Send + Sync {
    /// JSON representation sent as the body of writes.
    ///
    /// Receives the call's options so the output may vary per call.
    fn to_json(&self, options: &SyncOptions) -> Value;

    /// URL of this model, if it can resolve one.
    fn url(&self) -> Option<String> {
        None
    }

    /// Transport configuration for this model's requests.
    fn ajax_config(&self) -> AjaxConfig {
        AjaxConfig::default()
    }

    /// Receives translator notifications.
    fn emit(&self, event: &SyncEvent<'_>) {
        let _ = event;
    }
}
