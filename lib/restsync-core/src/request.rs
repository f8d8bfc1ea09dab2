//! Request descriptors handed to a [`Transport`](crate::Transport).
//!
//! A [`RequestDescriptor`] is the fully assembled, transport-ready form of
//! one sync call. Header names are always stored lower-cased.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::Method;

/// Pre-send hook declared by a model, run against the outgoing request.
pub type BeforeSend = Arc<dyn Fn(&mut OutgoingRequest) -> Option<Value> + Send + Sync>;

/// Body of a request descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured payload the transport sends as `application/json`.
    Json(Value),
    /// Form-encoded string produced by JSON emulation.
    Form(String),
}

impl Body {
    /// JSON payload, if this is a structured body.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Form(_) => None,
        }
    }

    /// Encoded form string, if this is an emulated body.
    #[must_use]
    pub fn as_form(&self) -> Option<&str> {
        match self {
            Self::Form(encoded) => Some(encoded),
            Self::Json(_) => None,
        }
    }
}

/// Transport-ready description of one HTTP request.
#[derive(Clone)]
pub struct RequestDescriptor {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<Body>,
    pub(crate) data: Option<Value>,
    pub(crate) use_cross_domain: bool,
    pub(crate) raw_fields: Option<Map<String, Value>>,
    pub(crate) before_send: Option<BeforeSend>,
    pub(crate) extensions: Map<String, Value>,
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("data", &self.data)
            .field("use_cross_domain", &self.use_cross_domain)
            .field("raw_fields", &self.raw_fields)
            .field("before_send", &self.before_send.is_some())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl RequestDescriptor {
    /// Creates a bare descriptor with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            data: None,
            use_cross_domain: false,
            raw_fields: None,
            before_send: None,
            extensions: Map::new(),
        }
    }

    /// Outgoing HTTP verb.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, including any appended query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers, keyed by lower-case name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Caller payload passed through for non-GET requests.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Whether the model asked for a cross-domain capable request.
    #[must_use]
    pub const fn use_cross_domain(&self) -> bool {
        self.use_cross_domain
    }

    /// Raw transport fields declared by the model.
    #[must_use]
    pub const fn raw_fields(&self) -> Option<&Map<String, Value>> {
        self.raw_fields.as_ref()
    }

    /// Unrecognized caller options carried through to the transport.
    #[must_use]
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    /// Returns `true` if a pre-send hook is attached.
    #[must_use]
    pub const fn has_before_send(&self) -> bool {
        self.before_send.is_some()
    }

    /// Sets a header, lower-casing its name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Merges headers, lower-casing names; later entries win on collision.
    pub fn merge_headers<'a>(&mut self, headers: impl IntoIterator<Item = (&'a String, &'a String)>) {
        for (name, value) in headers {
            self.set_header(name, value.clone());
        }
    }

    /// Runs the pre-send hook against an outgoing request.
    ///
    /// Returns the hook's result, or `None` when no hook is attached.
    pub fn run_before_send(&self, request: &mut OutgoingRequest) -> Option<Value> {
        self.before_send.as_ref().and_then(|hook| hook(request))
    }

    /// Builds the mutable request object a transport passes to the pre-send hook.
    #[must_use]
    pub fn outgoing(&self) -> OutgoingRequest {
        OutgoingRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            fields: Map::new(),
        }
    }
}

/// Transport-level request object exposed to pre-send hooks.
///
/// Hooks may add headers or raw fields before the request goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    /// HTTP verb.
    pub method: Method,
    /// Final URL.
    pub url: String,
    /// Headers, keyed by lower-case name.
    pub headers: HashMap<String, String>,
    /// Raw transport fields.
    pub fields: Map<String, Value>,
}

impl OutgoingRequest {
    /// Sets a header, lower-casing its name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }
}
