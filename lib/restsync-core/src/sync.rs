//! The CRUD-to-HTTP request translator.
//!
//! [`Syncer::sync`] turns a [`CrudMethod`] against an optional [`Model`]
//! into a [`RequestDescriptor`], hands it to a [`Transport`] and routes the
//! transport's report back into the caller's callbacks.
//!
//! The order of the build steps matters:
//!
//! 1. a GET payload is moved into the query string before anything else
//!    looks at the body;
//! 2. JSON emulation wraps the body under `model` before HTTP emulation,
//!    so the `_method` marker lands in the same wrapped payload;
//! 3. the wrapped payload is form-encoded only after HTTP emulation;
//! 4. model headers are merged last and win over emulation and caller
//!    headers.
//!
//! # Example
//!
//! ```
//! use restsync_core::{
//!     Completion, CrudMethod, RequestDescriptor, RequestHandle, SyncOptions, Syncer,
//! };
//! use serde_json::json;
//!
//! let syncer = Syncer::new(|request: RequestDescriptor, _done: Completion| {
//!     assert_eq!(request.url(), "/todos?page=2");
//!     RequestHandle::new()
//! });
//!
//! let options = SyncOptions::new().url("/todos").data(json!({"page": 2}));
//! let handle = syncer
//!     .sync(CrudMethod::Read, None, options)
//!     .expect("url is set");
//! assert_eq!(handle.descriptor().map(|d| d.url()), Some("/todos?page=2"));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    AjaxConfig, BeforeSend, Body, Completion, ContentType, CrudMethod, Error, Method, Model,
    Outcome, OutgoingRequest, RequestDescriptor, RequestHandle, ResolvedFlags, Result,
    SharedTransport, SyncConfig, SyncEvent, SyncOptions, Transport, TransportResult,
    append_query, to_query_string,
};

/// Header carrying the true verb when it is tunnelled through POST.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Form field carrying the true verb when both emulations are on.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Form field wrapping the JSON payload under JSON emulation.
pub const MODEL_FIELD: &str = "model";

/// Caller extras that would shadow computed descriptor fields.
const RESERVED_FIELDS: &[&str] = &[
    "method",
    "url",
    "headers",
    "body",
    "data",
    "use_cross_domain",
    "raw_fields",
    "before_send",
];

/// Translates CRUD intents into requests on a transport.
#[derive(Clone)]
pub struct Syncer {
    transport: SharedTransport,
    config: SyncConfig,
}

impl fmt::Debug for Syncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syncer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Syncer {
    /// Create a syncer on `transport` with default configuration.
    #[must_use]
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_shared(Arc::new(transport))
    }

    /// Create a syncer on an already shared transport.
    #[must_use]
    pub fn with_shared(transport: SharedTransport) -> Self {
        Self {
            transport,
            config: SyncConfig::default(),
        }
    }

    /// Replace the defaults applied to unset options.
    #[must_use]
    pub const fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the syncer configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Build the request for `method`, send it, and return the transport's handle.
    ///
    /// The handle carries a copy of the final descriptor. Network errors,
    /// error statuses and undecodable bodies are reported through the
    /// callbacks in `options`, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingUrl`] when neither the options nor the model
    /// provide a URL. The transport is not called in that case.
    pub fn sync(
        &self,
        method: CrudMethod,
        model: Option<&dyn Model>,
        mut options: SyncOptions,
    ) -> Result<RequestHandle> {
        let flags = options.resolve(&self.config);
        let transport = options
            .take_transport()
            .unwrap_or_else(|| Arc::clone(&self.transport));
        let callbacks = options.take_callbacks();

        let descriptor = build_descriptor(method, model, &options, flags)?;
        debug!(
            crud = %method,
            method = %descriptor.method(),
            url = %descriptor.url(),
            emulate_http = flags.emulate_http,
            emulate_json = flags.emulate_json,
            "dispatching sync request"
        );

        let accept = descriptor.header("accept").map(str::to_owned);
        let on_complete: Completion = Box::new(move |result: TransportResult| {
            let outcome = Outcome::resolve(result, accept.as_deref());
            callbacks.dispatch(&outcome);
        });

        let mut handle = transport.send(descriptor.clone(), on_complete);

        if let Some(model) = model {
            model.emit(&SyncEvent::Request {
                handle: &handle,
                options: &options,
                descriptor: &descriptor,
            });
        }

        handle.attach_descriptor(descriptor);
        Ok(handle)
    }
}

fn build_descriptor(
    method: CrudMethod,
    model: Option<&dyn Model>,
    options: &SyncOptions,
    flags: ResolvedFlags,
) -> Result<RequestDescriptor> {
    let verb = method.verb();
    let mut url = resolve_url(model, options)?;

    // A `null` payload counts as no payload.
    let mut data = options.data_value().filter(|data| !data.is_null()).cloned();

    let mut json = match model {
        Some(model) if data.is_none() && method.carries_body() => Some(
            options
                .attrs_value()
                .cloned()
                .unwrap_or_else(|| model.to_json(options)),
        ),
        _ => None,
    };

    if verb == Method::Get
        && let Some(payload) = data.take()
    {
        url = append_query(&url, &to_query_string(&payload)?);
    }

    let mut descriptor = RequestDescriptor::new(verb, url);
    descriptor.data = data;

    let mut form = None;
    if flags.emulate_json {
        descriptor.set_header("content-type", ContentType::FormUrlEncoded.as_str());
        let mut fields = Map::new();
        if let Some(json) = json.take() {
            fields.insert(MODEL_FIELD.to_string(), json);
        }
        form = Some(fields);
    }

    if flags.emulate_http && verb.needs_override() {
        descriptor.method = Method::Post;
        if let Some(fields) = form.as_mut() {
            fields.insert(
                METHOD_OVERRIDE_FIELD.to_string(),
                Value::String(verb.as_str().to_string()),
            );
        }
        descriptor.set_header(METHOD_OVERRIDE_HEADER, verb.as_str());
    }

    descriptor.body = match form {
        Some(fields) => Some(Body::Form(to_query_string(&Value::Object(fields))?)),
        None => json.map(Body::Json),
    };

    descriptor.merge_headers(options.headers());

    let ajax = model.map(|model| model.ajax_config()).unwrap_or_default();
    apply_ajax_config(&mut descriptor, ajax);

    for (name, value) in options.extras() {
        if RESERVED_FIELDS.contains(&name.as_str()) {
            debug!(field = %name, "ignoring extra option shadowing a computed field");
            continue;
        }
        descriptor.extensions.insert(name.clone(), value.clone());
    }

    Ok(descriptor)
}

fn resolve_url(model: Option<&dyn Model>, options: &SyncOptions) -> Result<String> {
    let url = options
        .url_value()
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .or_else(|| model.and_then(|model| model.url()).filter(|url| !url.is_empty()));

    url.ok_or_else(|| {
        warn!("sync request has no URL");
        Error::MissingUrl
    })
}

fn apply_ajax_config(descriptor: &mut RequestDescriptor, ajax: AjaxConfig) {
    let AjaxConfig {
        headers,
        use_cross_domain,
        raw_fields,
        before_send,
    } = ajax;

    descriptor.merge_headers(&headers);

    if use_cross_domain {
        descriptor.use_cross_domain = true;
    }

    descriptor.before_send = match &raw_fields {
        Some(fields) => Some(chain_raw_fields(fields.clone(), before_send)),
        None => before_send,
    };
    descriptor.raw_fields = raw_fields;
}

/// Wraps `hook` so raw fields are applied to the request before it runs.
fn chain_raw_fields(fields: Map<String, Value>, hook: Option<BeforeSend>) -> BeforeSend {
    Arc::new(move |request: &mut OutgoingRequest| {
        request
            .fields
            .extend(fields.iter().map(|(name, value)| (name.clone(), value.clone())));
        hook.as_ref().and_then(|hook| hook(request))
    })
}
