//! Default transport using hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use restsync_core::{
    Body, Completion, ContentType, Error, RequestDescriptor, RequestHandle, Response, Result,
    Transport, to_json,
};
use serde_json::Value;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{TransportConfig, TransportConfigBuilder},
    connector::https_connector,
    middleware::LoggingLayer,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<RequestDescriptor, Response, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Makes a `BoxedService` shareable across threads.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: RequestDescriptor) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Client
// ============================================================================

/// Hyper client turning descriptors into wire requests.
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
}

impl RawHyperClient {
    fn new(config: TransportConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new()).build(https_connector());
        Self { inner, config }
    }

    /// Build a hyper request, running the descriptor's pre-send hook first.
    fn build_hyper_request(&self, descriptor: &RequestDescriptor) -> Result<http::Request<Full<Bytes>>> {
        let mut outgoing = descriptor.outgoing();
        if let Some(result) = descriptor.run_before_send(&mut outgoing) {
            debug!(%result, "pre-send hook returned a value");
        }
        if descriptor.use_cross_domain() {
            debug!("cross-domain flag has no effect outside a browser");
        }
        if !outgoing.fields.is_empty() {
            debug!(
                fields = ?outgoing.fields.keys().collect::<Vec<_>>(),
                "raw transport fields are not interpreted"
            );
        }

        let url = self.config.resolve_url(&outgoing.url)?;
        let (payload, content_type) = encode_payload(descriptor)?;

        let mut builder = http::Request::builder()
            .method(http::Method::from(outgoing.method))
            .uri(url.as_str());

        for (name, value) in &outgoing.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = content_type
            && !outgoing.headers.contains_key("content-type")
        {
            builder = builder.header("content-type", content_type.as_str());
        }
        if let Some(user_agent) = &self.config.user_agent
            && !outgoing.headers.contains_key("user-agent")
        {
            builder = builder.header("user-agent", user_agent.as_str());
        }

        builder
            .body(payload.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Extract response headers as a `HashMap`.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn execute(&self, descriptor: RequestDescriptor) -> Result<Response> {
        let hyper_request = self.build_hyper_request(&descriptor)?;

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

/// Picks the wire payload: the body when present and non-empty, else `data`.
fn encode_payload(descriptor: &RequestDescriptor) -> Result<(Option<Bytes>, Option<ContentType>)> {
    match descriptor.body() {
        Some(Body::Json(value)) => return Ok((Some(to_json(value)?), Some(ContentType::Json))),
        Some(Body::Form(encoded)) if !encoded.is_empty() => {
            return Ok((
                Some(Bytes::from(encoded.clone())),
                Some(ContentType::FormUrlEncoded),
            ));
        }
        _ => {}
    }

    match descriptor.data() {
        None | Some(Value::Null) => Ok((None, None)),
        Some(Value::String(raw)) => Ok((Some(Bytes::from(raw.clone())), None)),
        Some(other) => Ok((Some(to_json(other)?), Some(ContentType::Json))),
    }
}

impl Service<RequestDescriptor> for RawHyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RequestDescriptor) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Transport
// ============================================================================

/// Default [`Transport`]: hyper-util with TLS and Tower middleware.
///
/// Each request runs on a task spawned onto the current Tokio runtime; the
/// returned handle aborts that task when cancelled. An aborted request never
/// reports back.
///
/// # Example
///
/// ```ignore
/// use restsync::{HyperTransport, Syncer};
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .base_url("https://api.example.com/".parse()?)
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// let syncer = Syncer::new(transport);
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a new transport with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let raw = RawHyperClient::new(config.clone());
        Self::with_service(BoxCloneService::new(raw), config)
    }

    /// Create a transport with a pre-configured service (used by builder).
    fn with_service(service: BoxedService, config: TransportConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send a descriptor and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid URLs, connection failures and timeouts.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Response> {
        self.service.call(request).await
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: RequestDescriptor, on_complete: Completion) -> RequestHandle {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(url = %request.url(), "no Tokio runtime to drive the request");
            on_complete(Err(Error::invalid_request(
                "no Tokio runtime available to send the request",
            )));
            return RequestHandle::new();
        };

        let response = self.service.call(request);
        let task = runtime.spawn(async move {
            on_complete(response.await);
        });

        let abort = task.abort_handle();
        RequestHandle::with_cancel(move || abort.abort())
    }
}

// ============================================================================
// Tower Service Implementation
// ============================================================================

impl Service<RequestDescriptor> for HyperTransport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RequestDescriptor) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperTransport`].
#[derive(Default)]
pub struct HyperTransportBuilder {
    config: TransportConfigBuilder,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
    use_defaults: bool,
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .field("use_defaults", &self.use_defaults)
            .finish()
    }
}

impl HyperTransportBuilder {
    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the base URL for relative request URLs.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set the default `User-Agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer to the transport.
    ///
    /// Layers are applied in order: first added = innermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<RequestDescriptor, Response = Response, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<RequestDescriptor>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Enable default middleware (request logging).
    ///
    /// Defaults are applied before any layers added via `.layer()`.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.use_defaults = true;
        self
    }

    /// Disable all default middleware.
    #[must_use]
    pub fn without_defaults(mut self) -> Self {
        self.use_defaults = false;
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the transport with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperTransport {
        let config = self.config.build();
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new(config.clone()));

        if self.use_defaults {
            service = BoxCloneService::new(LoggingLayer::new().layer(service));
        }

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperTransport::with_service(service, config)
    }
}
