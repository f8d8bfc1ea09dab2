//! Sync request logging.
//!
//! Every request gets a `sync_request` span carrying the verb on the wire,
//! the verb it stands for when tunnelled through POST, the URL (query
//! included) and the kind of payload. The outcome is logged inside that
//! span.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use restsync_core::{Body, Error, METHOD_OVERRIDE_HEADER, RequestDescriptor, Response, Result};
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

/// How much of each request is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Verb, URL, payload kind, status and timing.
    #[default]
    Summary,
    /// Also headers and extension keys, at debug level.
    Headers,
}

/// Layer adding [`Logging`] around a transport service.
///
/// # Example
///
/// ```ignore
/// use restsync::{HyperTransport, middleware::LoggingLayer};
///
/// let transport = HyperTransport::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    verbosity: Verbosity,
}

impl LoggingLayer {
    /// Summary logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logging that includes headers.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            verbosity: Verbosity::Headers,
        }
    }

    /// The configured verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            verbosity: self.verbosity,
        }
    }
}

/// Service logging each descriptor and what came back for it.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    verbosity: Verbosity,
}

impl<S> Logging<S> {
    /// Wraps `inner` with summary logging.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            verbosity: Verbosity::Summary,
        }
    }
}

/// Payload the transport will put on the wire: body first, then `data`.
fn payload_kind(request: &RequestDescriptor) -> &'static str {
    match request.body() {
        Some(Body::Json(_)) => "json",
        Some(Body::Form(encoded)) if !encoded.is_empty() => "form",
        _ if request.data().is_some_and(|data| !data.is_null()) => "data",
        _ => "none",
    }
}

fn error_kind(error: &Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connection() {
        "connection"
    } else {
        "other"
    }
}

impl<S> Service<RequestDescriptor> for Logging<S>
where
    S: Service<RequestDescriptor, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: RequestDescriptor) -> Self::Future {
        let verb = request.method();
        let tunnelled = request.header(METHOD_OVERRIDE_HEADER).unwrap_or_default();
        let payload = payload_kind(&request);

        let span = span!(
            Level::INFO,
            "sync_request",
            %verb,
            tunnelled,
            url = %request.url(),
            payload,
        );

        if self.verbosity == Verbosity::Headers {
            span.in_scope(|| {
                debug!(
                    headers = ?request.headers(),
                    extensions = ?request.extensions().keys().collect::<Vec<_>>(),
                    pre_send_hook = request.has_before_send(),
                    "request details"
                );
            });
        }

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();
                info!("sending");

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_error() => {
                        let status = response.status();
                        let bytes = response.body().len();
                        warn!(status, bytes, elapsed_ms, "server rejected request");
                    }
                    Ok(response) => {
                        let status = response.status();
                        let bytes = response.body().len();
                        info!(status, bytes, elapsed_ms, "completed");
                    }
                    Err(err) => {
                        let kind = error_kind(err);
                        warn!(error = %err, kind, elapsed_ms, "transport failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
