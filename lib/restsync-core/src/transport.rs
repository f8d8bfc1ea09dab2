//! Transport boundary.
//!
//! A [`Transport`] performs the actual I/O. It must return a
//! [`RequestHandle`] without blocking and call the completion exactly once,
//! from whatever thread or task it likes.

use std::fmt;
use std::sync::Arc;

use crate::{RequestDescriptor, TransportResult};

/// Completion a transport calls once with the request's result.
pub type Completion = Box<dyn FnOnce(TransportResult) + Send>;

/// Executes request descriptors.
pub trait Transport: Send + Sync {
    /// Start sending `request`; report back through `on_complete`.
    fn send(&self, request: RequestDescriptor, on_complete: Completion) -> RequestHandle;
}

impl<F> Transport for F
where
    F: Fn(RequestDescriptor, Completion) -> RequestHandle + Send + Sync,
{
    fn send(&self, request: RequestDescriptor, on_complete: Completion) -> RequestHandle {
        self(request, on_complete)
    }
}

/// Shared, type-erased transport.
pub type SharedTransport = Arc<dyn Transport>;

/// Handle for an in-flight request.
///
/// Cancellation is whatever the transport supplies; the translator only
/// attaches the final descriptor for inspection.
#[derive(Default)]
pub struct RequestHandle {
    cancel: Option<Box<dyn Fn() + Send + Sync>>,
    descriptor: Option<RequestDescriptor>,
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("cancellable", &self.cancel.is_some())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl RequestHandle {
    /// A handle with no cancellation support.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle whose cancellation runs `cancel`.
    #[must_use]
    pub fn with_cancel(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
            descriptor: None,
        }
    }

    /// Returns `true` if the transport supplied cancellation.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        self.cancel.is_some()
    }

    /// Cancels the request, if the transport supports it.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.cancel {
            cancel();
        }
    }

    /// The descriptor that was handed to the transport.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&RequestDescriptor> {
        self.descriptor.as_ref()
    }

    pub(crate) fn attach_descriptor(&mut self, descriptor: RequestDescriptor) {
        self.descriptor = Some(descriptor);
    }
}
