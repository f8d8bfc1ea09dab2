//! Tower middleware for the default transport.
//!
//! Layers wrap a `Service<RequestDescriptor, Response = Response, Error = Error>`
//! and are attached with [`HyperTransportBuilder::layer`]. The first layer
//! added is the innermost.
//!
//! [`HyperTransportBuilder::layer`]: crate::HyperTransportBuilder::layer
//!
//! # Example
//!
//! ```ignore
//! use restsync::HyperTransport;
//! use restsync::middleware::{LoggingLayer, ServiceBuilder};
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{Logging, LoggingLayer, Verbosity};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
