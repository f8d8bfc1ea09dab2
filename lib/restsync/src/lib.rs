//! Sync data models with a REST server.
//!
//! `restsync` turns a CRUD intent on a model (create, read, update, patch,
//! delete) into an HTTP request, sends it through a [`Transport`] and routes
//! the result to success, error and always callbacks. The request shape is
//! built by [`restsync_core`]; this crate adds a hyper-based default
//! transport with Tower middleware.
//!
//! # Example
//!
//! ```ignore
//! use restsync::prelude::*;
//! use serde_json::{Value, json};
//!
//! struct Todo {
//!     id: u64,
//!     title: String,
//! }
//!
//! impl Model for Todo {
//!     fn to_json(&self, _options: &SyncOptions) -> Value {
//!         json!({ "id": self.id, "title": self.title })
//!     }
//!
//!     fn url(&self) -> Option<String> {
//!         Some(format!("https://api.example.com/todos/{}", self.id))
//!     }
//! }
//!
//! let todo = Todo { id: 1, title: "milk".into() };
//! let handle = restsync::syncer().sync(
//!     CrudMethod::Update,
//!     Some(&todo),
//!     SyncOptions::new().on_success(|body, _response| println!("saved: {body:?}")),
//! )?;
//! ```

mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod transport;

pub use config::{TransportConfig, TransportConfigBuilder};
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use restsync_core::{
    AjaxConfig, AlwaysCallback, BeforeSend, Body, Callbacks, Completion, ContentType, CrudMethod,
    Error, ErrorCallback, METHOD_OVERRIDE_FIELD, METHOD_OVERRIDE_HEADER, MODEL_FIELD, Method,
    Model, Outcome, OutgoingRequest, RequestDescriptor, RequestHandle, ResolvedFlags, Response,
    ResponseBody, Result, SharedTransport, SuccessCallback, SyncConfig, SyncConfigBuilder,
    SyncEvent, SyncOptions, Syncer, Transport, TransportResult, append_query, from_json,
    parse_query_string, to_json, to_query_string,
};

pub use url;

/// A [`Syncer`] sending through a default [`HyperTransport`].
///
/// Requests are spawned onto the current Tokio runtime.
#[must_use]
pub fn syncer() -> Syncer {
    Syncer::new(HyperTransport::new())
}
