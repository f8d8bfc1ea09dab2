//! Core types and the request translator for restsync.
//!
//! This crate turns an abstract CRUD intent against a data model into a
//! concrete HTTP request for a pluggable transport:
//! - [`CrudMethod`] and [`Method`] - CRUD intents and HTTP verbs
//! - [`Syncer`] - the translator, bound to a default [`Transport`]
//! - [`SyncOptions`] and [`SyncConfig`] - per-call options and defaults
//! - [`Model`] and [`AjaxConfig`] - capabilities a synced model provides
//! - [`RequestDescriptor`] - the transport-ready request
//! - [`Outcome`] - the terminal result routed to the caller's callbacks
//! - [`Error`] and [`Result`] - Error handling
//! - [`to_query_string`] and [`parse_query_string`] - nested query-string codec

mod body;
mod config;
mod error;
mod method;
mod model;
mod options;
mod outcome;
pub mod prelude;
mod request;
mod response;
mod sync;
mod transport;

pub use body::{
    ContentType, append_query, from_json, parse_query_string, to_json, to_query_string,
};
pub use config::{SyncConfig, SyncConfigBuilder};
pub use error::{Error, Result};
pub use method::{CrudMethod, Method};
pub use model::{AjaxConfig, Model, SyncEvent};
pub use options::{ResolvedFlags, SyncOptions};
pub use outcome::{
    AlwaysCallback, Callbacks, ErrorCallback, Outcome, ResponseBody, SuccessCallback,
    TransportResult,
};
pub use request::{BeforeSend, Body, OutgoingRequest, RequestDescriptor};
pub use response::Response;
pub use sync::{METHOD_OVERRIDE_FIELD, METHOD_OVERRIDE_HEADER, MODEL_FIELD, Syncer};
pub use transport::{Completion, RequestHandle, SharedTransport, Transport};
