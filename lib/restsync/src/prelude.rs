//! Prelude module for convenient imports.
//!
//! ```ignore
//! use restsync::prelude::*;
//! ```

pub use crate::{
    AjaxConfig, Body, CrudMethod, Error, HyperTransport, Method, Model, Outcome,
    RequestDescriptor, RequestHandle, Response, ResponseBody, Result, SyncConfig, SyncEvent,
    SyncOptions, Syncer, Transport, TransportConfig,
};
