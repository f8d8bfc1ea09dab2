//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use restsync_core::prelude::*;
//! ```

pub use crate::{
    AjaxConfig, Body, CrudMethod, Error, Method, Model, Outcome, RequestDescriptor,
    RequestHandle, Response, ResponseBody, Result, SyncConfig, SyncEvent, SyncOptions, Syncer,
    Transport,
};
