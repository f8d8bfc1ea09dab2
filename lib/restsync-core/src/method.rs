//! CRUD intents and the HTTP verbs they map to.

use std::str::FromStr;

use derive_more::Display;

/// HTTP request method emitted by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
}

impl Method {
    /// Returns `true` if legacy servers need this verb tunnelled through POST.
    #[must_use]
    pub const fn needs_override(&self) -> bool {
        matches!(self, Self::Put | Self::Delete | Self::Patch)
    }

    /// The verb as an upper-case string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
        }
    }
}

/// Abstract data operation requested against a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CrudMethod {
    /// Persist a new model.
    #[display("create")]
    Create,
    /// Fetch a model or collection.
    #[display("read")]
    Read,
    /// Replace a model.
    #[display("update")]
    Update,
    /// Partially update a model.
    #[display("patch")]
    Patch,
    /// Remove a model.
    #[display("delete")]
    Delete,
}

impl CrudMethod {
    /// The HTTP verb for this operation.
    #[must_use]
    pub const fn verb(&self) -> Method {
        match self {
            Self::Create => Method::Post,
            Self::Read => Method::Get,
            Self::Update => Method::Put,
            Self::Patch => Method::Patch,
            Self::Delete => Method::Delete,
        }
    }

    /// Returns `true` for writes whose body is derived from the model.
    #[must_use]
    pub const fn carries_body(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Patch)
    }
}

impl FromStr for CrudMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            other => Err(crate::Error::UnknownMethod(other.to_string())),
        }
    }
}
