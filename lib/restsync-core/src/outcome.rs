//! Terminal result of a sync call and its delivery to caller callbacks.
//!
//! The transport reports back exactly once. That report is folded into a
//! single [`Outcome`], which [`Callbacks::dispatch`] then routes: `error` or
//! `success` first, `always` last. `always` fires exactly once per outcome.

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ContentType, Error, Response};

/// Callback fired with the decoded body of a successful response.
pub type SuccessCallback = Box<dyn FnOnce(ResponseBody, &Response) + Send>;

/// Callback fired with the response (if any) and a human-readable message.
pub type ErrorCallback = Box<dyn FnOnce(Option<&Response>, &str) + Send>;

/// Callback fired once after every call, whatever the outcome.
pub type AlwaysCallback = Box<dyn FnOnce(&Outcome) + Send>;

/// What a transport reports for one request.
pub type TransportResult = std::result::Result<Response, Error>;

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Textual body left as-is.
    Text(String),
    /// Non-UTF-8 body.
    Binary(Bytes),
}

impl ResponseBody {
    /// Parsed JSON, if the body was decoded as JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Terminal result of one sync call.
#[derive(Debug)]
pub enum Outcome {
    /// Status below 400 and a body that decoded as expected.
    Success {
        /// The transport's response.
        response: Response,
        /// Decoded body.
        body: ResponseBody,
    },
    /// The transport failed before producing a response.
    NetworkError {
        /// Transport-reported error.
        error: Error,
    },
    /// The server answered with a status of 400 or above.
    HttpError {
        /// The transport's response.
        response: Response,
    },
    /// A JSON body was expected but did not parse.
    DecodeError {
        /// The transport's response, holding the raw body.
        response: Response,
        /// The parse failure.
        error: Error,
    },
}

impl Outcome {
    /// Folds a transport report into an outcome.
    ///
    /// Successful textual bodies are parsed as JSON when `accept` is absent
    /// or starts with `application/json`. An empty body (a `204`, or a `200`
    /// with nothing in it) is never parsed and counts as a success carrying
    /// [`ResponseBody::Text`] with an empty string.
    #[must_use]
    pub fn resolve(result: TransportResult, accept: Option<&str>) -> Self {
        let response = match result {
            Ok(response) => response,
            Err(error) => return Self::NetworkError { error },
        };

        if response.is_error() {
            return Self::HttpError { response };
        }

        let Some(text) = response.text() else {
            let body = ResponseBody::Binary(response.body().clone());
            return Self::Success { response, body };
        };

        let wants_json = accept.is_none_or(|accept| accept.starts_with(ContentType::Json.as_str()));
        if !wants_json || text.is_empty() {
            let body = ResponseBody::Text(text.to_string());
            return Self::Success { response, body };
        }

        match crate::from_json::<Value>(response.body()) {
            Ok(value) => Self::Success {
                response,
                body: ResponseBody::Json(value),
            },
            Err(error) => Self::DecodeError { response, error },
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// `"success"` or `"error"`.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        if self.is_success() { "success" } else { "error" }
    }

    /// The transport's response, absent for network errors.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        match self {
            Self::Success { response, .. }
            | Self::HttpError { response }
            | Self::DecodeError { response, .. } => Some(response),
            Self::NetworkError { .. } => None,
        }
    }

    /// The transport or decode error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::NetworkError { error } | Self::DecodeError { error, .. } => Some(error),
            Self::Success { .. } | Self::HttpError { .. } => None,
        }
    }

    /// The body exactly as the transport delivered it.
    #[must_use]
    pub fn raw_body(&self) -> Bytes {
        self.response()
            .map(|response| response.body().clone())
            .unwrap_or_default()
    }

    /// Message handed to the error callback; `None` on success.
    ///
    /// HTTP errors use the raw body when non-empty, else `HTTP<status>`.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::NetworkError { error } | Self::DecodeError { error, .. } => {
                Some(error.to_string())
            }
            Self::HttpError { response } => {
                let body = response.body();
                if body.is_empty() {
                    Some(format!("HTTP{}", response.status()))
                } else {
                    Some(String::from_utf8_lossy(body).into_owned())
                }
            }
        }
    }
}

/// Caller callbacks for one sync call.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) success: Option<SuccessCallback>,
    pub(crate) error: Option<ErrorCallback>,
    pub(crate) always: Option<AlwaysCallback>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("always", &self.always.is_some())
            .finish()
    }
}

impl Callbacks {
    /// Delivers an outcome: `success` or `error` first, then `always`.
    pub fn dispatch(self, outcome: &Outcome) {
        match outcome {
            Outcome::Success { response, body } => {
                debug!(status = response.status(), "sync request succeeded");
                if let Some(success) = self.success {
                    success(body.clone(), response);
                }
            }
            failure => {
                let message = failure.error_message().unwrap_or_default();
                warn!(
                    status = failure.response().map(Response::status),
                    message = %message,
                    "sync request failed"
                );
                if let Some(error) = self.error {
                    error(failure.response(), &message);
                }
            }
        }

        if let Some(always) = self.always {
            always(outcome);
        }
    }
}
