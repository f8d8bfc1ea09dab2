//! Body serialization utilities.
//!
//! Query strings use the bracketed `qs` conventions through `serde_qs`:
//! nested objects become `a[b]=c` and arrays use explicit indices (`a[0]=x`).

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::Result;

/// Nesting depth accepted when decoding query strings.
const QUERY_MAX_DEPTH: usize = 5;

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use restsync_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "user.address.city").
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Encode a JSON payload as a nested query string.
///
/// Objects nest as `a[b]=c` and arrays as `a[0]=x`, in the payload's key
/// order. `null` leaves encode as `key=`. A top-level array is keyed by
/// index and a scalar root encodes to an empty string.
///
/// # Errors
///
/// Returns an error if the payload cannot be represented as a query string.
///
/// # Example
///
/// ```
/// use restsync_core::{parse_query_string, to_query_string};
/// use serde_json::json;
///
/// let payload = json!({"q": "rust lang", "filter": {"tag": ["a", "b"]}});
/// let query = to_query_string(&payload).expect("encode");
/// assert!(query.starts_with("q=rust"));
/// assert_eq!(parse_query_string(&query).expect("decode"), payload);
/// ```
pub fn to_query_string(value: &Value) -> Result<String> {
    let root: Map<String, Value> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), blank_nulls(v))).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| (index.to_string(), blank_nulls(v)))
            .collect(),
        _ => return Ok(String::new()),
    };
    serde_qs::to_string(&root).map_err(Into::into)
}

fn blank_nulls(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), blank_nulls(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(blank_nulls).collect()),
        other => other.clone(),
    }
}

/// Decode a nested query string into JSON.
///
/// Leaves always decode to strings: `n=1` gives `{"n": "1"}`. Both literal
/// and percent-encoded brackets are accepted.
///
/// # Errors
///
/// Returns an error if the query string is malformed.
///
/// # Example
///
/// ```
/// use restsync_core::parse_query_string;
/// use serde_json::json;
///
/// let value = parse_query_string("model%5Bname%5D=Alice&_method=PUT").expect("decode");
/// assert_eq!(value, json!({"model": {"name": "Alice"}, "_method": "PUT"}));
/// ```
pub fn parse_query_string(query: &str) -> Result<Value> {
    // Non-strict mode reads `%5B`/`%5D` as brackets.
    serde_qs::Config::new(QUERY_MAX_DEPTH, false)
        .deserialize_str(query)
        .map_err(Into::into)
}

/// Append an encoded query string to a URL, joining with `&` when the URL
/// already carries a `?`.
#[must_use]
pub fn append_query(url: &str, query: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}
