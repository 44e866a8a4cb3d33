//! # Data Source
//!
//! The remote reading-tracker API. The rest of the app only sees an opaque
//! request/response contract: hand a [`GqlRequest`] and a [`Credential`] to a
//! [`DataSource`] and get back the `data` object or a typed [`DataError`].
//!
//! ```text
//! Screen ──builds──▶ GqlRequest ──▶ Command (tokio task) ──▶ DataSource::query
//!                                                              │
//!                          CommandResult ◀── Result<Value, DataError>
//! ```
//!
//! Requests are built in [`queries`], response shapes live in [`types`].

pub mod client;
pub mod queries;
pub mod types;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::GraphqlClient;
pub use types::{
    Book, BookList, CoverHolder, Goal, Image, JournalEntry, ListBook, ReadingStatus, Review,
    StatusCount, Tag, User, UserBook, UserBookRead,
};

/// An API token. The `Debug` impl never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for the `Authorization` header. Tokens are accepted with or
    /// without the `Bearer ` prefix.
    pub fn header_value(&self) -> String {
        if self.0.starts_with("Bearer ") {
            self.0.clone()
        } else {
            format!("Bearer {}", self.0)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// A single GraphQL operation. Serializes to the standard POST body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GqlRequest {
    #[serde(rename = "operationName")]
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

/// Errors a data source call can resolve to.
/// Every variant is recoverable; none of them take the event loop down.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// The request did not finish within its time budget.
    Timeout,
    /// HTTP 429 from the API.
    RateLimited,
    /// The token was rejected (HTTP 401/403 or a GraphQL auth error).
    Unauthorized(String),
    /// Any other non-success response or GraphQL error.
    Server { status: u16, message: String },
    /// The response could not be decoded into the expected shape.
    Parse(String),
    /// Connection-level failure (DNS, refused, reset).
    Network(String),
}

impl DataError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DataError::Unauthorized(_))
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Timeout => write!(f, "request timed out"),
            DataError::RateLimited => write!(f, "rate limited, slow down"),
            DataError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            DataError::Server { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            DataError::Parse(msg) => write!(f, "parse error: {msg}"),
            DataError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the name of the data source (for logs).
    fn name(&self) -> &str;

    /// Runs one operation and returns its `data` object.
    async fn query(&self, credential: &Credential, request: &GqlRequest)
    -> Result<Value, DataError>;
}

/// Decodes `data[field]` into `T`. A missing field decodes as `null`.
pub fn extract<T: DeserializeOwned>(data: &Value, field: &str) -> Result<T, DataError> {
    let raw = data.get(field).cloned().unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(|e| DataError::Parse(format!("{field}: {e}")))
}
