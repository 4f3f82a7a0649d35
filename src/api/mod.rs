//! REST transport and typed endpoint wrappers.
//!
//! The [`Transport`] trait is the seam between the typed API and the wire.
//! [`HttpTransport`] talks to the real backend with `reqwest`; tests swap in
//! a mock.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub mod client;
pub mod http;
pub mod list;

pub use client::{AccessTokenSource, KanbanApi};
pub use http::HttpTransport;

/// HTTP verbs used by the kanban API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// A successful response. `body` is `None` for empty responses (204)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

/// Failure of a single request, split by where it failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// A response arrived with an error status
    #[error("Server rejected request with status {status}")]
    Rejected { status: u16, body: Option<Value> },

    /// The request was sent but no response came back
    #[error("No response from server: {0}")]
    Unreachable(String),

    /// The request could not be built locally
    #[error("{0}")]
    Request(String),
}

impl TransportError {
    /// The non-empty `detail` message of a structured error body, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                body: Some(body), ..
            } => body
                .get("detail")
                .and_then(Value::as_str)
                .filter(|detail| !detail.trim().is_empty()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Sends one request and returns the raw response
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
