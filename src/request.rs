//! Request model accumulated by the connection proxy

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;

/// One outbound HTTP request, built incrementally across lifecycle calls.
///
/// Mutable while the connection proxy accumulates it; logically immutable
/// once handed to the cassette for matching or persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method
    pub method: String,
    /// Absolute request URI
    pub uri: String,
    /// Request body; empty when the request carries none
    pub body: Vec<u8>,
    /// Request headers, already normalized for proxy topology
    pub headers: HeaderMap,
}

impl Request {
    /// Create a request with the given method and absolute URI
    #[must_use]
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            body: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Concatenate `chunk` onto the body, establishing it if absent
    pub fn append_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    /// Replace the body outright
    pub fn replace_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}
