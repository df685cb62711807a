//! Recorded responses and the replayed stand-in returned to callers

use std::io::{self, BufRead, Cursor, Read};

use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;

/// Status line of a recorded response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Numeric status code
    pub code: u16,
    /// Reason phrase exactly as the server sent it
    pub message: String,
}

/// One captured HTTP response: created once, replayed many times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// Status line
    pub status: Status,
    /// Response headers as observed on the live exchange
    pub headers: HeaderMap,
    /// Complete response body
    pub body: Vec<u8>,
}

impl RecordedResponse {
    /// Create a recorded response
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status: Status {
                code,
                message: message.into(),
            },
            headers,
            body,
        }
    }
}

/// Response stand-in synthesized from a [`RecordedResponse`].
///
/// Honors the real-response contract: separate status/reason accessors,
/// header introspection independent of read progress, and a sequential
/// body stream over the stored bytes ([`Read`] plus [`BufRead`] for
/// read-line consumers).
#[derive(Debug)]
pub struct ReplayedResponse {
    status: Status,
    headers: HeaderMap,
    length: Option<u64>,
    body: Cursor<Vec<u8>>,
    closed: bool,
}

impl ReplayedResponse {
    /// Synthesize a response from a recording.
    ///
    /// The body of a recording is already complete, so any
    /// `transfer-encoding` header is stripped; leaving it would make
    /// downstream readers treat the buffered body as chunked.
    #[must_use]
    pub fn new(recorded: RecordedResponse) -> Self {
        let mut headers = recorded.headers;
        headers.remove("transfer-encoding");

        let length = headers
            .get_joined("content-length")
            .and_then(|value| value.parse::<u64>().ok());

        Self {
            status: recorded.status,
            headers,
            length,
            body: Cursor::new(recorded.body),
            closed: false,
        }
    }

    /// Numeric status code
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.code
    }

    /// Numeric status code, under the alias some callers use
    #[must_use]
    pub fn code(&self) -> u16 {
        self.status.code
    }

    /// Reason phrase
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.status.message
    }

    /// Declared content length, when present and parsable
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.length
    }

    /// Header mapping with `transfer-encoding` already stripped
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// All headers flattened to name/value pairs, one pair per value
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Look up one header, joining repeated values with `", "`;
    /// returns `default` when the header is absent
    #[must_use]
    pub fn header(&self, name: &str, default: &str) -> String {
        self.headers
            .get_joined(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Mark the response closed. The body is fully buffered, so reads
    /// after close are not guarded.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// True once [`ReplayedResponse::close`] has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Read for ReplayedResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl BufRead for ReplayedResponse {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.body.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.body.consume(amt);
    }
}
