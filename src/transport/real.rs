//! Seam between the connection proxy and the real client connection

use std::io;
use std::time::Duration;

use crate::headers::HeaderMap;

/// A fully-read live response, as captured off the real connection.
///
/// The real connection owns all HTTP mechanics (status-line parsing,
/// chunked decoding, TLS); by the time a response crosses this seam it
/// is a plain record.
#[derive(Debug, Clone)]
pub struct LiveResponse {
    /// Numeric status code
    pub status: u16,
    /// Reason phrase
    pub reason: String,
    /// Response headers
    pub headers: HeaderMap,
    /// Complete response body
    pub body: Vec<u8>,
}

/// The real client connection a [`ConnectionProxy`] exclusively owns.
///
/// Mirrors the lifecycle of a low-level connection object: construct,
/// optionally tunnel, write one request, read one response, close.
/// Transport faults surface as [`io::Error`] and pass through the
/// interception layer unmodified.
///
/// [`ConnectionProxy`]: super::ConnectionProxy
pub trait RealConnection {
    /// Concrete socket type exposed through the sock accessor
    type Socket;

    /// Target host this connection was created for
    fn host(&self) -> &str;

    /// Target port this connection was created for
    fn port(&self) -> u16;

    /// Open the underlying transport
    ///
    /// # Errors
    ///
    /// Returns the transport's own connect fault
    fn connect(&mut self) -> io::Result<()>;

    /// Write one complete request
    ///
    /// # Errors
    ///
    /// Returns the transport's own write fault
    fn send_request(
        &mut self,
        method: &str,
        path: &str,
        body: &[u8],
        headers: &HeaderMap,
    ) -> io::Result<()>;

    /// Read the response to the last request, fully
    ///
    /// # Errors
    ///
    /// Returns the transport's own read fault
    fn read_response(&mut self) -> io::Result<LiveResponse>;

    /// Establish CONNECT tunneling through a forward proxy
    ///
    /// # Errors
    ///
    /// Returns the transport's own tunnel-setup fault
    fn set_tunnel(
        &mut self,
        host: &str,
        port: Option<u16>,
        headers: Option<&HeaderMap>,
    ) -> io::Result<()>;

    /// Close the connection; idempotent
    fn close(&mut self);

    /// The live socket, when one is open
    fn socket(&self) -> Option<&Self::Socket>;

    /// Allow or forbid implicit reconnection across response boundaries
    fn set_auto_reconnect(&mut self, enabled: bool);

    /// Configure the transport timeout
    fn set_timeout(&mut self, timeout: Option<Duration>);

    /// Configure the transport debug level
    fn set_debug_level(&mut self, level: u8);
}
