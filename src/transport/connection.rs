//! Connection proxy: the interception orchestrator
//!
//! Lifecycle mirrors a real connection object: fresh, accumulating once a
//! request has been started, awaiting-response after `end_headers`,
//! resolved once a response was obtained (the proxy is reusable for the
//! next request), closed. Each lifecycle call is routed either to local
//! bookkeeping or to the owned real connection; `get_response` is the
//! commit point where replay or live-forward is decided.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cassette::Cassette;
use crate::error::{Result, RewindError};
use crate::headers::{transform_proxy_headers, HeaderMap};
use crate::patch::Interception;
use crate::request::Request;
use crate::response::{RecordedResponse, ReplayedResponse};

use super::real::RealConnection;
use super::socket::{FakeSocket, ProxySocket};
use super::Protocol;

/// Tunnel target recorded by `set_tunnel` for https-through-proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelTarget {
    /// Host the proxy relays to
    pub host: String,
    /// Relay port; the protocol default when the caller gave none
    pub port: u16,
}

/// Stand-in for one real client connection.
///
/// Owns exactly one real connection, accumulates the in-flight request,
/// and at response-retrieval time consults the cassette to choose replay
/// over live-forward. Single-threaded: each instance backs exactly one
/// logical connection lifecycle.
pub struct ConnectionProxy<C, R> {
    protocol: Protocol,
    proxied: bool,
    tunnel: Option<TunnelTarget>,
    real: R,
    cassette: Arc<C>,
    patch: Arc<Interception>,
    request: Option<Request>,
}

impl<C: Cassette, R: RealConnection> ConnectionProxy<C, R> {
    /// Create a proxy, deriving proxy-awareness from the environment
    /// snapshot taken at first use.
    ///
    /// `build` constructs the real connection with the same arguments the
    /// caller would have passed; it runs with ambient interception
    /// suspended so the connection it produces is genuinely real.
    pub fn new(
        protocol: Protocol,
        cassette: Arc<C>,
        patch: Arc<Interception>,
        build: impl FnOnce() -> R,
    ) -> Self {
        let proxied = protocol.proxied_from_env();
        Self::with_proxied(protocol, proxied, cassette, patch, build)
    }

    /// Create a proxy with proxy-awareness stated explicitly, for callers
    /// that already know the topology
    pub fn with_proxied(
        protocol: Protocol,
        proxied: bool,
        cassette: Arc<C>,
        patch: Arc<Interception>,
        build: impl FnOnce() -> R,
    ) -> Self {
        let real = {
            let _suspend = patch.suspend();
            build()
        };

        Self {
            protocol,
            proxied,
            tunnel: None,
            real,
            cassette,
            patch,
            request: None,
        }
    }

    /// Protocol this proxy speaks
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// True when a forward proxy was designated for this scheme
    #[must_use]
    pub fn is_proxied(&self) -> bool {
        self.proxied
    }

    /// Tunnel target recorded by [`ConnectionProxy::set_tunnel`]
    #[must_use]
    pub fn tunnel(&self) -> Option<&TunnelTarget> {
        self.tunnel.as_ref()
    }

    /// The owned real connection
    #[must_use]
    pub fn real_connection(&self) -> &R {
        &self.real
    }

    /// Begin a new request in one shot: method, path, optional body,
    /// optional headers.
    ///
    /// Nothing is sent yet; the exchange is deferred until
    /// [`ConnectionProxy::get_response`] so the complete request can be
    /// compared against the cassette.
    ///
    /// # Panics
    ///
    /// Panics for an https request through a proxy before `set_tunnel`.
    pub fn request(
        &mut self,
        method: &str,
        path: &str,
        body: Option<&[u8]>,
        headers: Option<&HeaderMap>,
    ) {
        let uri = self.resolve_uri(path);
        let mut request = Request::new(method, uri);
        if let Some(headers) = headers {
            request.headers = transform_proxy_headers(headers);
        }
        if let Some(body) = body {
            request.replace_body(body.to_vec());
        }

        debug!("Got {}", request);
        self.request = Some(request);
    }

    /// Begin a new request to build up piece by piece, usually followed
    /// by [`ConnectionProxy::put_header`] calls
    ///
    /// # Panics
    ///
    /// Panics for an https request through a proxy before `set_tunnel`.
    pub fn put_request(&mut self, method: &str, path: &str) {
        let uri = self.resolve_uri(path);
        let request = Request::new(method, uri);

        debug!("Got {}", request);
        self.request = Some(request);
    }

    /// Merge one or more values for `name` into the in-progress request,
    /// extending the value list when the name repeats
    ///
    /// # Panics
    ///
    /// Panics when no request has been started.
    pub fn put_header(&mut self, name: &str, values: &[&str]) {
        let addition: HeaderMap = values.iter().map(|value| (name, *value)).collect();
        self.in_progress_mut()
            .headers
            .merge(transform_proxy_headers(&addition));
    }

    /// Append `chunk` to the in-progress request's body
    ///
    /// # Panics
    ///
    /// Panics when no request has been started.
    pub fn send(&mut self, chunk: &[u8]) {
        self.in_progress_mut().append_body(chunk);
    }

    /// Finish the header section. A supplied `message_body` replaces the
    /// accumulated body outright; `None` leaves it untouched.
    ///
    /// # Panics
    ///
    /// Panics when no request has been started.
    pub fn end_headers(&mut self, message_body: Option<&[u8]>) {
        let request = self.in_progress_mut();
        if let Some(body) = message_body {
            request.replace_body(body.to_vec());
        }
    }

    /// Open the underlying transport, unless the exchange will be served
    /// from a recording or the cassette forbids new traffic
    ///
    /// # Errors
    ///
    /// Returns the real transport's connect fault.
    pub fn connect(&mut self) -> Result<()> {
        if let Some(request) = &self.request {
            if self.cassette.can_play(request) {
                // A recording will satisfy this exchange; stay offline.
                return Ok(());
            }
        }

        if self.cassette.write_protected() {
            // Disallowed traffic never touches the network.
            return Ok(());
        }

        self.real.connect()?;
        Ok(())
    }

    /// Retrieve the response for the accumulated request: replay it from
    /// the cassette when possible, otherwise forward the exchange to the
    /// real server and persist the capture.
    ///
    /// # Errors
    ///
    /// Returns [`RewindError::CannotRecord`] when no recording matches
    /// and the cassette is write-protected, or the real transport's fault
    /// when forwarding fails.
    ///
    /// # Panics
    ///
    /// Panics when no request has been started.
    pub fn get_response(&mut self) -> Result<ReplayedResponse> {
        let request = self
            .request
            .as_ref()
            .expect("request lifecycle violated: get_response called before a request was started")
            .clone();

        if self.cassette.can_play(&request) {
            info!("Playing response for {} from cassette", request);
            let recorded = self.cassette.play(&request);
            return Ok(ReplayedResponse::new(recorded));
        }

        if self.cassette.write_protected() && self.cassette.filter(&request) {
            return Err(RewindError::CannotRecord {
                request: request.to_string(),
                cassette: self.cassette.identity().to_string(),
                record_mode: self.cassette.record_mode(),
            });
        }

        info!("{} not in cassette, sending to real server", request);
        let live = {
            let _suspend = self.patch.suspend();
            let path = self.relative_path(&request.uri);
            self.real
                .send_request(&request.method, &path, &request.body, &request.headers)?;
            self.real.read_response()?
        };

        if self.proxied {
            // Proxy connections are not safely reusable across response
            // boundaries.
            self.real.set_auto_reconnect(false);
        }

        let recorded = RecordedResponse::new(
            live.status,
            live.reason,
            transform_proxy_headers(&live.headers),
            live.body,
        );
        self.cassette.append(&request, &recorded);
        Ok(ReplayedResponse::new(recorded))
    }

    /// Set up CONNECT tunneling for https proxying and forward the setup
    /// to the real connection
    ///
    /// # Errors
    ///
    /// Returns the real transport's tunnel-setup fault.
    ///
    /// # Panics
    ///
    /// Panics when no proxy was designated for this scheme; the tunnel
    /// target would never be read.
    pub fn set_tunnel(
        &mut self,
        host: &str,
        port: Option<u16>,
        headers: Option<&HeaderMap>,
    ) -> Result<()> {
        assert!(
            self.proxied,
            "set_tunnel called without the {}_proxy environment variable being set",
            self.protocol.scheme()
        );

        self.tunnel = Some(TunnelTarget {
            host: host.to_string(),
            port: port.unwrap_or(self.protocol.default_port()),
        });

        self.real.set_tunnel(host, port, headers)?;
        Ok(())
    }

    /// Forward the transport timeout to the real connection
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.real.set_timeout(timeout);
    }

    /// Forward the transport debug level to the real connection
    pub fn set_debug_level(&mut self, level: u8) {
        self.real.set_debug_level(level);
    }

    /// The socket upper layers should see: the live one when open, absent
    /// when proxied with nothing open (upstream pools key on that to
    /// re-issue tunnel setup), a [`FakeSocket`] otherwise
    #[must_use]
    pub fn sock(&self) -> Option<ProxySocket<'_, R::Socket>> {
        if let Some(socket) = self.real.socket() {
            return Some(ProxySocket::Live(socket));
        }
        if self.proxied {
            return None;
        }
        Some(ProxySocket::Fake(FakeSocket))
    }

    /// Close the owned real connection; it is idempotent about being
    /// already closed
    pub fn close(&mut self) {
        self.real.close();
    }

    fn in_progress_mut(&mut self) -> &mut Request {
        self.request
            .as_mut()
            .expect("request lifecycle violated: no request has been started")
    }

    /// Resolve a request path to its absolute URI
    fn resolve_uri(&self, path: &str) -> String {
        if self.proxied && self.tunnel.is_none() {
            // Proxies require absolute-form requests, so without connect
            // tunneling the http path is already absolute.
            assert!(
                self.protocol == Protocol::HTTP,
                "an https request through a proxy requires set_tunnel before the request is issued"
            );
            return path.to_string();
        }

        let (host, port) = match &self.tunnel {
            Some(tunnel) => (tunnel.host.as_str(), tunnel.port),
            None => (self.real.host(), self.real.port()),
        };

        format!(
            "{}://{}{}{}",
            self.protocol.scheme(),
            host,
            self.port_postfix(port),
            path
        )
    }

    /// Strip the real connection's own prefix once from the left,
    /// recovering the selector path to replay against it
    fn relative_path(&self, uri: &str) -> String {
        let prefix = format!(
            "{}://{}{}",
            self.protocol.scheme(),
            self.real.host(),
            self.port_postfix(self.real.port())
        );
        uri.strip_prefix(&prefix).unwrap_or(uri).to_string()
    }

    /// Empty for the protocol's default port, `:port` otherwise
    fn port_postfix(&self, port: u16) -> String {
        if port == self.protocol.default_port() {
            String::new()
        } else {
            format!(":{port}")
        }
    }
}
