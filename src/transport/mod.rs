//! Transport interception layer
//!
//! A [`ConnectionProxy`] stands in for one real client connection,
//! accumulates the in-flight request across incremental lifecycle calls,
//! and at response-retrieval time either replays a recording or forwards
//! the exchange to the real server.

mod connection;
mod real;
mod socket;

pub use connection::{ConnectionProxy, TunnelTarget};
pub use real::{LiveResponse, RealConnection};
pub use socket::{FakeSocket, ProxySocket};

use std::collections::HashSet;
use std::env;

use once_cell::sync::Lazy;

/// Protocol descriptor shared by the http and https proxy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    scheme: &'static str,
    default_port: u16,
}

impl Protocol {
    /// Plain HTTP, default port 80
    pub const HTTP: Protocol = Protocol {
        scheme: "http",
        default_port: 80,
    };

    /// HTTPS, default port 443
    pub const HTTPS: Protocol = Protocol {
        scheme: "https",
        default_port: 443,
    };

    /// URI scheme name
    #[must_use]
    pub fn scheme(self) -> &'static str {
        self.scheme
    }

    /// Port omitted from rendered URIs
    #[must_use]
    pub fn default_port(self) -> u16 {
        self.default_port
    }

    /// True if a `http_proxy`/`https_proxy` style variable designated a
    /// forward proxy for this scheme when the snapshot was taken
    #[must_use]
    pub fn proxied_from_env(self) -> bool {
        PROXIED_SCHEMES.contains(self.scheme)
    }
}

// Captured once for the life of the process. Supporting proxy changes at
// runtime would move this into ConnectionProxy construction.
static PROXIED_SCHEMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut schemes = HashSet::new();
    for (scheme, var) in [("http", "http_proxy"), ("https", "https_proxy")] {
        let designated = |name: &str| env::var(name).is_ok_and(|value| !value.is_empty());
        if designated(var) || designated(&var.to_uppercase()) {
            schemes.insert(scheme);
        }
    }
    schemes
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_descriptors() {
        assert_eq!(Protocol::HTTP.scheme(), "http");
        assert_eq!(Protocol::HTTP.default_port(), 80);
        assert_eq!(Protocol::HTTPS.scheme(), "https");
        assert_eq!(Protocol::HTTPS.default_port(), 443);
    }
}
