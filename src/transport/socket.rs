//! Socket stand-ins for replayed connections

use std::time::Duration;

/// A socket that doesn't do anything.
///
/// Handed out while playing back recordings, when no actual socket was
/// ever opened. Upper-layer networking code only checks that a socket
/// exists and carries a valid descriptor; it never gets to perform I/O
/// on this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeSocket;

impl FakeSocket {
    /// No-op
    pub fn close(&self) {}

    /// No-op
    pub fn set_timeout(&self, _timeout: Option<Duration>) {}

    /// Descriptor for poll/select-style callers that insist on one.
    ///
    /// Returns 0, stdin's descriptor, so watching it never fails.
    #[must_use]
    pub fn fileno(&self) -> i32 {
        0
    }
}

/// What the connection proxy's sock accessor hands back
#[derive(Debug)]
pub enum ProxySocket<'a, S> {
    /// The real connection's live socket
    Live(&'a S),
    /// Placeholder when replaying without an open socket
    Fake(FakeSocket),
}

impl<S> ProxySocket<'_, S> {
    /// True for a live socket
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_socket_operations_are_noops() {
        let socket = FakeSocket;
        socket.close();
        socket.set_timeout(Some(Duration::from_secs(5)));
        socket.set_timeout(None);
    }

    #[test]
    fn test_fileno_is_stdin() {
        assert_eq!(FakeSocket.fileno(), 0);
    }

    #[test]
    fn test_proxy_socket_discriminates() {
        let live_socket = ();
        assert!(ProxySocket::Live(&live_socket).is_live());
        assert!(!ProxySocket::<()>::Fake(FakeSocket).is_live());
    }
}
