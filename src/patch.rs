//! Scoped suspension of ambient request interception
//!
//! The patch layer that swaps intercepting connections into the runtime
//! reads [`Interception::is_active`]. The connection proxy suspends
//! interception while constructing its real connection and while
//! forwarding a live exchange, so the real connection stays genuinely
//! real even though it is created under active patching.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared switch for ambient request interception
#[derive(Debug)]
pub struct Interception {
    active: AtomicBool,
}

impl Interception {
    /// Create the switch with interception active
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
        }
    }

    /// True while ambient interception should apply
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Suspend interception until the returned scope drops.
    ///
    /// The prior state is restored on every exit path, including
    /// unwinding.
    #[must_use]
    pub fn suspend(&self) -> SuspendScope<'_> {
        let previous = self.active.swap(false, Ordering::SeqCst);
        SuspendScope {
            interception: self,
            previous,
        }
    }
}

impl Default for Interception {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII scope holding interception suspended
#[derive(Debug)]
pub struct SuspendScope<'a> {
    interception: &'a Interception,
    previous: bool,
}

impl Drop for SuspendScope<'_> {
    fn drop(&mut self) {
        self.interception.active.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspend_deactivates_and_restores() {
        let interception = Interception::new();
        assert!(interception.is_active());

        {
            let _scope = interception.suspend();
            assert!(!interception.is_active());
        }

        assert!(interception.is_active());
    }

    #[test]
    fn test_nested_suspension_restores_prior_state() {
        let interception = Interception::new();

        let outer = interception.suspend();
        {
            let _inner = interception.suspend();
            assert!(!interception.is_active());
        }
        // Inner scope restores the state the outer scope left behind.
        assert!(!interception.is_active());

        drop(outer);
        assert!(interception.is_active());
    }

    #[test]
    fn test_suspension_restores_on_unwind() {
        let interception = Interception::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = interception.suspend();
            panic!("forwarding failed");
        }));

        assert!(result.is_err());
        assert!(interception.is_active());
    }
}
