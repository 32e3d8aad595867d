//! One-shot lifecycle gates with explicit re-arm semantics.
//!
//! A [`Gate`] is a single-fire signal: it starts unpromoted, resolves every
//! current and future waiter exactly once when promoted, and can be re-armed
//! into a fresh unpromoted state. Re-arming replaces the underlying channel -
//! waiters of the retired epoch are not carried over to the new arming. A
//! waiter whose epoch is retired before promotion observes
//! [`GateWait::Retired`] instead of hanging.
//!
//! The component lifecycle uses three gates: `constructed` and `created` are
//! armed once and never re-armed; `anchored` is re-armed on every detach so a
//! subsequent attach can be awaited again.

use std::sync::Mutex;

use tokio::sync::watch;

/// Outcome of awaiting a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateWait {
    /// The gate's current epoch was promoted.
    Promoted,
    /// The awaited epoch was discarded by a re-arm before promotion.
    Retired,
}

impl GateWait {
    /// Whether the awaited epoch was promoted.
    #[must_use]
    pub const fn is_promoted(self) -> bool {
        matches!(self, Self::Promoted)
    }
}

/// A re-armable single-fire signal.
#[derive(Debug)]
pub struct Gate {
    sender: Mutex<watch::Sender<bool>>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    /// Creates an unpromoted gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(watch::channel(false).0),
        }
    }

    /// Promotes the current epoch, waking all waiters.
    ///
    /// Returns `true` on the first promotion of this epoch; later calls are
    /// no-ops returning `false`.
    pub fn promote(&self) -> bool {
        let sender = self.sender.lock().expect("gate lock poisoned");
        if *sender.borrow() {
            return false;
        }
        sender.send_replace(true);
        true
    }

    /// Discards the current epoch and arms a fresh unpromoted one.
    ///
    /// Waiters of the discarded epoch resolve to [`GateWait::Retired`] unless
    /// the epoch was already promoted.
    pub fn rearm(&self) {
        let mut sender = self.sender.lock().expect("gate lock poisoned");
        *sender = watch::channel(false).0;
    }

    /// Whether the current epoch has been promoted.
    #[must_use]
    pub fn is_promoted(&self) -> bool {
        *self.sender.lock().expect("gate lock poisoned").borrow()
    }

    /// Waits for the epoch that is current at call time.
    pub async fn wait(&self) -> GateWait {
        let mut receiver = {
            let sender = self.sender.lock().expect("gate lock poisoned");
            sender.subscribe()
        };
        match receiver.wait_for(|promoted| *promoted).await {
            Ok(_) => GateWait::Promoted,
            Err(_) => GateWait::Retired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn waiters_resolve_on_promotion() {
        let gate = Arc::new(Gate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait().await })
        };
        tokio::task::yield_now().await;
        assert!(gate.promote());
        assert_eq!(waiter.await.unwrap(), GateWait::Promoted);
    }

    #[tokio::test]
    async fn wait_after_promotion_resolves_immediately() {
        let gate = Gate::new();
        gate.promote();
        assert_eq!(gate.wait().await, GateWait::Promoted);
    }

    #[test]
    fn promote_fires_once_per_epoch() {
        let gate = Gate::new();
        assert!(gate.promote());
        assert!(!gate.promote());
    }

    #[tokio::test]
    async fn rearm_resets_to_unpromoted() {
        let gate = Gate::new();
        gate.promote();
        assert!(gate.is_promoted());
        gate.rearm();
        assert!(!gate.is_promoted());
        assert!(gate.promote(), "fresh epoch can be promoted again");
    }

    #[tokio::test]
    async fn waiter_of_retired_epoch_is_not_satisfied_by_new_epoch() {
        let gate = Arc::new(Gate::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait().await })
        };
        tokio::task::yield_now().await;
        gate.rearm();
        assert_eq!(waiter.await.unwrap(), GateWait::Retired);

        // the new epoch promotes independently
        gate.promote();
        assert_eq!(gate.wait().await, GateWait::Promoted);
    }

    #[tokio::test]
    async fn waiter_before_rearm_keeps_prior_promotion() {
        let gate = Gate::new();
        gate.promote();
        let outcome = gate.wait().await;
        gate.rearm();
        assert_eq!(outcome, GateWait::Promoted);
    }
}
