//! Cancellation context passed explicitly into request execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Carries an optional deadline and a cancellation flag.
///
/// Clones and children share the flag, so cancelling a parent cancels every
/// context derived from it. Children may only shorten the deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

/// Cancels the context it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// A deadline `timeout` from now. Too large to represent means none.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            ..Self::default()
        }
    }

    /// A context plus a handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let ctx = Self::default();
        let handle = ctx.cancel_handle();
        (ctx, handle)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Derive a child whose deadline is at most `timeout` from now.
    ///
    /// A timeout too large to represent keeps the parent's deadline.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(parent), Some(candidate)) => Some(parent.min(candidate)),
            (parent, None) => parent,
            (None, candidate) => candidate,
        };
        Self {
            deadline,
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `Some(ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_has_no_deadline() {
        let ctx = Context::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn child_never_extends_parent_deadline() {
        let parent = Context::with_timeout(Duration::from_millis(10));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let parent = Context::with_timeout(Duration::from_secs(60));
        let child = parent.child_with_timeout(Duration::from_millis(10));
        assert!(child.deadline() < parent.deadline());
    }

    #[test]
    fn unrepresentable_timeout_adds_no_deadline() {
        assert!(Context::with_timeout(Duration::MAX).deadline().is_none());
        assert!(Context::background()
            .child_with_timeout(Duration::MAX)
            .deadline()
            .is_none());

        let parent = Context::with_timeout(Duration::from_secs(5));
        let child = parent.child_with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[test]
    fn cancel_propagates_to_children() {
        let (ctx, handle) = Context::with_cancel();
        let child = ctx.child_with_timeout(Duration::from_secs(1));
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let ctx = Context::with_deadline(Instant::now());
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }
}
