use super::RuntimeError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Deadline and cancellation carried into runtime calls.
///
/// Clones share the cancel flag, so cancelling a parent also cancels every
/// context derived from it with [`CallContext::with_timeout`].
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// A context without deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that expires after `timeout`, or earlier if the
    /// parent deadline comes first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };

        Self {
            deadline: Some(deadline),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fails when the context is cancelled or its deadline has passed.
    pub fn check(&self, doing: &str) -> Result<(), RuntimeError> {
        if self.is_cancelled() {
            return Err(RuntimeError::Cancelled);
        }

        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(RuntimeError::DeadlineExceeded(doing.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_has_no_deadline() {
        let ctx = CallContext::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(ctx.check("listing").is_ok());
    }

    #[test]
    fn test_child_keeps_earlier_parent_deadline() {
        let parent = CallContext::background().with_timeout(Duration::from_millis(50));
        let child = parent.with_timeout(Duration::from_secs(10));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[test]
    fn test_cancel_propagates_to_children() {
        let parent = CallContext::background();
        let child = parent.with_timeout(Duration::from_secs(10));

        parent.cancel();

        assert!(child.is_cancelled());
        assert!(matches!(child.check("pulling"), Err(RuntimeError::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = CallContext::background().with_timeout(Duration::ZERO);
        let err = ctx.check("checking image").unwrap_err();
        assert!(matches!(err, RuntimeError::DeadlineExceeded(_)));
        assert!(err.to_string().contains("checking image"));
    }
}
