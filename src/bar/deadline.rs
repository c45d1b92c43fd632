use crate::error::MassingError;
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Time limit and cancel flag for long-running passes.
///
/// Clones share the cancel flag, so another thread can stop a running pass.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    until: Option<Instant>,
    cancel: Arc<AtomicBool>,
}

impl Deadline {
    /// Never expires unless cancelled.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn within(limit: Duration) -> Self {
        Self {
            until: Instant::now().checked_add(limit),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_expired(&self) -> bool {
        self.cancel.load(Ordering::Relaxed) || self.until.is_some_and(|t| Instant::now() >= t)
    }

    /// Fails with `MassingError::Cancelled` once expired.
    pub fn check(&self, done: usize, total: usize) -> Result<()> {
        if self.is_expired() {
            return Err(MassingError::Cancelled(done, total).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_expires() -> Result<()> {
        let d = Deadline::none();
        assert!(!d.is_expired());
        d.check(1, 2)?;
        Ok(())
    }

    #[test]
    fn test_cancel_is_shared() {
        let d = Deadline::within(Duration::from_secs(3600));
        let other = d.clone();
        other.cancel();
        assert!(d.is_expired());
        let err = d.check(3, 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MassingError>(),
            Some(&MassingError::Cancelled(3, 10))
        );
    }

    #[test]
    fn test_zero_limit_expires() {
        assert!(Deadline::within(Duration::ZERO).is_expired());
    }
}
