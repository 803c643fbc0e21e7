//! Cancellable Request Context

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus an optional deadline, handed down with a request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context that is only ever cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose deadline elapses `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Context driven by an existing token (e.g. process shutdown)
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Child context: cancelled with its parent, keeps the earlier deadline
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancel this context and all of its children
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves once the deadline has passed; never resolves without one
    pub(crate) async fn deadline_elapsed(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_cancelled_with_parent() {
        let parent = RequestContext::new();
        let child = parent.child(None);

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = RequestContext::new();
        let child = parent.child(None);

        child.cancel();
        assert!(!parent.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_keeps_earlier_deadline() {
        let parent = RequestContext::with_timeout(Duration::from_secs(1));
        let child = parent.child(Some(Duration::from_secs(10)));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.child(Some(Duration::from_millis(100)));
        assert!(tighter.deadline() < parent.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(200));
        ctx.deadline_elapsed().await;
        assert!(ctx.deadline().is_some_and(|deadline| Instant::now() >= deadline));
    }
}
