// Wall-clock ceilings for outbound calls, and the primary-provider race that
// content and screenshot fetching share.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::error::Result;

/// A fixed point in time after which in-flight work is abandoned.
///
/// Futures passed to [`Deadline::run`] are dropped when the deadline fires,
/// which closes their underlying connection.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {}ms elapsed", .budget.as_millis())]
pub struct Expired {
    pub budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Await `fut` until the deadline; past it, drop `fut` and return [`Expired`].
    pub async fn run<F: Future>(&self, fut: F) -> std::result::Result<F::Output, Expired> {
        tokio::time::timeout_at(self.expires_at, fut)
            .await
            .map_err(|_| Expired {
                budget: self.budget,
            })
    }
}

/// Why the primary provider was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeoutCause {
    /// The provider reported its own timeout.
    Provider,
    /// Our deadline fired before the provider answered.
    Deadline,
}

pub(crate) enum Primary<T> {
    Delivered(T),
    TimedOut(TimeoutCause),
}

/// Race a primary-provider call against `deadline`.
///
/// Timeouts (ours or the provider's) come back as [`Primary::TimedOut`] so the
/// caller can substitute a fallback. Every other provider failure is an error.
pub(crate) async fn race_primary<T, F>(deadline: Deadline, url: &str, call: F) -> Result<Primary<T>>
where
    F: Future<Output = firecrawl_client::Result<T>>,
{
    match deadline.run(call).await {
        Err(expired) => {
            warn!(url, error = %expired, "Primary provider exceeded deadline");
            Ok(Primary::TimedOut(TimeoutCause::Deadline))
        }
        Ok(Err(err)) if err.is_timeout() => {
            warn!(url, error = %err, "Primary provider timed out");
            Ok(Primary::TimedOut(TimeoutCause::Provider))
        }
        Ok(Err(err)) => {
            warn!(url, error = %err, "Primary provider failed");
            Err(err.into())
        }
        Ok(Ok(value)) => Ok(Primary::Delivered(value)),
    }
}
