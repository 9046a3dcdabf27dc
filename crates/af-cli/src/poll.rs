//! Bounded polling of remote state.
//!
//! Every wait in the CLI (login token issuance, domain provisioning, ENS
//! verification, deployment release) is a condition evaluated on a fixed
//! period until it yields a value or the try budget runs out.
//!
//! A condition returns `Ok(None)` for "not done yet" and `Ok(Some(v))` for a
//! terminal result. `Some(false)`, `Some(0)` and `Some("")` are results like
//! any other. Errors are not retried: a condition that wants to ride out
//! transient failures maps them to `Ok(None)` itself.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Spacing and budget for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between the end of one attempt and the start of the next.
    pub period: Duration,
    /// Maximum number of attempts. Zero is treated as one.
    pub tries: u32,
}

impl PollPolicy {
    /// CLI login session: waits on a human in a browser.
    pub const CLI_SESSION: Self = Self::new(Duration::from_secs(2), 500);

    /// Domain, zone and ENS record state changes.
    pub const RESOURCE: Self = Self::new(Duration::from_secs(6), 10);

    /// Site deployment release.
    pub const DEPLOYMENT: Self = Self::new(Duration::from_secs(6), 30);

    /// Create a policy.
    #[must_use]
    pub const fn new(period: Duration, tries: u32) -> Self {
        Self { period, tries }
    }

    /// Upper bound on time spent sleeping between attempts.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.period * self.tries.max(1).saturating_sub(1)
    }
}

/// How a cancellable poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition produced a value.
    Ready(T),
    /// The try budget was exhausted.
    TimedOut,
    /// The cancellation token fired.
    Cancelled,
}

impl<T> PollOutcome<T> {
    /// The value, if the poll completed.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::TimedOut | Self::Cancelled => None,
        }
    }
}

/// Evaluate `condition` until it yields a value or `policy.tries` attempts
/// were made.
///
/// Returns `Ok(None)` on timeout. Attempts run strictly one after another;
/// there is no delay after the last one.
///
/// # Errors
///
/// Returns the condition's error as soon as one attempt fails.
pub async fn check_periodically_until<T, E, F, Fut>(
    policy: PollPolicy,
    condition: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let never = CancellationToken::new();
    let outcome = check_periodically_until_cancelled(policy, &never, condition).await?;
    Ok(outcome.ready())
}

/// Like [`check_periodically_until`], but stops early when `cancel` fires.
///
/// Cancellation is checked before each attempt and raced against each
/// inter-attempt delay. An attempt already in flight is awaited.
///
/// # Errors
///
/// Returns the condition's error as soon as one attempt fails.
pub async fn check_periodically_until_cancelled<T, E, F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut condition: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let tries = policy.tries.max(1);

    for attempt in 1..=tries {
        if cancel.is_cancelled() {
            trace!(attempt, "poll cancelled");
            return Ok(PollOutcome::Cancelled);
        }

        if let Some(value) = condition().await? {
            trace!(attempt, "poll condition satisfied");
            return Ok(PollOutcome::Ready(value));
        }

        trace!(attempt, tries, "poll condition pending");

        if attempt < tries {
            tokio::select! {
                () = cancel.cancelled() => {
                    trace!(attempt, "poll cancelled while waiting");
                    return Ok(PollOutcome::Cancelled);
                }
                () = tokio::time::sleep(policy.period) => {}
            }
        }
    }

    Ok(PollOutcome::TimedOut)
}
