//! Invocation deadlines
//!
//! Lambda reports the instant an invocation will be killed as milliseconds
//! since the Unix epoch. Database and upstream calls made for a request are
//! bounded by that instant, less a margin that leaves room to send the error
//! response with its CORS headers.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::{timeout_at, Instant};

use crate::errors::{Error, Result};

/// Time held back from the invocation deadline to build and return a response
pub const RESPONSE_MARGIN: Duration = Duration::from_secs(1);

/// Converts a Lambda deadline (epoch milliseconds) into a monotonic instant,
/// [`RESPONSE_MARGIN`] early. Deadlines already past map to now.
pub fn from_epoch_millis(deadline_ms: u64) -> Instant {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default();
    let remaining = Duration::from_millis(deadline_ms.saturating_sub(now_ms));
    Instant::now() + remaining.saturating_sub(RESPONSE_MARGIN)
}

/// Runs `work` until `deadline`. Expiry is an upstream failure naming `what`;
/// without a deadline the work is unbounded.
pub async fn within<T, F>(deadline: Option<Instant>, what: &str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(at) => timeout_at(at, work)
            .await
            .map_err(|_| Error::Upstream(format!("{what} exceeded the request deadline")))?,
        None => work.await,
    }
}
