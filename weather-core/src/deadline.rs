//! Deadline-scoped calls.
//!
//! The wrapped future is owned by the timeout; when the deadline fires it is dropped,
//! which aborts the underlying HTTP request and releases its connection.

use std::{future::Future, time::Duration};

use crate::error::LookupError;

/// Default budget for a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `call` to completion or fail with `LookupError::Upstream` once `limit` elapses.
pub async fn with_deadline<T, F>(what: &str, limit: Duration, call: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{what} exceeded its {:?} deadline; request aborted", limit);
            Err(LookupError::timed_out(what, limit))
        }
    }
}
