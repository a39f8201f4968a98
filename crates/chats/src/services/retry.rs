//! Single retry of operations that hit transient lock contention.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::types::{ChatError, ChatResult};

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Runs `attempt` and, on a transient persistence failure, once more.
///
/// Each attempt must be a complete transaction; a failed attempt has been
/// rolled back by the time it returns. A second transient failure surfaces
/// as [`ChatError::ServiceUnavailable`].
pub async fn with_retry<T, F, Fut>(operation: &'static str, mut attempt: F) -> ChatResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ChatResult<T>>,
{
    match attempt().await {
        Err(first) if first.is_transient() => {
            warn!(operation, error = %first, "transient persistence conflict, retrying");
            tokio::time::sleep(RETRY_BACKOFF).await;

            match attempt().await {
                Err(second) if second.is_transient() => {
                    error!(operation, error = %second, "persistence conflict persisted after retry");
                    Err(ChatError::ServiceUnavailable)
                }
                outcome => outcome,
            }
        }
        outcome => outcome,
    }
}
