use crate::utils::error::{DirectoryError, Result};
use std::future::Future;
use std::time::Duration;

/// Bounds a single store call; an elapsed deadline becomes `DirectoryError::Timeout`.
pub async fn with_deadline<T, F>(operation: &str, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(DirectoryError::Timeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
