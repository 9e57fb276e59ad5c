use std::future::Future;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};

/// Run one store or blob operation under `limit`.
///
/// An elapsed timeout becomes [`ServiceError::Transient`]; the operation is
/// not retried. Dropping the returned future cancels the in-flight call.
pub async fn bounded<T, E>(
    limit: Duration,
    op: &'static str,
    fut: impl Future<Output = Result<T, E>>,
) -> ServiceResult<T>
where
    ServiceError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ServiceError::from),
        Err(_) => Err(ServiceError::Transient(format!(
            "{op} timed out after {limit:?}"
        ))),
    }
}
