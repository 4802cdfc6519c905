//! Lifecycle manager error types.

use crate::domain::OrderError;
use crate::storage::StoreError;

/// LifecycleError is what every manager operation can fail with.
///
/// Business-rule rejections (`Order`, `NotFound`, `UpdateInFlight`) call for
/// corrected input; `Store` is the transport class the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("order {0} not found")]
    NotFound(i64),

    #[error("order {0} already has an update in flight")]
    UpdateInFlight(i64),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
