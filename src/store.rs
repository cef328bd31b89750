use std::{future::Future, pin::Pin};

use sea_orm::{DatabaseTransaction, TransactionError, TransactionTrait};

use crate::error::{AppError, AppResult};

/// Scoped atomic multi-write boundary over the store.
///
/// Every write issued through the provided transaction handle commits as one
/// unit when the closure returns `Ok`; any `Err` (or panic) rolls the whole
/// unit back, and the underlying connection is released on every exit path.
/// The checkout, account-deletion, and collection-deletion workflows all run
/// through this single entry point.
pub async fn atomic<C, F, T>(conn: &C, op: F) -> AppResult<T>
where
    C: TransactionTrait,
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'c>>
        + Send,
    T: Send,
{
    match conn.transaction(op).await {
        Ok(value) => Ok(value),
        // Failure to open/commit the transaction itself.
        Err(TransactionError::Connection(err)) => Err(AppError::OrmError(err)),
        // The workflow aborted; the rollback already happened.
        Err(TransactionError::Transaction(err)) => Err(err),
    }
}
