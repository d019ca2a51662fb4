//! Transaction helpers.
//!
//! Statements issued through the `Db` returned by [`Db::begin`](crate::Db::begin)
//! run inside the transaction. The [`transaction!`] macro wraps a unit of
//! work: begin, run, commit on `Ok`, roll back on `Err`, then close.
//!
//! # Example
//!
//! ```ignore
//! use sqlrow::{DbResult, Row, builder};
//!
//! # async fn demo(db: &sqlrow::Db<sqlrow::PgTransport<tokio_postgres::Client>>) -> DbResult<()> {
//! let order = Row::new().with("id", 1).with("total", 100);
//! sqlrow::transaction!(db, tx, {
//!     tx.insert_row(builder::insert_row("orders", &order)).await?;
//!     tx.execute("UPDATE stock SET qty = qty - 1 WHERE sku = :sku", &sqlrow::named! { "sku" => "A1" }).await?;
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```

/// Runs the given block inside a transaction.
///
/// - Begins a transaction via `$db.begin().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)` and returns the original error.
/// - Always closes the transaction afterwards.
///
/// The block must evaluate to `sqlrow::DbResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($db:expr, $tx:ident, $body:block) => {{
        let $tx = ($db).begin().await?;

        let __sqlrow_tx_body_result = async { $body }.await;
        let __sqlrow_tx_outcome = match __sqlrow_tx_body_result {
            Ok(value) => $tx.commit().await.map(|()| value),
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::DbError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        };
        match ($tx.close().await, __sqlrow_tx_outcome) {
            (Err(close_err), Ok(_)) => Err(close_err),
            (_, outcome) => outcome,
        }
    }};
}
