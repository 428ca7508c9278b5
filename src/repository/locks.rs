//! Transaction-scoped PostgreSQL advisory locks.
//!
//! Locks are released when the surrounding transaction commits or rolls
//! back. Callers that need both take the order lock before the ledger lock.

use sea_orm::{ConnectionTrait, Statement, Value};
use uuid::Uuid;

use crate::error::AppResult;

async fn advisory_xact_lock<C: ConnectionTrait>(conn: &C, key: String) -> AppResult<()> {
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [Value::from(key)],
    ))
    .await?;
    Ok(())
}

/// Serialises saves of one order id, including two first-time inserts.
pub async fn lock_order<C: ConnectionTrait>(conn: &C, order_id: &str) -> AppResult<()> {
    advisory_xact_lock(conn, format!("order:{order_id}")).await
}

/// Serialises appends to one customer's ledger.
pub async fn lock_customer_ledger<C: ConnectionTrait>(conn: &C, customer_id: Uuid) -> AppResult<()> {
    advisory_xact_lock(conn, format!("ledger:{customer_id}")).await
}
