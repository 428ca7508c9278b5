use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::TransactionKind,
    entity::ledger_transactions::{ActiveModel as LedgerActive, Column as LedgerCol, Entity as LedgerTransactions},
    error::{AppError, AppResult},
    models::LedgerTransaction,
};

#[derive(Debug, Clone)]
pub struct NewLedgerTransaction {
    pub customer_id: Uuid,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub metadata: Value,
}

/// Appends one immutable row and returns its id.
///
/// The customer must exist; callers check it before appending. There is no
/// update or delete counterpart: a correction is another append.
pub async fn append<C: ConnectionTrait>(conn: &C, entry: NewLedgerTransaction) -> AppResult<Uuid> {
    if entry.amount < 0 {
        return Err(AppError::validation(format!(
            "invalid amount {}: ledger amounts must be non-negative",
            entry.amount
        )));
    }

    let id = Uuid::new_v4();
    LedgerActive {
        id: Set(id),
        seq: NotSet,
        customer_id: Set(entry.customer_id),
        kind: Set(entry.kind.as_str().to_string()),
        amount: Set(entry.amount),
        description: Set(entry.description),
        metadata: Set(entry.metadata),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    debug!(
        transaction_id = %id,
        customer_id = %entry.customer_id,
        kind = entry.kind.as_str(),
        amount = entry.amount,
        "ledger transaction appended"
    );
    Ok(id)
}

/// Whole ledger of a customer, oldest first.
pub async fn list_transactions<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
) -> AppResult<Vec<LedgerTransaction>> {
    let rows = LedgerTransactions::find()
        .filter(LedgerCol::CustomerId.eq(customer_id))
        .order_by_asc(LedgerCol::CreatedAt)
        .order_by_asc(LedgerCol::Seq)
        .all(conn)
        .await?
        .into_iter()
        .map(LedgerTransaction::from)
        .collect();
    Ok(rows)
}

/// One page of history, newest first, plus the customer's row count.
pub async fn list_page<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
    limit: u64,
    offset: u64,
) -> AppResult<(Vec<LedgerTransaction>, i64)> {
    let finder = LedgerTransactions::find().filter(LedgerCol::CustomerId.eq(customer_id));
    let total = finder.clone().count(conn).await? as i64;

    let rows = finder
        .order_by_desc(LedgerCol::CreatedAt)
        .order_by_desc(LedgerCol::Seq)
        .limit(limit)
        .offset(offset)
        .all(conn)
        .await?
        .into_iter()
        .map(LedgerTransaction::from)
        .collect();
    Ok((rows, total))
}
