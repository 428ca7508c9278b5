use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::{
    audit,
    domain::{Balance, TransactionKind, compute_balance},
    dto::ledger::{
        CustomerBalance, OpeningBalanceRequest, PackageRegistered, RegisterPackageRequest,
        TransactionList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthOperator, ensure_manager},
    repository::{
        customer_repo,
        ledger_repo::{self, NewLedgerTransaction},
        locks,
    },
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Replays the customer's whole ledger through the balance fold.
pub async fn customer_balance<C: ConnectionTrait>(conn: &C, customer_id: Uuid) -> AppResult<Balance> {
    let transactions = ledger_repo::list_transactions(conn, customer_id).await?;
    compute_balance(transactions.iter().map(|t| (t.kind.as_str(), t.amount)))
        .ok_or_else(|| AppError::validation("balance out of range"))
}

pub async fn get_balance(state: &AppState, customer_id: Uuid) -> AppResult<ApiResponse<CustomerBalance>> {
    customer_repo::ensure_exists(&state.orm, customer_id).await?;
    let balance = customer_balance(&state.orm, customer_id).await?;
    Ok(ApiResponse::ok("OK", CustomerBalance::new(customer_id, balance)))
}

pub async fn list_transactions(
    state: &AppState,
    customer_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<TransactionList>> {
    customer_repo::ensure_exists(&state.orm, customer_id).await?;
    let (page, limit, offset) = pagination.normalize();
    let (items, total) =
        ledger_repo::list_page(&state.orm, customer_id, limit as u64, offset as u64).await?;
    Ok(ApiResponse::paged(
        "Ok",
        TransactionList { items },
        Meta::page(page, limit, total),
    ))
}

/// Credits a prepaid package: one `PAYMENT_RECEIVED`, plus `BONUS_ADDED`
/// when a bonus is given. Both rows commit together or not at all.
pub async fn register_package(
    state: &AppState,
    operator: &AuthOperator,
    customer_id: Uuid,
    payload: RegisterPackageRequest,
) -> AppResult<ApiResponse<PackageRegistered>> {
    let RegisterPackageRequest {
        paid_amount,
        bonus_amount,
    } = payload;
    if paid_amount <= 0 {
        return Err(AppError::validation("paid_amount must be greater than 0"));
    }
    if bonus_amount < 0 {
        return Err(AppError::validation("bonus_amount must not be negative"));
    }

    let txn = state.orm.begin().await?;
    locks::lock_customer_ledger(&txn, customer_id).await?;
    customer_repo::ensure_exists(&txn, customer_id).await?;

    let mut transaction_ids = vec![
        ledger_repo::append(
            &txn,
            NewLedgerTransaction {
                customer_id,
                kind: TransactionKind::PaymentReceived,
                amount: paid_amount,
                description: "Prepaid package".to_string(),
                metadata: serde_json::json!({ "source": "prepaid_package" }),
            },
        )
        .await?,
    ];

    if bonus_amount > 0 {
        transaction_ids.push(
            ledger_repo::append(
                &txn,
                NewLedgerTransaction {
                    customer_id,
                    kind: TransactionKind::BonusAdded,
                    amount: bonus_amount,
                    description: "Prepaid package bonus".to_string(),
                    metadata: serde_json::json!({
                        "source": "prepaid_package",
                        "payment_transaction_id": transaction_ids[0],
                    }),
                },
            )
            .await?,
        );
    }

    let balance = customer_balance(&txn, customer_id).await?;
    txn.commit().await?;

    info!(
        customer_id = %customer_id,
        paid_amount,
        bonus_amount,
        main_balance = balance.main_balance,
        "prepaid package registered"
    );

    audit::record(
        &state.pool,
        operator.operator_id,
        "package_registered",
        "ledger_transactions",
        serde_json::json!({
            "customer_id": customer_id,
            "paid_amount": paid_amount,
            "bonus_amount": bonus_amount,
        }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Package registered",
        PackageRegistered {
            customer_id,
            transaction_ids,
            balance,
        },
    ))
}

/// Carries a balance over from a previous system. A positive amount is
/// credit held by the customer, a negative amount is debt.
pub async fn record_opening_balance(
    state: &AppState,
    operator: &AuthOperator,
    customer_id: Uuid,
    payload: OpeningBalanceRequest,
) -> AppResult<ApiResponse<CustomerBalance>> {
    ensure_manager(operator)?;

    let kind = match payload.amount {
        0 => return Err(AppError::validation("amount must not be zero")),
        a if a > 0 => TransactionKind::PaymentReceived,
        _ => TransactionKind::Sale,
    };
    let amount = payload
        .amount
        .checked_abs()
        .ok_or_else(|| AppError::validation("amount out of range"))?;
    let description = payload
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Opening balance".to_string());

    let txn = state.orm.begin().await?;
    locks::lock_customer_ledger(&txn, customer_id).await?;
    customer_repo::ensure_exists(&txn, customer_id).await?;
    let transaction_id = ledger_repo::append(
        &txn,
        NewLedgerTransaction {
            customer_id,
            kind,
            amount,
            description,
            metadata: serde_json::json!({ "source": "opening_balance" }),
        },
    )
    .await?;
    let balance = customer_balance(&txn, customer_id).await?;
    txn.commit().await?;

    info!(customer_id = %customer_id, %transaction_id, kind = kind.as_str(), amount, "opening balance recorded");

    audit::record(
        &state.pool,
        operator.operator_id,
        "opening_balance_recorded",
        "ledger_transactions",
        serde_json::json!({ "customer_id": customer_id, "transaction_id": transaction_id }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Opening balance recorded",
        CustomerBalance::new(customer_id, balance),
    ))
}
