use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    audit,
    domain::{Settlement, TransactionKind, order::{self, is_store_credit, normalize_method}},
    dto::orders::{OrderDetail, OrderList, SaveOrderRequest},
    entity::orders::{Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::AuthOperator,
    models::Order,
    repository::{
        customer_repo,
        ledger_repo::{self, NewLedgerTransaction},
        locks,
        order_repo::{self, NewOrderItem, NewOrderPayment, OrderHeader},
    },
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

const MAX_ORDER_ID_LEN: usize = 32;

/// A validated save request with every derived value already computed.
#[derive(Debug, Clone)]
pub struct OrderSave {
    pub header: OrderHeader,
    pub items: Vec<NewOrderItem>,
    pub payments: Vec<NewOrderPayment>,
    pub settlement: Settlement,
}

impl OrderSave {
    /// Validates the payload and derives total, line totals and settlement.
    /// Nothing here touches the database.
    pub fn prepare(payload: SaveOrderRequest, now: DateTime<Utc>) -> AppResult<Self> {
        let order_id = payload.order_id.trim().to_string();
        if order_id.is_empty() {
            return Err(AppError::validation("order_id is required"));
        }
        if order_id.len() > MAX_ORDER_ID_LEN {
            return Err(AppError::validation(format!(
                "order_id must be at most {MAX_ORDER_ID_LEN} characters"
            )));
        }

        let mut items = Vec::with_capacity(payload.items.len());
        for (index, item) in payload.items.iter().enumerate() {
            if item.quantity < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "items[{index}]: quantity must not be negative"
                )));
            }
            if !order::quantity_is_storable(item.quantity) {
                return Err(AppError::validation(format!(
                    "items[{index}]: quantity must have at most {} decimal places and be below 1000000000",
                    order::QUANTITY_SCALE
                )));
            }
            if item.unit_price < 0 {
                return Err(AppError::validation(format!(
                    "items[{index}]: unit_price must not be negative"
                )));
            }
            let line_total = order::line_total(item.unit_price, item.quantity)
                .ok_or_else(|| AppError::validation(format!("items[{index}]: amount out of range")))?;
            items.push(NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }

        let total_amount = order::order_total(items.iter().map(|i| (i.unit_price, i.quantity)))
            .ok_or_else(|| AppError::validation("order total out of range"))?;

        let mut payments = Vec::with_capacity(payload.payments.len());
        for (index, payment) in payload.payments.iter().enumerate() {
            let method = normalize_method(&payment.method);
            if method.is_empty() {
                return Err(AppError::validation(format!(
                    "payments[{index}]: method is required"
                )));
            }
            if payment.amount < 0 {
                return Err(AppError::validation(format!(
                    "payments[{index}]: amount must not be negative"
                )));
            }
            payments.push(NewOrderPayment {
                id: Uuid::new_v4(),
                method,
                amount: payment.amount,
                paid_at: payment.paid_at.unwrap_or(now),
            });
        }

        let settlement = order::settle(payments.iter().map(|p| (p.amount, p.paid_at)), total_amount)
            .ok_or_else(|| AppError::validation("payment total out of range"))?;

        Ok(Self {
            header: OrderHeader {
                id: order_id,
                customer_id: payload.customer_id,
                execution_status: payload.execution_status,
                pickup_at: payload.pickup_at,
                completed_at: payload.completed_at,
                total_amount,
            },
            items,
            payments,
            settlement,
        })
    }

    fn uses_store_credit(&self) -> bool {
        self.payments.iter().any(|p| is_store_credit(&p.method))
    }
}

/// Writes a prepared save through `conn` and returns the reloaded order.
///
/// `conn` must be a transaction: header, items, payments and the store-credit
/// debits either all land or none do.
pub async fn apply_save<C: ConnectionTrait>(
    conn: &C,
    save: &OrderSave,
    now: DateTime<Utc>,
) -> AppResult<OrderDetail> {
    let order_id = save.header.id.as_str();
    let customer_id = save.header.customer_id;

    locks::lock_order(conn, order_id).await?;
    customer_repo::ensure_exists(conn, customer_id).await?;
    if save.uses_store_credit() {
        locks::lock_customer_ledger(conn, customer_id).await?;
    }

    let existing = order_repo::find_header(conn, order_id, true).await?;
    let is_new = existing.is_none();
    let header = order_repo::upsert_header(conn, existing, &save.header, now).await?;
    debug!(order_id, is_new, total_amount = save.header.total_amount, "order header written");

    order_repo::replace_items(conn, order_id, &save.items).await?;

    for payment in save.payments.iter().filter(|p| is_store_credit(&p.method)) {
        ledger_repo::append(
            conn,
            NewLedgerTransaction {
                customer_id,
                kind: TransactionKind::Sale,
                amount: payment.amount,
                description: format!("Order {order_id} paid with store credit"),
                metadata: serde_json::json!({
                    "order_id": order_id,
                    "payment_id": payment.id,
                }),
            },
        )
        .await?;
    }
    order_repo::replace_payments(conn, order_id, &save.payments).await?;

    order_repo::apply_settlement(conn, header, &save.settlement).await?;

    order_repo::get(conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("order", order_id))
}

pub async fn save_order(
    state: &AppState,
    operator: &AuthOperator,
    payload: SaveOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let now = Utc::now();
    let save = OrderSave::prepare(payload, now)?;

    let txn = state.orm.begin().await?;
    let detail = apply_save(&txn, &save, now).await?;
    txn.commit().await?;

    info!(
        order_id = %detail.order.id,
        customer_id = %detail.order.customer_id,
        total_amount = detail.order.total_amount,
        total_paid = save.settlement.total_paid,
        payment_status = %detail.order.payment_status,
        "order saved"
    );

    audit::record(
        &state.pool,
        operator.operator_id,
        "order_saved",
        "orders",
        serde_json::json!({
            "order_id": detail.order.id,
            "total_amount": detail.order.total_amount,
            "payment_status": detail.order.payment_status,
        }),
    )
    .await;

    Ok(ApiResponse::ok("Order saved", detail))
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<OrderDetail>> {
    let detail = order_repo::get(&state.orm, id)
        .await?
        .ok_or_else(|| AppError::not_found("order", id))?;
    Ok(ApiResponse::ok("OK", detail))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(status) = query.execution_status {
        condition = condition.add(OrderCol::ExecutionStatus.eq(status.as_str()));
    }
    if let Some(status) = query.payment_status {
        condition = condition.add(OrderCol::PaymentStatus.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::paged(
        "Ok",
        OrderList { items: orders },
        Meta::page(page, limit, total),
    ))
}
