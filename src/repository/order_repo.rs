use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    domain::{ExecutionStatus, PaymentStatus, Settlement},
    dto::orders::OrderDetail,
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        order_payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as OrderPayments},
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem, OrderPayment},
};

#[derive(Debug, Clone)]
pub struct OrderHeader {
    pub id: String,
    pub customer_id: Uuid,
    pub execution_status: ExecutionStatus,
    pub pickup_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_amount: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrderPayment {
    pub id: Uuid,
    pub method: String,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
}

/// Child rows keep their list index in an `INTEGER` column.
fn position(index: usize) -> AppResult<i32> {
    i32::try_from(index).map_err(|_| AppError::validation(format!("position {index} out of range")))
}

pub async fn find_header<C: ConnectionTrait>(
    conn: &C,
    order_id: &str,
    for_update: bool,
) -> AppResult<Option<OrderModel>> {
    let mut finder = Orders::find_by_id(order_id.to_owned());
    if for_update {
        finder = finder.lock(LockType::Update);
    }
    Ok(finder.one(conn).await?)
}

/// Inserts the header, or updates it in place when `existing` is given.
///
/// A new header starts as `AGUARDANDO_PAGAMENTO`; an existing one keeps its
/// payment fields until `apply_settlement` rewrites them.
pub async fn upsert_header<C: ConnectionTrait>(
    conn: &C,
    existing: Option<OrderModel>,
    header: &OrderHeader,
    now: DateTime<Utc>,
) -> AppResult<OrderModel> {
    let model = match existing {
        None => {
            OrderActive {
                id: Set(header.id.clone()),
                customer_id: Set(header.customer_id),
                execution_status: Set(header.execution_status.as_str().to_string()),
                payment_status: Set(PaymentStatus::AguardandoPagamento.as_str().to_string()),
                pickup_at: Set(header.pickup_at.map(Into::into)),
                completed_at: Set(header.completed_at.map(Into::into)),
                paid_at: Set(None),
                total_amount: Set(header.total_amount),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(conn)
            .await?
        }
        Some(model) => {
            let mut active: OrderActive = model.into();
            active.customer_id = Set(header.customer_id);
            active.execution_status = Set(header.execution_status.as_str().to_string());
            active.pickup_at = Set(header.pickup_at.map(Into::into));
            active.completed_at = Set(header.completed_at.map(Into::into));
            active.total_amount = Set(header.total_amount);
            active.updated_at = Set(now.into());
            active.update(conn).await?
        }
    };
    Ok(model)
}

pub async fn apply_settlement<C: ConnectionTrait>(
    conn: &C,
    header: OrderModel,
    settlement: &Settlement,
) -> AppResult<OrderModel> {
    let mut active: OrderActive = header.into();
    active.payment_status = Set(settlement.status.as_str().to_string());
    active.paid_at = Set(settlement.paid_at.map(Into::into));
    Ok(active.update(conn).await?)
}

/// Deletes every item of the order and inserts `items` in list order.
pub async fn replace_items<C: ConnectionTrait>(
    conn: &C,
    order_id: &str,
    items: &[NewOrderItem],
) -> AppResult<()> {
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .exec(conn)
        .await?;

    for (index, item) in items.iter().enumerate() {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id.to_owned()),
            position: Set(position(index)?),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            line_total: Set(item.line_total),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Deletes every payment of the order and inserts `payments` in list order.
pub async fn replace_payments<C: ConnectionTrait>(
    conn: &C,
    order_id: &str,
    payments: &[NewOrderPayment],
) -> AppResult<()> {
    OrderPayments::delete_many()
        .filter(PaymentCol::OrderId.eq(order_id))
        .exec(conn)
        .await?;

    for (index, payment) in payments.iter().enumerate() {
        PaymentActive {
            id: Set(payment.id),
            order_id: Set(order_id.to_owned()),
            position: Set(position(index)?),
            method: Set(payment.method.clone()),
            amount: Set(payment.amount),
            paid_at: Set(payment.paid_at.into()),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Header, items joined with their product, and payments; children in
/// submitted order.
pub async fn get<C: ConnectionTrait>(conn: &C, order_id: &str) -> AppResult<Option<OrderDetail>> {
    let order = match Orders::find_by_id(order_id.to_owned()).one(conn).await? {
        Some(o) => Order::from(o),
        None => return Ok(None),
    };

    let items = OrderItems::find()
        .find_also_related(Products)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    let payments = OrderPayments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .order_by_asc(PaymentCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderPayment::from)
        .collect();

    Ok(Some(OrderDetail {
        order,
        items,
        payments,
    }))
}
