use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{ledger_transactions, operators, order_items, order_payments, orders, products};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Operator {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Raw kind as stored; may hold kinds newer than this build.
    pub kind: String,
    pub amount: i64,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub customer_id: Uuid,
    pub execution_status: String,
    pub payment_status: String,
    pub pickup_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: String,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub product_unit: Option<String>,
    pub quantity: Decimal,
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderPayment {
    pub id: Uuid,
    pub order_id: String,
    pub position: i32,
    pub method: String,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
}

impl From<operators::Model> for Operator {
    fn from(model: operators::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ledger_transactions::Model> for LedgerTransaction {
    fn from(model: ledger_transactions::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            kind: model.kind,
            amount: model.amount,
            description: model.description,
            metadata: model.metadata,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            execution_status: model.execution_status,
            payment_status: model.payment_status,
            pickup_at: model.pickup_at.map(|dt| dt.with_timezone(&Utc)),
            completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
            paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
            total_amount: model.total_amount,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<(order_items::Model, Option<products::Model>)> for OrderItem {
    fn from((item, product): (order_items::Model, Option<products::Model>)) -> Self {
        let (product_name, product_unit) = match product {
            Some(p) => (Some(p.name), Some(p.unit)),
            None => (None, None),
        };
        Self {
            id: item.id,
            order_id: item.order_id,
            position: item.position,
            product_id: item.product_id,
            product_name,
            product_unit,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

impl From<order_payments::Model> for OrderPayment {
    fn from(model: order_payments::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            position: model.position,
            method: model.method,
            amount: model.amount,
            paid_at: model.paid_at.with_timezone(&Utc),
        }
    }
}
