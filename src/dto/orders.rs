use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ExecutionStatus;
use crate::models::{Order, OrderItem, OrderPayment};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveOrderRequest {
    pub order_id: String,
    pub customer_id: Uuid,
    pub execution_status: ExecutionStatus,
    pub pickup_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub payments: Vec<PaymentInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    #[schema(value_type = String, example = "2.5")]
    pub quantity: Decimal,
    /// Price snapshot in minor units; not checked against the catalog.
    pub unit_price: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentInput {
    pub method: String,
    pub amount: i64,
    /// Defaults to the time of the save.
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<OrderPayment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
