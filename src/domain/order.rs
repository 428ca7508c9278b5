use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payment method that draws from the customer's stored credit.
pub const STORE_CREDIT_METHOD: &str = "SALDO";
pub const CASH_METHOD: &str = "DINHEIRO";

/// Decimal places a stored item quantity keeps.
pub const QUANTITY_SCALE: u32 = 3;
/// Largest quantity the `NUMERIC(12, 3)` column holds, as an unscaled integer.
const QUANTITY_PRECISION: i64 = 999_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    AguardandoExecucao,
    AguardandoRetirada,
    AguardandoEntrega,
    Concluido,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::AguardandoExecucao => "AGUARDANDO_EXECUCAO",
            ExecutionStatus::AguardandoRetirada => "AGUARDANDO_RETIRADA",
            ExecutionStatus::AguardandoEntrega => "AGUARDANDO_ENTREGA",
            ExecutionStatus::Concluido => "CONCLUIDO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    AguardandoPagamento,
    PagoParcialmente,
    Pago,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AguardandoPagamento => "AGUARDANDO_PAGAMENTO",
            PaymentStatus::PagoParcialmente => "PAGO_PARCIALMENTE",
            PaymentStatus::Pago => "PAGO",
        }
    }
}

pub fn normalize_method(method: &str) -> String {
    method.trim().to_uppercase()
}

pub fn is_store_credit(method: &str) -> bool {
    normalize_method(method) == STORE_CREDIT_METHOD
}

/// True when `quantity` is stored exactly: at most three decimal places and
/// within the column range. Trailing zeros do not count as places.
pub fn quantity_is_storable(quantity: Decimal) -> bool {
    quantity.normalize().scale() <= QUANTITY_SCALE && quantity.abs() <= Decimal::new(QUANTITY_PRECISION, QUANTITY_SCALE)
}

fn round_to_minor_units(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// `round(unit_price × quantity)` for a single line.
pub fn line_total(unit_price: i64, quantity: Decimal) -> Option<i64> {
    round_to_minor_units(Decimal::from(unit_price).checked_mul(quantity)?)
}

/// Order total over `(unit_price, quantity)` pairs.
///
/// The exact products are summed first and rounded once, so the total can
/// differ by a unit from the sum of rounded line totals. Returns `None` on
/// overflow.
pub fn order_total<I>(lines: I) -> Option<i64>
where
    I: IntoIterator<Item = (i64, Decimal)>,
{
    let mut sum = Decimal::ZERO;
    for (unit_price, quantity) in lines {
        let product = Decimal::from(unit_price).checked_mul(quantity)?;
        sum = sum.checked_add(product)?;
    }
    round_to_minor_units(sum)
}

/// Payment status as a function of what has been paid so far.
///
/// Nothing paid is always `AguardandoPagamento`, including a zero-value order.
pub fn derive_payment_status(total_paid: i64, total_amount: i64) -> PaymentStatus {
    if total_paid == 0 {
        PaymentStatus::AguardandoPagamento
    } else if total_paid < total_amount {
        PaymentStatus::PagoParcialmente
    } else {
        PaymentStatus::Pago
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub total_paid: i64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Settles an order against `(amount, paid_at)` payments in submitted order.
///
/// When fully paid, `paid_at` is the timestamp of the last payment in the
/// list, not the latest timestamp. Returns `None` on overflow.
pub fn settle<I>(payments: I, total_amount: i64) -> Option<Settlement>
where
    I: IntoIterator<Item = (i64, DateTime<Utc>)>,
{
    let mut total_paid: i64 = 0;
    let mut last_paid_at = None;
    for (amount, paid_at) in payments {
        total_paid = total_paid.checked_add(amount)?;
        last_paid_at = Some(paid_at);
    }

    let status = derive_payment_status(total_paid, total_amount);
    let paid_at = match status {
        PaymentStatus::Pago => last_paid_at,
        _ => None,
    };

    Some(Settlement {
        total_paid,
        status,
        paid_at,
    })
}
