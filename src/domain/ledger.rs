use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kinds of financial events recorded against a customer's stored credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    PaymentReceived,
    Sale,
    BonusAdded,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::PaymentReceived => "PAYMENT_RECEIVED",
            TransactionKind::Sale => "SALE",
            TransactionKind::BonusAdded => "BONUS_ADDED",
        }
    }

    /// Returns `None` for kinds this build does not know about.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PAYMENT_RECEIVED" => Some(TransactionKind::PaymentReceived),
            "SALE" => Some(TransactionKind::Sale),
            "BONUS_ADDED" => Some(TransactionKind::BonusAdded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    pub main_balance: i64,
    pub bonus_balance: i64,
    pub total_balance: i64,
}

/// Folds a customer's ledger into balances.
///
/// Input order does not matter. Kinds that `TransactionKind::parse` does not
/// recognise contribute nothing, so rows written by a newer release never
/// break the computation here. Balances are not clamped at zero. Returns
/// `None` when a bucket or the total leaves the `i64` range.
pub fn compute_balance<'a, I>(entries: I) -> Option<Balance>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut main_balance: i64 = 0;
    let mut bonus_balance: i64 = 0;

    for (kind, amount) in entries {
        match TransactionKind::parse(kind) {
            Some(TransactionKind::PaymentReceived) => main_balance = main_balance.checked_add(amount)?,
            Some(TransactionKind::Sale) => main_balance = main_balance.checked_sub(amount)?,
            Some(TransactionKind::BonusAdded) => bonus_balance = bonus_balance.checked_add(amount)?,
            None => {}
        }
    }

    Some(Balance {
        main_balance,
        bonus_balance,
        total_balance: main_balance.checked_add(bonus_balance)?,
    })
}
