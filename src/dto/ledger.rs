use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Balance;
use crate::models::LedgerTransaction;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterPackageRequest {
    pub paid_amount: i64,
    #[serde(default)]
    pub bonus_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageRegistered {
    pub customer_id: Uuid,
    pub transaction_ids: Vec<Uuid>,
    pub balance: Balance,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpeningBalanceRequest {
    /// Signed: positive is credit owed to the customer, negative is debt.
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerBalance {
    pub customer_id: Uuid,
    pub main_balance: i64,
    pub bonus_balance: i64,
    pub total_balance: i64,
}

impl CustomerBalance {
    pub fn new(customer_id: Uuid, balance: Balance) -> Self {
        Self {
            customer_id,
            main_balance: balance.main_balance,
            bonus_balance: balance.bonus_balance,
            total_balance: balance.total_balance,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub items: Vec<LedgerTransaction>,
}
