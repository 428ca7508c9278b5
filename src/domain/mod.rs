//! Pure business rules: no database, no clock.

pub mod ledger;
pub mod order;

pub use ledger::{Balance, TransactionKind, compute_balance};
pub use order::{ExecutionStatus, PaymentStatus, Settlement, derive_payment_status, order_total, settle};
