pub mod customers;
pub mod ledger_transactions;
pub mod operators;
pub mod order_items;
pub mod order_payments;
pub mod orders;
pub mod products;

pub use customers::Entity as Customers;
pub use ledger_transactions::Entity as LedgerTransactions;
pub use operators::Entity as Operators;
pub use order_items::Entity as OrderItems;
pub use order_payments::Entity as OrderPayments;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
