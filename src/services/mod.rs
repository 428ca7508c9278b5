pub mod auth_service;
pub mod ledger_service;
pub mod order_service;
