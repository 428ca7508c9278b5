//! Data access. Every function is generic over `ConnectionTrait`, so it runs
//! equally against the pool or inside a caller's `DatabaseTransaction`.

pub mod catalog_repo;
pub mod customer_repo;
pub mod ledger_repo;
pub mod locks;
pub mod order_repo;
