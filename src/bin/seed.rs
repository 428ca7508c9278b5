use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use laundry_pos_api::{
    config::AppConfig,
    db::{DbPool, run_migrations},
    domain::{ExecutionStatus, TransactionKind},
    dto::orders::{OrderItemInput, PaymentInput, SaveOrderRequest},
    repository::{
        catalog_repo,
        ledger_repo::{self, NewLedgerTransaction},
    },
    services::{auth_service::hash_password, order_service},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let state = AppState::connect(&config).await?;
    run_migrations(&state.pool).await?;

    ensure_operator(&state.pool, "gerente@lavanderia.local", "gerente123", "manager").await?;
    ensure_operator(&state.pool, "balcao@lavanderia.local", "balcao123", "attendant").await?;

    let maria = ensure_customer(&state.pool, "Maria Souza", "+55 11 91234-5678").await?;
    let joao = ensure_customer(&state.pool, "Joao Lima", "+55 11 99876-5432").await?;

    let wash_kg = ensure_product(&state.pool, "Lavar e passar (kg)", "KG", 1990).await?;
    let duvet = ensure_product(&state.pool, "Edredom casal", "UN", 4500).await?;

    // Maria bought a package: 100.00 paid, 20.00 bonus.
    let txn = state.orm.begin().await?;
    ledger_repo::append(
        &txn,
        NewLedgerTransaction {
            customer_id: maria,
            kind: TransactionKind::PaymentReceived,
            amount: 10_000,
            description: "Seed package".into(),
            metadata: serde_json::json!({ "source": "seed" }),
        },
    )
    .await?;
    ledger_repo::append(
        &txn,
        NewLedgerTransaction {
            customer_id: maria,
            kind: TransactionKind::BonusAdded,
            amount: 2_000,
            description: "Seed package bonus".into(),
            metadata: serde_json::json!({ "source": "seed" }),
        },
    )
    .await?;
    txn.commit().await?;

    let wash_price = catalog_repo::get_unit_price(&state.orm, wash_kg)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {wash_kg} missing from catalog"))?;
    let duvet_price = catalog_repo::get_unit_price(&state.orm, duvet)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {duvet} missing from catalog"))?;

    let now = Utc::now();
    let orders = [
        SaveOrderRequest {
            order_id: format!("S{}", &Uuid::new_v4().simple().to_string()[..6]).to_uppercase(),
            customer_id: maria,
            execution_status: ExecutionStatus::AguardandoExecucao,
            pickup_at: Some(now + Duration::days(2)),
            completed_at: None,
            items: vec![
                OrderItemInput {
                    product_id: wash_kg,
                    quantity: Decimal::new(35, 1),
                    unit_price: wash_price,
                },
                OrderItemInput {
                    product_id: duvet,
                    quantity: Decimal::ONE,
                    unit_price: duvet_price,
                },
            ],
            payments: vec![PaymentInput {
                method: "saldo".into(),
                amount: 5_000,
                paid_at: Some(now),
            }],
        },
        SaveOrderRequest {
            order_id: format!("S{}", &Uuid::new_v4().simple().to_string()[..6]).to_uppercase(),
            customer_id: joao,
            execution_status: ExecutionStatus::AguardandoRetirada,
            pickup_at: None,
            completed_at: None,
            items: vec![OrderItemInput {
                product_id: duvet,
                quantity: Decimal::from(2),
                unit_price: duvet_price,
            }],
            payments: Vec::new(),
        },
    ];

    for payload in orders {
        let save = order_service::OrderSave::prepare(payload, now)?;
        let txn = state.orm.begin().await?;
        let detail = order_service::apply_save(&txn, &save, now).await?;
        txn.commit().await?;
        println!(
            "Seeded order {} total={} status={}",
            detail.order.id, detail.order.total_amount, detail.order.payment_status
        );
    }

    println!("Seed completed. Customers: {maria}, {joao}");
    Ok(())
}

async fn ensure_operator(pool: &DbPool, email: &str, password: &str, role: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO operators (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured operator {email} (role={role})");
    Ok(id)
}

async fn ensure_customer(pool: &DbPool, name: &str, phone: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO customers (id, name, phone) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(phone)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_product(pool: &DbPool, name: &str, unit: &str, price: i64) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, unit, price)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE SET price = EXCLUDED.price
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(unit)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
