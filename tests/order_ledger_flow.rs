use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use laundry_pos_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{ExecutionStatus, TransactionKind},
    dto::{
        ledger::{OpeningBalanceRequest, RegisterPackageRequest},
        orders::{OrderItemInput, PaymentInput, SaveOrderRequest},
    },
    entity::{customers::ActiveModel as CustomerActive, products::ActiveModel as ProductActive},
    error::AppError,
    middleware::auth::AuthOperator,
    repository::{catalog_repo, ledger_repo},
    services::{ledger_service, order_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

// These tests need PostgreSQL. Every test works on its own customers, products
// and order codes, so they can share one database and run in parallel.
async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run ledger flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&database_url, 5).await?;

    Ok(Some(AppState {
        pool,
        orm,
        jwt_secret: Arc::from("test-secret"),
    }))
}

fn manager() -> AuthOperator {
    AuthOperator {
        operator_id: Uuid::new_v4(),
        role: "manager".into(),
    }
}

fn order_code() -> String {
    format!("T{}", &Uuid::new_v4().simple().to_string()[..10]).to_uppercase()
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, hour, minute, 0).unwrap()
}

async fn create_customer(state: &AppState) -> anyhow::Result<Uuid> {
    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        name: Set("Cliente Teste".into()),
        phone: Set(Some("+55 11 90000-0000".into())),
        email: Set(None),
        address: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(customer.id)
}

async fn create_product(state: &AppState, unit: &str, price: i64) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Produto {}", Uuid::new_v4())),
        unit: Set(unit.into()),
        price: Set(price),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

fn item(product_id: Uuid, quantity: Decimal, unit_price: i64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        unit_price,
    }
}

fn payment(method: &str, amount: i64, paid_at: DateTime<Utc>) -> PaymentInput {
    PaymentInput {
        method: method.into(),
        amount,
        paid_at: Some(paid_at),
    }
}

fn order_request(
    order_id: &str,
    customer_id: Uuid,
    items: Vec<OrderItemInput>,
    payments: Vec<PaymentInput>,
) -> SaveOrderRequest {
    SaveOrderRequest {
        order_id: order_id.into(),
        customer_id,
        execution_status: ExecutionStatus::AguardandoExecucao,
        pickup_at: Some(at(18, 0)),
        completed_at: None,
        items,
        payments,
    }
}

async fn main_balance(state: &AppState, customer_id: Uuid) -> anyhow::Result<i64> {
    let resp = ledger_service::get_balance(state, customer_id).await?;
    Ok(resp.data.expect("balance").main_balance)
}

/// Makes every ledger insert for `customer_id` fail until the guard is removed.
async fn reject_ledger_inserts(state: &AppState, customer_id: Uuid) -> anyhow::Result<String> {
    reject_ledger_inserts_of(state, customer_id, None).await
}

/// Like `reject_ledger_inserts`, limited to one kind when `kind` is given.
async fn reject_ledger_inserts_of(
    state: &AppState,
    customer_id: Uuid,
    kind: Option<TransactionKind>,
) -> anyhow::Result<String> {
    let name = format!("reject_ledger_{}", customer_id.simple());
    let kind_filter = match kind {
        Some(kind) => format!(" AND NEW.kind = '{}'", kind.as_str()),
        None => String::new(),
    };
    sqlx::query(&format!(
        "CREATE FUNCTION {name}() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'ledger append rejected'; END; \
         $$ LANGUAGE plpgsql"
    ))
    .execute(&state.pool)
    .await?;
    sqlx::query(&format!(
        "CREATE TRIGGER {name} BEFORE INSERT ON ledger_transactions \
         FOR EACH ROW WHEN (NEW.customer_id = '{customer_id}'::uuid{kind_filter}) \
         EXECUTE FUNCTION {name}()"
    ))
    .execute(&state.pool)
    .await?;
    Ok(name)
}

async fn allow_ledger_inserts(state: &AppState, name: &str) -> anyhow::Result<()> {
    sqlx::query(&format!("DROP TRIGGER IF EXISTS {name} ON ledger_transactions"))
        .execute(&state.pool)
        .await?;
    sqlx::query(&format!("DROP FUNCTION IF EXISTS {name}()"))
        .execute(&state.pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn cash_payment_covering_total_marks_order_paid() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 2500).await?;
    let code = order_code();

    let resp = order_service::save_order(
        &state,
        &manager(),
        order_request(
            &code,
            customer,
            vec![item(product, Decimal::from(2), 2500)],
            vec![payment("dinheiro", 5000, at(10, 30))],
        ),
    )
    .await?;
    let detail = resp.data.expect("order");

    assert_eq!(detail.order.total_amount, 5000);
    assert_eq!(detail.order.payment_status, "PAGO");
    assert_eq!(detail.order.paid_at, Some(at(10, 30)));
    assert_eq!(detail.payments.len(), 1);
    assert_eq!(detail.payments[0].method, "DINHEIRO");
    assert_eq!(detail.items[0].product_unit.as_deref(), Some("UN"));
    assert_eq!(detail.items[0].line_total, 5000);

    // Cash never touches the ledger.
    assert!(ledger_repo::list_transactions(&state.orm, customer).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn partial_payment_leaves_order_partially_paid() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 5000).await?;
    let code = order_code();

    let resp = order_service::save_order(
        &state,
        &manager(),
        order_request(
            &code,
            customer,
            vec![item(product, Decimal::ONE, 5000)],
            vec![payment("PIX", 2000, at(9, 0))],
        ),
    )
    .await?;
    let order = resp.data.expect("order").order;

    assert_eq!(order.total_amount, 5000);
    assert_eq!(order.payment_status, "PAGO_PARCIALMENTE");
    assert_eq!(order.paid_at, None);
    Ok(())
}

#[tokio::test]
async fn paid_at_comes_from_last_listed_payment() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 5000).await?;
    let code = order_code();

    let resp = order_service::save_order(
        &state,
        &manager(),
        order_request(
            &code,
            customer,
            vec![item(product, Decimal::ONE, 5000)],
            vec![payment("DINHEIRO", 3000, at(15, 0)), payment("PIX", 2000, at(9, 0))],
        ),
    )
    .await?;
    let detail = resp.data.expect("order");

    assert_eq!(detail.order.payment_status, "PAGO");
    assert_eq!(detail.order.paid_at, Some(at(9, 0)));
    assert_eq!(detail.payments[0].method, "DINHEIRO");
    assert_eq!(detail.payments[1].method, "PIX");
    Ok(())
}

#[tokio::test]
async fn weighed_items_round_total_to_minor_units() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let per_kg = create_product(&state, "KG", 1999).await?;
    let code = order_code();

    // 1999 * 2.345 = 4687.655
    let resp = order_service::save_order(
        &state,
        &manager(),
        order_request(&code, customer, vec![item(per_kg, Decimal::new(2345, 3), 1999)], Vec::new()),
    )
    .await?;
    let detail = resp.data.expect("order");

    assert_eq!(detail.order.total_amount, 4688);
    assert_eq!(detail.order.payment_status, "AGUARDANDO_PAGAMENTO");
    assert_eq!(detail.items[0].quantity, Decimal::new(2345, 3));
    Ok(())
}

#[tokio::test]
async fn store_credit_payment_appends_sale_to_ledger() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 1000).await?;
    let operator = manager();

    ledger_service::register_package(
        &state,
        &operator,
        customer,
        RegisterPackageRequest {
            paid_amount: 1500,
            bonus_amount: 0,
        },
    )
    .await?;
    assert_eq!(main_balance(&state, customer).await?, 1500);

    let code = order_code();
    let resp = order_service::save_order(
        &state,
        &operator,
        order_request(
            &code,
            customer,
            vec![item(product, Decimal::ONE, 1000)],
            vec![payment("saldo", 1000, at(11, 0))],
        ),
    )
    .await?;
    let detail = resp.data.expect("order");

    assert_eq!(detail.order.payment_status, "PAGO");
    assert_eq!(detail.payments[0].method, "SALDO");
    assert_eq!(main_balance(&state, customer).await?, 500);

    let ledger = ledger_repo::list_transactions(&state.orm, customer).await?;
    let sales: Vec<_> = ledger
        .iter()
        .filter(|t| t.kind == TransactionKind::Sale.as_str())
        .collect();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].amount, 1000);
    assert_eq!(sales[0].metadata["order_id"], serde_json::json!(code));
    Ok(())
}

#[tokio::test]
async fn stored_quantities_reproduce_order_total() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let per_kg = create_product(&state, "KG", 10_000).await?;
    let code = order_code();

    let too_precise = order_service::save_order(
        &state,
        &manager(),
        order_request(&code, customer, vec![item(per_kg, Decimal::new(10004, 4), 10_000)], Vec::new()),
    )
    .await;
    assert!(matches!(too_precise, Err(AppError::Validation(_))));
    assert!(matches!(
        order_service::get_order(&state, &code).await,
        Err(AppError::NotFound(_))
    ));

    let too_large = order_service::save_order(
        &state,
        &manager(),
        order_request(&code, customer, vec![item(per_kg, Decimal::from(1_000_000_000), 1)], Vec::new()),
    )
    .await;
    assert!(matches!(too_large, Err(AppError::Validation(_))));

    order_service::save_order(
        &state,
        &manager(),
        order_request(
            &code,
            customer,
            vec![item(per_kg, Decimal::new(1234, 3), 10_000), item(per_kg, Decimal::new(505, 3), 999)],
            Vec::new(),
        ),
    )
    .await?;

    let stored = order_service::get_order(&state, &code).await?.data.expect("order");
    let exact: Decimal = stored
        .items
        .iter()
        .map(|i| Decimal::from(i.unit_price) * i.quantity)
        .sum();
    let recomputed = exact
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(recomputed, Decimal::from(stored.order.total_amount));
    assert_eq!(stored.items[0].quantity, Decimal::new(1234, 3));
    assert_eq!(stored.items[1].quantity, Decimal::new(505, 3));
    Ok(())
}

#[tokio::test]
async fn resaving_with_store_credit_debits_again() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 600).await?;
    let operator = manager();

    ledger_service::register_package(
        &state,
        &operator,
        customer,
        RegisterPackageRequest {
            paid_amount: 2_000,
            bonus_amount: 0,
        },
    )
    .await?;

    let code = order_code();
    let payload = order_request(
        &code,
        customer,
        vec![item(product, Decimal::ONE, 600)],
        vec![payment("SALDO", 600, at(16, 0))],
    );
    order_service::save_order(&state, &operator, payload.clone()).await?;
    assert_eq!(main_balance(&state, customer).await?, 1_400);

    // Each save debits every SALDO payment it carries; earlier debits stay.
    let resaved = order_service::save_order(&state, &operator, payload)
        .await?
        .data
        .expect("order");
    assert_eq!(resaved.payments.len(), 1);
    assert_eq!(main_balance(&state, customer).await?, 800);

    let sales: Vec<_> = ledger_repo::list_transactions(&state.orm, customer)
        .await?
        .into_iter()
        .filter(|t| t.kind == TransactionKind::Sale.as_str())
        .collect();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().all(|t| t.amount == 600 && t.metadata["order_id"] == serde_json::json!(code)));
    assert_ne!(sales[0].metadata["payment_id"], sales[1].metadata["payment_id"]);
    Ok(())
}

#[tokio::test]
async fn resaving_replaces_items_instead_of_merging() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let shirt = create_product(&state, "UN", 800).await?;
    let per_kg = create_product(&state, "KG", 1500).await?;
    let operator = manager();
    let code = order_code();

    let payload = order_request(
        &code,
        customer,
        vec![item(shirt, Decimal::from(3), 800), item(per_kg, Decimal::new(15, 1), 1500)],
        vec![payment("DINHEIRO", 1000, at(8, 0))],
    );

    let first = order_service::save_order(&state, &operator, payload.clone())
        .await?
        .data
        .expect("order");
    let second = order_service::save_order(&state, &operator, payload.clone())
        .await?
        .data
        .expect("order");

    assert_eq!(first.order.total_amount, 4650);
    assert_eq!(second.order.total_amount, first.order.total_amount);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.payments.len(), 1);
    assert_eq!(second.order.payment_status, "PAGO_PARCIALMENTE");

    let mut emptied = payload;
    emptied.items.clear();
    emptied.payments.clear();
    emptied.execution_status = ExecutionStatus::Concluido;
    let third = order_service::save_order(&state, &operator, emptied)
        .await?
        .data
        .expect("order");

    assert!(third.items.is_empty());
    assert!(third.payments.is_empty());
    assert_eq!(third.order.total_amount, 0);
    assert_eq!(third.order.payment_status, "AGUARDANDO_PAGAMENTO");
    assert_eq!(third.order.execution_status, "CONCLUIDO");

    let reloaded = order_service::get_order(&state, &code).await?.data.expect("order");
    assert!(reloaded.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn package_adds_bonus_row_only_when_bonus_is_positive() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let operator = manager();

    let with_bonus = ledger_service::register_package(
        &state,
        &operator,
        customer,
        RegisterPackageRequest {
            paid_amount: 10_000,
            bonus_amount: 2_000,
        },
    )
    .await?
    .data
    .expect("package");
    assert_eq!(with_bonus.transaction_ids.len(), 2);

    let without_bonus = ledger_service::register_package(
        &state,
        &operator,
        customer,
        RegisterPackageRequest {
            paid_amount: 10_000,
            bonus_amount: 0,
        },
    )
    .await?
    .data
    .expect("package");
    assert_eq!(without_bonus.transaction_ids.len(), 1);

    let ledger = ledger_repo::list_transactions(&state.orm, customer).await?;
    let kinds: Vec<&str> = ledger.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(kinds, vec!["PAYMENT_RECEIVED", "BONUS_ADDED", "PAYMENT_RECEIVED"]);

    assert_eq!(without_bonus.balance.main_balance, 20_000);
    assert_eq!(without_bonus.balance.bonus_balance, 2_000);
    assert_eq!(without_bonus.balance.total_balance, 22_000);
    Ok(())
}

#[tokio::test]
async fn package_with_invalid_amounts_writes_nothing() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let operator = manager();

    for (paid_amount, bonus_amount) in [(0, 500), (-100, 0), (1000, -1)] {
        let result = ledger_service::register_package(
            &state,
            &operator,
            customer,
            RegisterPackageRequest {
                paid_amount,
                bonus_amount,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    assert!(ledger_repo::list_transactions(&state.orm, customer).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_bonus_append_rolls_back_package_payment() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;

    let guard = reject_ledger_inserts_of(&state, customer, Some(TransactionKind::BonusAdded)).await?;
    let result = ledger_service::register_package(
        &state,
        &manager(),
        customer,
        RegisterPackageRequest {
            paid_amount: 10_000,
            bonus_amount: 2_000,
        },
    )
    .await;
    allow_ledger_inserts(&state, &guard).await?;

    assert!(matches!(result, Err(AppError::Transaction(_))));
    assert!(ledger_repo::list_transactions(&state.orm, customer).await?.is_empty());
    assert_eq!(main_balance(&state, customer).await?, 0);
    Ok(())
}

#[tokio::test]
async fn package_that_would_overflow_balance_is_rejected() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;

    let result = ledger_service::register_package(
        &state,
        &manager(),
        customer,
        RegisterPackageRequest {
            paid_amount: i64::MAX,
            bonus_amount: 1,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert!(ledger_repo::list_transactions(&state.orm, customer).await?.is_empty());
    assert_eq!(main_balance(&state, customer).await?, 0);
    Ok(())
}

#[tokio::test]
async fn package_for_unknown_customer_is_not_found() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };

    let result = ledger_service::register_package(
        &state,
        &manager(),
        Uuid::new_v4(),
        RegisterPackageRequest {
            paid_amount: 1000,
            bonus_amount: 0,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn order_for_unknown_customer_is_not_created() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let code = order_code();

    let result = order_service::save_order(
        &state,
        &manager(),
        order_request(&code, Uuid::new_v4(), Vec::new(), Vec::new()),
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let lookup = order_service::get_order(&state, &code).await;
    assert!(matches!(lookup, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn failed_ledger_append_leaves_no_trace_of_new_order() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 3000).await?;
    let code = order_code();

    let guard = reject_ledger_inserts(&state, customer).await?;
    let result = order_service::save_order(
        &state,
        &manager(),
        order_request(
            &code,
            customer,
            vec![item(product, Decimal::ONE, 3000)],
            vec![payment("DINHEIRO", 1000, at(10, 0)), payment("SALDO", 2000, at(10, 5))],
        ),
    )
    .await;
    allow_ledger_inserts(&state, &guard).await?;

    assert!(matches!(result, Err(AppError::Transaction(_))));
    let lookup = order_service::get_order(&state, &code).await;
    assert!(matches!(lookup, Err(AppError::NotFound(_))));
    assert!(ledger_repo::list_transactions(&state.orm, customer).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_ledger_append_keeps_previous_order_state() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let shirt = create_product(&state, "UN", 1200).await?;
    let duvet = create_product(&state, "UN", 4500).await?;
    let operator = manager();
    let code = order_code();

    let before = order_service::save_order(
        &state,
        &operator,
        order_request(
            &code,
            customer,
            vec![item(shirt, Decimal::from(2), 1200)],
            vec![payment("DINHEIRO", 2400, at(12, 0))],
        ),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(before.order.payment_status, "PAGO");

    let guard = reject_ledger_inserts(&state, customer).await?;
    let result = order_service::save_order(
        &state,
        &operator,
        order_request(
            &code,
            customer,
            vec![item(duvet, Decimal::ONE, 4500)],
            vec![payment("SALDO", 4500, at(13, 0))],
        ),
    )
    .await;
    allow_ledger_inserts(&state, &guard).await?;
    assert!(matches!(result, Err(AppError::Transaction(_))));

    let after = order_service::get_order(&state, &code).await?.data.expect("order");
    assert_eq!(after.order.total_amount, before.order.total_amount);
    assert_eq!(after.order.payment_status, "PAGO");
    assert_eq!(after.order.paid_at, Some(at(12, 0)));
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.items[0].product_id, shirt);
    assert_eq!(after.payments.len(), 1);
    assert_eq!(after.payments[0].method, "DINHEIRO");
    Ok(())
}

#[tokio::test]
async fn concurrent_first_saves_of_same_order_are_serialised() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 700).await?;
    let operator = manager();
    let code = order_code();
    let payload = order_request(
        &code,
        customer,
        vec![item(product, Decimal::from(3), 700)],
        Vec::new(),
    );

    let (a, b) = tokio::join!(
        order_service::save_order(&state, &operator, payload.clone()),
        order_service::save_order(&state, &operator, payload.clone()),
    );
    a?;
    b?;

    let detail = order_service::get_order(&state, &code).await?.data.expect("order");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.order.total_amount, 2100);
    Ok(())
}

#[tokio::test]
async fn concurrent_store_credit_debits_are_all_recorded() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;
    let product = create_product(&state, "UN", 400).await?;
    let operator = manager();

    ledger_service::register_package(
        &state,
        &operator,
        customer,
        RegisterPackageRequest {
            paid_amount: 2000,
            bonus_amount: 0,
        },
    )
    .await?;

    let mut saves = tokio::task::JoinSet::new();
    for _ in 0..4 {
        let state = state.clone();
        let operator = operator.clone();
        let payload = order_request(
            &order_code(),
            customer,
            vec![item(product, Decimal::ONE, 400)],
            vec![payment("SALDO", 400, at(14, 0))],
        );
        saves.spawn(async move { order_service::save_order(&state, &operator, payload).await });
    }
    while let Some(result) = saves.join_next().await {
        result??;
    }

    assert_eq!(main_balance(&state, customer).await?, 400);
    let sales = ledger_repo::list_transactions(&state.orm, customer)
        .await?
        .into_iter()
        .filter(|t| t.kind == "SALE")
        .count();
    assert_eq!(sales, 4);
    Ok(())
}

#[tokio::test]
async fn opening_balance_is_signed_and_manager_only() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let customer = create_customer(&state).await?;

    let attendant = AuthOperator {
        operator_id: Uuid::new_v4(),
        role: "attendant".into(),
    };
    let denied = ledger_service::record_opening_balance(
        &state,
        &attendant,
        customer,
        OpeningBalanceRequest {
            amount: 1000,
            description: None,
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let debt = ledger_service::record_opening_balance(
        &state,
        &manager(),
        customer,
        OpeningBalanceRequest {
            amount: -750,
            description: Some("Saldo devedor do sistema antigo".into()),
        },
    )
    .await?
    .data
    .expect("balance");
    assert_eq!(debt.main_balance, -750);

    let ledger = ledger_repo::list_transactions(&state.orm, customer).await?;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, "SALE");
    assert_eq!(ledger[0].amount, 750);
    Ok(())
}

#[tokio::test]
async fn catalog_price_lookup_reads_current_price() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let product = create_product(&state, "KG", 2290).await?;

    assert_eq!(catalog_repo::get_unit_price(&state.orm, product).await?, Some(2290));
    assert_eq!(catalog_repo::get_unit_price(&state.orm, Uuid::new_v4()).await?, None);
    Ok(())
}
