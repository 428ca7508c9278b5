use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::ledger::{
        CustomerBalance, OpeningBalanceRequest, PackageRegistered, RegisterPackageRequest,
        TransactionList,
    },
    error::AppResult,
    middleware::auth::AuthOperator,
    response::ApiResponse,
    routes::params::Pagination,
    services::ledger_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/balance", get(get_balance))
        .route("/{id}/transactions", get(list_transactions))
        .route("/{id}/packages", post(register_package))
        .route("/{id}/opening-balance", post(record_opening_balance))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/balance",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Balance derived from the ledger", body = ApiResponse<CustomerBalance>),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_balance(
    State(state): State<AppState>,
    _operator: AuthOperator,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CustomerBalance>>> {
    let resp = ledger_service::get_balance(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/transactions",
    params(
        ("id" = Uuid, Path, description = "Customer ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Ledger history, newest first", body = ApiResponse<TransactionList>),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    _operator: AuthOperator,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = ledger_service::list_transactions(&state, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers/{id}/packages",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = RegisterPackageRequest,
    responses(
        (status = 200, description = "Package credited", body = ApiResponse<PackageRegistered>),
        (status = 400, description = "Invalid amounts"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn register_package(
    State(state): State<AppState>,
    operator: AuthOperator,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterPackageRequest>,
) -> AppResult<Json<ApiResponse<PackageRegistered>>> {
    let resp = ledger_service::register_package(&state, &operator, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers/{id}/opening-balance",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = OpeningBalanceRequest,
    responses(
        (status = 200, description = "Opening balance recorded", body = ApiResponse<CustomerBalance>),
        (status = 400, description = "Invalid amount"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn record_opening_balance(
    State(state): State<AppState>,
    operator: AuthOperator,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpeningBalanceRequest>,
) -> AppResult<Json<ApiResponse<CustomerBalance>>> {
    let resp = ledger_service::record_opening_balance(&state, &operator, id, payload).await?;
    Ok(Json(resp))
}
