use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::orders::{OrderDetail, OrderList, SaveOrderRequest},
    error::AppResult,
    middleware::auth::AuthOperator,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(save_order))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = SaveOrderRequest,
    responses(
        (status = 200, description = "Order saved; items and payments replaced", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Transaction failure, nothing was written"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn save_order(
    State(state): State<AppState>,
    operator: AuthOperator,
    Json(payload): Json<SaveOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::save_order(&state, &operator, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("customer_id" = Option<uuid::Uuid>, Query, description = "Filter by customer"),
        ("execution_status" = Option<String>, Query, description = "Filter by execution status"),
        ("payment_status" = Option<String>, Query, description = "Filter by payment status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _operator: AuthOperator,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = String, Path, description = "Order code")
    ),
    responses(
        (status = 200, description = "Order with items and payments", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _operator: AuthOperator,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &id).await?;
    Ok(Json(resp))
}
