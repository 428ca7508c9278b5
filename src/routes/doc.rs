use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{Balance, ExecutionStatus, PaymentStatus},
    dto::{
        auth::{LoginRequest, LoginResponse},
        ledger::{CustomerBalance, OpeningBalanceRequest, PackageRegistered, RegisterPackageRequest, TransactionList},
        orders::{OrderDetail, OrderItemInput, OrderList, PaymentInput, SaveOrderRequest},
    },
    models::{LedgerTransaction, Operator, Order, OrderItem, OrderPayment},
    response::{ApiResponse, Meta},
    routes::{auth, customers, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        orders::save_order,
        orders::list_orders,
        orders::get_order,
        customers::get_balance,
        customers::list_transactions,
        customers::register_package,
        customers::record_opening_balance
    ),
    components(
        schemas(
            Operator,
            Order,
            OrderItem,
            OrderPayment,
            LedgerTransaction,
            Balance,
            ExecutionStatus,
            PaymentStatus,
            LoginRequest,
            LoginResponse,
            SaveOrderRequest,
            OrderItemInput,
            PaymentInput,
            OrderDetail,
            OrderList,
            RegisterPackageRequest,
            PackageRegistered,
            OpeningBalanceRequest,
            CustomerBalance,
            TransactionList,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<CustomerBalance>,
            ApiResponse<TransactionList>,
            ApiResponse<PackageRegistered>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Operator authentication"),
        (name = "Orders", description = "Order intake and payment"),
        (name = "Customers", description = "Customer credit ledger"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
