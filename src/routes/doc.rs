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
    dto::{
        auth::{SignInRequest, SignInResponse, SignUpRequest},
        employees::{CreateEmployeeRequest, EmployeeList},
        orders::{
            CustomerDetails, CustomerList, LineItem, OrderLineList, PlaceOrderRequest,
            PlacementOutcome, PlacementStatus, StockWarning,
        },
        outlets::{CreateOutletRequest, OutletList},
        products::{CreateProductRequest, ProductList, RestockRequest},
        reports::{DashboardCounters, SalesReport, SalesReportEntry, StockLevel, StockLevels},
    },
    models::{Customer, Employee, OrderLine, Outlet, Owner, Product},
    response::{ApiResponse, Meta},
    routes::{auth, employees, health, orders, outlets, products, reports},
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
        health::readiness,
        auth::signup,
        auth::signin,
        products::list_products,
        products::create_product,
        products::get_product,
        products::delete_product,
        products::restock_product,
        products::stock_levels,
        orders::place_order,
        orders::list_order_lines,
        orders::list_customers,
        reports::sales_report,
        reports::dashboard,
        employees::list_employees,
        employees::add_employee,
        employees::remove_employee,
        outlets::list_outlets,
        outlets::add_outlet
    ),
    components(
        schemas(
            Owner,
            Product,
            OrderLine,
            Customer,
            Employee,
            Outlet,
            SignUpRequest,
            SignInRequest,
            SignInResponse,
            CreateProductRequest,
            RestockRequest,
            ProductList,
            LineItem,
            CustomerDetails,
            PlaceOrderRequest,
            PlacementStatus,
            StockWarning,
            PlacementOutcome,
            CustomerList,
            OrderLineList,
            SalesReportEntry,
            SalesReport,
            DashboardCounters,
            StockLevel,
            StockLevels,
            CreateEmployeeRequest,
            EmployeeList,
            CreateOutletRequest,
            OutletList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<PlacementOutcome>,
            ApiResponse<SalesReport>,
            ApiResponse<DashboardCounters>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Store owner sign up and sign in"),
        (name = "Products", description = "Products and stock on hand"),
        (name = "Orders", description = "Order placement, ledger and customers"),
        (name = "Reports", description = "Sales report and dashboard counters"),
        (name = "Employees", description = "Employee records"),
        (name = "Outlets", description = "Outlet locations"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
