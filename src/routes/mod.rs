use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod doc;
pub mod employees;
pub mod health;
pub mod orders;
pub mod outlets;
pub mod products;
pub mod reports;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/customers", orders::customer_router())
        .nest("/reports", reports::router())
        .nest("/employees", employees::router())
        .nest("/outlets", outlets::router())
}
