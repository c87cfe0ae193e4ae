pub mod auth;
pub mod employees;
pub mod orders;
pub mod outlets;
pub mod products;
pub mod reports;
