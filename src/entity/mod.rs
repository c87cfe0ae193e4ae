pub mod customers;
pub mod employees;
pub mod order_lines;
pub mod outlets;
pub mod owners;
pub mod products;

pub use customers::Entity as Customers;
pub use employees::Entity as Employees;
pub use order_lines::Entity as OrderLines;
pub use outlets::Entity as Outlets;
pub use owners::Entity as Owners;
pub use products::Entity as Products;
