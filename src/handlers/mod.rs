pub mod common;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;
