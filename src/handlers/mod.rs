pub mod dashboard;
pub mod health;
pub mod public;
pub mod users;
