pub mod auth;
pub mod health;
pub mod portfolio;
pub mod resources;
pub mod users;
