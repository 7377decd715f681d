/*
 * Responsibility
 * - v1 public surface (routes() re-export)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod response;
mod routes;

pub use routes::routes;
