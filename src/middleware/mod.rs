/*
 * Responsibility
 * - tower/axum layers, each exposed as `apply(router, ...)`
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod rate_limit;
