/*
 * Responsibility
 * - tokio runtime bootstrap
 * - delegates to app::run() (no logic here)
 */
use anyhow::Result;

mod api;
mod app;
mod config;
mod error;
mod middleware;
mod repos;
mod services;
mod state;
#[cfg(test)]
mod testing;
mod types;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
