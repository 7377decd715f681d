//! Password hashing via bcrypt, off the async runtime.

use tokio::task;

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "bcrypt hash failed");
                AppError::Internal
            })
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password verification task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "bcrypt verify failed");
                AppError::Internal
            })
    }
}
