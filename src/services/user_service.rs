/*
 * Responsibility
 * - users read/update/delete
 * - a user may change only their own record; admins may change any
 */
use crate::api::v1::dto::{Validate, users::UpdateUserRequest};
use crate::error::AppError;
use crate::repos::resource::Page;
use crate::repos::user_repo::{UserRepo, UserRow};
use crate::services::auth::gate::Principal;
use crate::services::auth::password::PasswordHasher;
use crate::services::ownership::authorize_mutation;
use crate::types::{Role, UserId};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepo,
    hasher: PasswordHasher,
}

fn authorize_user_mutation(target: &UserRow, principal: &Principal) -> Result<(), AppError> {
    match authorize_mutation(target, principal.id) {
        Ok(()) => Ok(()),
        Err(_) => principal.require_role(Role::Admin),
    }
}

impl UserService {
    pub fn new(repo: UserRepo, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<UserRow>, AppError> {
        Ok(self.repo.list(page).await?)
    }

    pub async fn get(&self, id: UserId) -> Result<UserRow, AppError> {
        self.repo.get(id).await?.ok_or(AppError::not_found("User"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: UserId,
        req: UpdateUserRequest,
    ) -> Result<UserRow, AppError> {
        req.validate().map_err(AppError::bad_request)?;

        let target = self.get(id).await?;
        authorize_user_mutation(&target, principal)?;

        let password_hash = match req.password.as_deref() {
            Some(pw) => Some(self.hasher.hash(pw).await?),
            None => None,
        };

        self.repo
            .update(id, req.name.as_deref().map(str::trim), password_hash.as_deref())
            .await?
            .ok_or(AppError::not_found("User"))
    }

    pub async fn delete(&self, principal: &Principal, id: UserId) -> Result<(), AppError> {
        let target = self.get(id).await?;
        authorize_user_mutation(&target, principal)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("User"));
        }
        tracing::info!(user_id = %id, acting = %principal.id, "user deleted");
        Ok(())
    }
}
