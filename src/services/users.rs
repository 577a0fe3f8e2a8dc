use std::sync::Arc;

use crate::auth::{authorize, Operation};
use crate::error::AppError;
use crate::models::{DeletedUser, Identity, User, UserChanges};
use crate::repository::UserRepository;

/// User management on behalf of an authenticated caller.
///
/// Every operation consults the policy before touching the store, so a
/// denied caller learns nothing about whether the target exists.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, actor: &Identity) -> Result<Vec<User>, AppError> {
        authorize(actor, Operation::ListUsers)?;
        let users = self.repository.list_all().await?;
        tracing::info!(actor_id = actor.id, count = users.len(), "users listed");
        Ok(users)
    }

    pub async fn get(&self, actor: &Identity, target_id: i32) -> Result<User, AppError> {
        authorize(actor, Operation::ReadUser { target_id })?;
        self.repository
            .find_by_id(target_id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    /// Apply a partial update. A taken email surfaces as a unique constraint
    /// violation from the store.
    pub async fn update(
        &self,
        actor: &Identity,
        target_id: i32,
        changes: UserChanges,
    ) -> Result<User, AppError> {
        authorize(
            actor,
            Operation::UpdateUser {
                target_id,
                role_change: changes.role,
            },
        )?;

        let user = self
            .repository
            .update(target_id, changes)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        tracing::info!(actor_id = actor.id, user_id = user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, actor: &Identity, target_id: i32) -> Result<DeletedUser, AppError> {
        authorize(actor, Operation::DeleteUser { target_id })?;

        let deleted = self
            .repository
            .delete(target_id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        tracing::info!(actor_id = actor.id, user_id = deleted.id, email = %deleted.email, "user deleted");
        Ok(deleted)
    }
}
