/// Persistence collaborator for the `users` table
///
/// The repository exclusively owns stored users; callers only get transient
/// copies. `find_by_email` is the single operation that hands out the
/// password hash, everything else returns the public projection.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::models::{DeletedUser, NewUser, User, UserChanges, UserRecord};

pub use memory::InMemoryUserRepository;
pub use postgres::PostgresUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError>;

    /// Inserts a user; a taken email yields `UniqueConstraintViolation`
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Applies `changes` and bumps `updated_at`; `None` when the id is unknown
    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DatabaseError>;

    /// Removes the user; `None` when the id is unknown
    async fn delete(&self, id: i32) -> Result<Option<DeletedUser>, DatabaseError>;

    async fn list_all(&self) -> Result<Vec<User>, DatabaseError>;
}
