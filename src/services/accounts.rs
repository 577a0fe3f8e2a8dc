/// Account lifecycle: signup and signin.
///
/// Signout is stateless (the client drops its token) and has no service
/// counterpart.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::auth::{authorize, hash_password, verify_password, Operation};
use crate::error::{AppError, AuthError};
use crate::models::{Identity, NewUser, Role, User};
use crate::repository::UserRepository;

lazy_static! {
    // Verified against when the email is unknown so both signin failures cost
    // one bcrypt comparison.
    static ref UNKNOWN_USER_HASH: Option<String> = hash_password("unknown-user-placeholder").ok();
}

/// Validated signup input
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn UserRepository>,
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Crypto(format!("hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Crypto(format!("verification task failed: {}", e)))?
}

impl AccountService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Create an account.
    ///
    /// `actor` is the authenticated caller, if any. Creating an `admin`
    /// account requires an admin caller.
    ///
    /// # Errors
    /// - `Auth(MissingToken)` when an admin account is requested anonymously
    /// - `Forbidden` when a non-admin requests an admin account
    /// - unique constraint violation when the email is taken
    pub async fn signup(&self, signup: Signup, actor: Option<&Identity>) -> Result<User, AppError> {
        if signup.role == Role::Admin {
            let actor = actor.ok_or(AuthError::MissingToken)?;
            authorize(actor, Operation::CreateUser { role: signup.role })?;
        }

        if self.repository.find_by_email(&signup.email).await?.is_some() {
            tracing::warn!(email = %signup.email, "signup with existing email");
            return Err(AppError::duplicate_email());
        }

        let password_hash = hash_blocking(signup.password).await?;

        // a concurrent signup for the same email still fails here, on the
        // unique constraint
        let user = self
            .repository
            .insert(NewUser {
                name: signup.name,
                email: signup.email,
                password_hash,
                role: signup.role,
            })
            .await?;

        tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "user created");
        Ok(user)
    }

    /// Check credentials.
    ///
    /// Unknown email and wrong password both yield
    /// `Auth(InvalidCredentials)`.
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AppError> {
        let record = self.repository.find_by_email(email).await?;

        let Some(record) = record else {
            if let Some(placeholder) = UNKNOWN_USER_HASH.clone() {
                verify_blocking(password.to_string(), placeholder).await?;
            }
            tracing::warn!(email = %email, "signin for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = verify_blocking(password.to_string(), record.password_hash.clone()).await?;
        if !valid {
            tracing::warn!(email = %email, user_id = record.id, "signin with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!(user_id = record.id, email = %email, "user authenticated");
        Ok(record.into_public())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::repository::InMemoryUserRepository;

    fn service() -> (AccountService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (AccountService::new(repo.clone()), repo)
    }

    fn signup(email: &str, role: Role) -> Signup {
        Signup {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            password: "correct-horse".to_string(),
            role,
        }
    }

    fn admin() -> Identity {
        Identity {
            id: 100,
            email: "root@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn signup_then_signin() {
        let (service, repo) = service();
        let created = service.signup(signup("jane@example.com", Role::User), None).await.unwrap();

        assert_eq!(created.role, Role::User);
        let stored = repo.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "correct-horse");

        let signed_in = service.signin("jane@example.com", "correct-horse").await.unwrap();
        assert_eq!(signed_in.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_signup_is_conflict() {
        let (service, repo) = service();
        service.signup(signup("jane@example.com", Role::User), None).await.unwrap();

        let err = service
            .signup(signup("jane@example.com", Role::User), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Database(DatabaseError::UniqueConstraintViolation(_))
        ));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn signin_failures_are_indistinguishable() {
        let (service, _) = service();
        service.signup(signup("jane@example.com", Role::User), None).await.unwrap();

        let wrong_password = service.signin("jane@example.com", "nope-nope").await.unwrap_err();
        let unknown_email = service.signin("ghost@example.com", "correct-horse").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::Auth(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, AppError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn admin_signup_requires_admin_caller() {
        let (service, repo) = service();

        let anonymous = service.signup(signup("a@example.com", Role::Admin), None).await;
        assert!(matches!(anonymous, Err(AppError::Auth(AuthError::MissingToken))));

        let plain = Identity { role: Role::User, ..admin() };
        let by_user = service.signup(signup("a@example.com", Role::Admin), Some(&plain)).await;
        assert!(matches!(by_user, Err(AppError::Forbidden(_))));
        assert!(repo.list_all().await.unwrap().is_empty());

        let created = service
            .signup(signup("a@example.com", Role::Admin), Some(&admin()))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Admin);
    }
}
