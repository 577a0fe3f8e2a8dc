//! `PostgresUserRepository` against a live database.
//!
//! Needs the Postgres described by `configuration.yaml` / `APP_DATABASE__*`:
//! `cargo test --test postgres_repository -- --ignored`

use acl_service::configuration::get_configuration;
use acl_service::error::DatabaseError;
use acl_service::models::{NewUser, Role, UserChanges};
use acl_service::repository::{PostgresUserRepository, UserRepository};
use sqlx::PgPool;

async fn repository() -> PostgresUserRepository {
    let configuration = get_configuration().expect("Failed to read configuration.");
    let pool = PgPool::connect(&configuration.database.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate the database.");
    PostgresUserRepository::new(pool)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Postgres User".to_string(),
        email: email.to_string(),
        password_hash: "$2b$10$placeholder".to_string(),
        role: Role::User,
    }
}

fn unique_email() -> String {
    format!("{}@example.com", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_email_is_a_unique_violation() {
    let repo = repository().await;
    let email = unique_email();

    repo.insert(new_user(&email)).await.expect("first insert");
    let err = repo.insert(new_user(&email)).await.unwrap_err();

    assert!(matches!(err, DatabaseError::UniqueConstraintViolation(_)));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn partial_update_keeps_untouched_columns() {
    let repo = repository().await;
    let email = unique_email();
    let user = repo.insert(new_user(&email)).await.unwrap();

    let changes = UserChanges {
        role: Some(Role::Admin),
        ..UserChanges::default()
    };
    let updated = repo.update(user.id, changes).await.unwrap().expect("row exists");

    assert_eq!(updated.name, "Postgres User");
    assert_eq!(updated.email, email);
    assert_eq!(updated.role, Role::Admin);
    assert!(updated.updated_at >= user.updated_at);

    let missing = repo.update(-1, UserChanges::default()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn delete_returns_summary_once() {
    let repo = repository().await;
    let email = unique_email();
    let user = repo.insert(new_user(&email)).await.unwrap();

    let deleted = repo.delete(user.id).await.unwrap().expect("row exists");
    assert_eq!(deleted.email, email);
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    assert!(repo.delete(user.id).await.unwrap().is_none());
}
