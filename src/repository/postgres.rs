use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::UserRepository;
use crate::error::DatabaseError;
use crate::models::{DeletedUser, NewUser, User, UserChanges, UserRecord};

/// `UserRepository` over a Postgres pool. Schema: `migrations/`.
#[derive(Clone, Debug)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = created.id, email = %created.email, "user row inserted");
        Ok(created)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = $5
            WHERE id = $1
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<Option<DeletedUser>, DatabaseError> {
        let deleted = sqlx::query_as::<_, DeletedUser>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, email, name
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }

    async fn list_all(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
