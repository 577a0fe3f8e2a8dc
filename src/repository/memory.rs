use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::UserRepository;
use crate::error::DatabaseError;
use crate::models::{DeletedUser, NewUser, User, UserChanges, UserRecord};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, UserRecord>,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|row| row.email == email && Some(row.id) != except)
    }
}

/// In-process `UserRepository` with the same unique-email constraint as the
/// Postgres schema. Every operation runs under one lock, so check-then-write
/// is atomic.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> DatabaseError {
    DatabaseError::UniqueConstraintViolation("users_email_key".to_string())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().find(|row| row.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).cloned().map(UserRecord::into_public))
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut table = self.table.lock().await;
        if table.email_taken(&user.email, None) {
            return Err(duplicate_email());
        }

        table.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: table.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(record.id, record.clone());

        Ok(record.into_public())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut table = self.table.lock().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if table.email_taken(email, Some(id)) {
                return Err(duplicate_email());
            }
        }

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(role) = changes.role {
            row.role = role;
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone().into_public()))
    }

    async fn delete(&self, id: i32) -> Result<Option<DeletedUser>, DatabaseError> {
        let mut table = self.table.lock().await;
        Ok(table.rows.remove(&id).map(|row| DeletedUser {
            id: row.id,
            email: row.email,
            name: row.name,
        }))
    }

    async fn list_all(&self) -> Result<Vec<User>, DatabaseError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .cloned()
            .map(UserRecord::into_public)
            .collect())
    }
}
