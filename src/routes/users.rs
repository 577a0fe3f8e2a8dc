/// User management routes
///
/// Mounted behind the authentication gate, so every handler receives the
/// caller's `Identity` from request extensions. Order of checks: input
/// validation, then the access policy, then existence.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorContext, ValidationError};
use crate::models::{DeletedUser, Identity, User, UserChanges};
use crate::services::UserService;
use crate::validators::{collect, is_valid_email, is_valid_name, is_valid_role, is_valid_user_id};

/// Partial profile update; absent fields are left untouched
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<UserChanges, AppError> {
        let mut errors = Vec::new();

        let changes = UserChanges {
            name: self
                .name
                .as_deref()
                .and_then(|name| collect(is_valid_name(name), &mut errors)),
            email: self
                .email
                .as_deref()
                .and_then(|email| collect(is_valid_email(email), &mut errors)),
            role: self
                .role
                .as_deref()
                .and_then(|role| collect(is_valid_role(role), &mut errors)),
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        if changes.is_empty() {
            return Err(ValidationError::invalid(
                "body",
                "at least one of name, email or role is required",
            )
            .into());
        }

        Ok(changes)
    }
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub message: &'static str,
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct UserResponse<U> {
    pub message: &'static str,
    pub user: U,
}

/// GET /users
///
/// Admin only.
pub async fn list_users(
    identity: web::ReqData<Identity>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("list_users").with_user_id(identity.id);

    let users = context.trace(users.list(&identity).await)?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        message: "Successfully retrieved users",
        count: users.len(),
        users,
    }))
}

/// GET /users/{id}
///
/// # Errors
/// - 400: malformed id
/// - 403: not self and not admin
/// - 404: no such user
pub async fn get_user(
    path: web::Path<String>,
    identity: web::ReqData<Identity>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("get_user").with_user_id(identity.id);

    let target_id = context.trace(is_valid_user_id(&path).map_err(AppError::from))?;
    let user = context.trace(users.get(&identity, target_id).await)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        message: "User retrieved successfully",
        user,
    }))
}

/// PUT /users/{id}
///
/// Only administrators may send `role`; a non-admin request carrying it is
/// rejected as a whole.
///
/// # Errors
/// - 400: malformed id or body
/// - 403: not self and not admin, or role change by a non-admin
/// - 404: no such user
/// - 409: email taken by another account
pub async fn update_user(
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
    identity: web::ReqData<Identity>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("update_user").with_user_id(identity.id);

    let target_id = context.trace(is_valid_user_id(&path).map_err(AppError::from))?;
    let changes = context.trace(body.validate())?;
    let user = context.trace(users.update(&identity, target_id, changes).await)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        message: "User updated successfully",
        user,
    }))
}

/// DELETE /users/{id}
///
/// # Errors
/// - 400: malformed id
/// - 403: not self and not admin, or an admin deleting themselves
/// - 404: no such user
pub async fn delete_user(
    path: web::Path<String>,
    identity: web::ReqData<Identity>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("delete_user").with_user_id(identity.id);

    let target_id = context.trace(is_valid_user_id(&path).map_err(AppError::from))?;
    let deleted: DeletedUser = context.trace(users.delete(&identity, target_id).await)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        message: "User deleted successfully",
        user: deleted,
    }))
}
