mod auth;
mod users;

use actix_web::HttpResponse;

pub use auth::{signin, signout, signup, SigninRequest, SignupRequest};
pub use users::{delete_user, get_user, list_users, update_user, UpdateUserRequest};

/// GET /health_check: liveness only, no store access
pub async fn health_check() -> HttpResponse {
    tracing::debug!("health check");
    HttpResponse::Ok().finish()
}
