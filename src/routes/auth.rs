/// Authentication Routes
///
/// Handles signup, signin and signout. Tokens are returned in the body and
/// in the `token` cookie.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{removal_cookie, token_cookie};
use crate::auth::TokenService;
use crate::configuration::CookieSettings;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::middleware::authenticate;
use crate::models::{Role, User};
use crate::services::{AccountService, Signup};
use crate::validators::{
    collect, is_valid_email, is_valid_name, is_valid_password, is_valid_role,
};

/// Value of a mandatory body field; trimming is left to the field validator
fn required(field: &str, value: &Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ValidationError::EmptyField(field.to_string())),
    }
}

/// User signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl SignupRequest {
    /// Check every field, reporting all failures at once
    pub fn validate(&self) -> Result<Signup, AppError> {
        let mut errors = Vec::new();

        let name = collect(
            required("name", &self.name).and_then(|n| is_valid_name(&n)),
            &mut errors,
        );
        let email = collect(
            required("email", &self.email).and_then(|e| is_valid_email(&e)),
            &mut errors,
        );
        let password = collect(
            required("password", &self.password).and_then(|p| is_valid_password(&p).map(|_| p)),
            &mut errors,
        );
        let role = match &self.role {
            Some(role) => collect(is_valid_role(role), &mut errors),
            None => Some(Role::default()),
        };

        match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) if errors.is_empty() => {
                Ok(Signup {
                    name,
                    email,
                    password,
                    role,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// User signin request
#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SigninRequest {
    pub fn validate(&self) -> Result<(String, String), AppError> {
        let mut errors = Vec::new();

        let email = collect(
            required("email", &self.email).and_then(|e| is_valid_email(&e)),
            &mut errors,
        );
        let password = collect(required("password", &self.password), &mut errors);

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Serialize)]
pub struct SignupUser {
    pub id: i32,
    pub name: String,
    pub role: Role,
    pub token: String,
}

#[derive(Serialize)]
pub struct SigninUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

#[derive(Serialize)]
pub struct AuthResponse<U> {
    pub message: &'static str,
    pub user: U,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /auth/signup
///
/// Register a new account. `role` defaults to `user`; `admin` requires the
/// caller to present an admin token.
///
/// # Errors
/// - 400: Validation errors
/// - 401: `role: admin` without a valid token
/// - 403: `role: admin` requested by a non-admin
/// - 409: Email already registered
/// - 500: Internal server error
pub async fn signup(
    req: HttpRequest,
    body: web::Json<SignupRequest>,
    accounts: web::Data<AccountService>,
    tokens: web::Data<TokenService>,
    cookie_settings: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("signup");

    let signup = context.trace(body.validate())?;

    // the caller only matters when an elevated account is requested
    let actor = if signup.role == Role::Admin {
        Some(context.trace(authenticate(&req, &tokens))?)
    } else {
        None
    };
    let context = match &actor {
        Some(actor) => context.with_user_id(actor.id),
        None => context,
    };

    let user: User = context.trace(accounts.signup(signup, actor.as_ref()).await)?;
    let token = context.trace(tokens.issue(&user.identity()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        role = %user.role,
        "User registered successfully"
    );

    let mut response = HttpResponse::Created();
    // an admin creating another admin keeps their own session
    if actor.is_none() {
        response.cookie(token_cookie(&token, tokens.expiry_seconds(), &cookie_settings));
    }

    Ok(response.json(AuthResponse {
        message: "User registered",
        user: SignupUser {
            id: user.id,
            name: user.name,
            role: user.role,
            token,
        },
    }))
}

/// POST /auth/signin
///
/// # Errors
/// - 400: Validation error
/// - 401: Invalid credentials; unknown email and wrong password are
///   reported identically
pub async fn signin(
    body: web::Json<SigninRequest>,
    accounts: web::Data<AccountService>,
    tokens: web::Data<TokenService>,
    cookie_settings: web::Data<CookieSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("signin");

    let (email, password) = context.trace(body.validate())?;
    let user = context.trace(accounts.signin(&email, &password).await)?;
    let context = context.with_user_id(user.id);
    let token = context.trace(tokens.issue(&user.identity()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "User signed in successfully"
    );

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(&token, tokens.expiry_seconds(), &cookie_settings))
        .json(AuthResponse {
            message: "User signed in successfully",
            user: SigninUser {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
                token,
            },
        }))
}

/// POST /auth/signout
///
/// Tokens are stateless, so this only tells the client to drop its cookie.
pub async fn signout(cookie_settings: web::Data<CookieSettings>) -> HttpResponse {
    tracing::info!("User signed out");

    HttpResponse::Ok()
        .cookie(removal_cookie(&cookie_settings))
        .json(MessageResponse {
            message: "User signed out successfully",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(name: &str, email: &str, password: &str, role: Option<&str>) -> SignupRequest {
        SignupRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn signup_normalizes_and_defaults_role() {
        let signup = signup_request("  Jane Doe ", " Jane@Example.COM ", "secret1", None)
            .validate()
            .unwrap();

        assert_eq!(signup.name, "Jane Doe");
        assert_eq!(signup.email, "jane@example.com");
        assert_eq!(signup.role, Role::User);
    }

    #[test]
    fn signup_reports_every_bad_field() {
        let err = signup_request("J", "not-an-email", "123", Some("root"))
            .validate()
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
                assert_eq!(fields, vec!["name", "email", "password", "role"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn signup_missing_fields_are_required() {
        let request = SignupRequest {
            name: None,
            email: None,
            password: None,
            role: None,
        };
        match request.validate().unwrap_err() {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.contains(&ValidationError::EmptyField("password".into())));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn signin_requires_password() {
        let request = SigninRequest {
            email: Some("jane@example.com".into()),
            password: Some(String::new()),
        };
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));
    }
}
