/// Error handling module
///
/// Every failure in the service is expressed as an `AppError`. Domain
/// specific errors (validation, persistence, authentication, configuration)
/// convert into it with `?`, and `AppError` renders itself as a JSON error
/// payload through actix-web's `ResponseError`.
///
/// Status mapping:
/// - Validation -> 400, with per-field details
/// - Auth -> 401
/// - Forbidden -> 403, with the policy's reason
/// - NotFound -> 404
/// - Unique constraint violation -> 409
/// - everything else -> 500, message is the label only

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField(field)
            | ValidationError::TooShort(field, _)
            | ValidationError::TooLong(field, _)
            | ValidationError::InvalidFormat(field)
            | ValidationError::Invalid { field, .. } => field,
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Database operation errors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Duplicate entry: {0}")]
    UniqueConstraintViolation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Query error: {0}")]
    QueryExecution(String),
    #[error("Database connection error: {0}")]
    ConnectionPool(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            _ => DatabaseError::QueryExecution(err.to_string()),
        }
    }
}

/// Authentication errors.
///
/// Token failures deliberately collapse into `InvalidToken`: callers never
/// learn whether the signature, the structure or the expiry was at fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Insecure configuration: {0}")]
    Insecure(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed ({} field errors)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Crypto failure: {0}")]
    Crypto(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }

    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".to_string())
    }

    pub fn duplicate_email() -> Self {
        AppError::Database(DatabaseError::UniqueConstraintViolation(
            "Email already exists".to_string(),
        ))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(vec![err])
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// One entry of the `details` list on a validation failure
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Taxonomy label
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(error_id: String, error: &str, message: String, code: &str, status: StatusCode) -> Self {
        Self {
            error_id,
            error: error.to_string(),
            message,
            code: code.to_string(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<FieldErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = ResponseError::status_code(self);
        let id = request_id.to_string();

        let response = match self {
            AppError::Validation(errors) => {
                let details = errors
                    .iter()
                    .map(|e| FieldErrorDetail {
                        field: e.field().to_string(),
                        message: e.to_string(),
                    })
                    .collect();
                ErrorResponse::new(
                    id,
                    "Validation failed",
                    "Request payload failed validation".to_string(),
                    "VALIDATION_ERROR",
                    status,
                )
                .with_details(details)
            }
            AppError::Auth(e) => {
                let code = match e {
                    AuthError::MissingToken => "UNAUTHORIZED",
                    AuthError::InvalidToken => "TOKEN_INVALID",
                    AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                };
                ErrorResponse::new(id, "Unauthorized", e.to_string(), code, status)
            }
            AppError::Forbidden(reason) => {
                ErrorResponse::new(id, "Forbidden", reason.clone(), "FORBIDDEN", status)
            }
            AppError::NotFound(msg) | AppError::Database(DatabaseError::NotFound(msg)) => {
                ErrorResponse::new(id, "Not found", msg.clone(), "NOT_FOUND", status)
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => ErrorResponse::new(
                id,
                "Conflict",
                "Email already exists".to_string(),
                "CONFLICT",
                status,
            ),
            AppError::Database(_)
            | AppError::Crypto(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorResponse::new(
                id,
                "Internal server error",
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
                status,
            ),
        };

        (status, response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(errors) => {
                tracing::warn!(request_id = request_id, errors = ?errors, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Forbidden(reason) => {
                tracing::warn!(request_id = request_id, reason = %reason, "Authorization denied");
            }
            AppError::NotFound(_) | AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::info!(request_id = request_id, error = %self, "Resource not found");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            _ => {
                tracing::error!(request_id = request_id, error = %self, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = crate::logger::current_request_id();
        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Crypto(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Error context for logging failures with the acting user and operation
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<i32>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: crate::logger::current_request_id(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn log_error(&self, error: &AppError) {
        let span = tracing::warn_span!(
            "request_failure",
            operation = %self.operation,
            user_id = ?self.user_id,
        );
        let _entered = span.enter();
        error.log_error(&self.request_id);
    }

    /// Logs the error of a failed result with this context and passes it on
    pub fn trace<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        result.map_err(|e| {
            self.log_error(&e);
            e
        })
    }
}
