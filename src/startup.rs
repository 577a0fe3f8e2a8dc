use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::configuration::CookieSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::repository::UserRepository;
use crate::routes::{
    delete_user, get_user, health_check, list_users, signin, signout, signup, update_user,
};
use crate::services::{AccountService, UserService};

/// Malformed or mistyped JSON bodies become ordinary validation failures
fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "rejected request body");
    AppError::from(ValidationError::invalid("body", err.to_string())).into()
}

pub fn run(
    listener: TcpListener,
    repository: Arc<dyn UserRepository>,
    tokens: TokenService,
    cookie_settings: CookieSettings,
) -> Result<Server, std::io::Error> {
    let accounts = web::Data::new(AccountService::new(repository.clone()));
    let users = web::Data::new(UserService::new(repository));
    let tokens_data = web::Data::new(tokens.clone());
    let cookie_data = web::Data::new(cookie_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // Shared state
            .app_data(accounts.clone())
            .app_data(users.clone())
            .app_data(tokens_data.clone())
            .app_data(cookie_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/signin", web::post().to(signin))
                    .route("/signout", web::post().to(signout)),
            )
            // Protected routes
            .service(
                web::scope("/users")
                    .wrap(JwtMiddleware::new(tokens.clone()))
                    .route("", web::get().to(list_users))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::delete().to(delete_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
