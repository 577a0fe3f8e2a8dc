/// JWT Authentication Middleware
///
/// Locates the bearer token on a request (the `token` cookie first, then the
/// `Authorization: Bearer` header), verifies it and injects the caller's
/// `Identity` into request extensions for use by route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::cookie::TOKEN_COOKIE;
use crate::auth::TokenService;
use crate::error::{AppError, AuthError};
use crate::models::Identity;

const BEARER_SCHEME: &str = "Bearer";

/// Raw token of the request, if any. A non-empty cookie wins over the header.
pub fn locate_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    // auth schemes are case-insensitive (RFC 7235)
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolve the caller of `req`.
///
/// # Errors
/// - `MissingToken` when neither the cookie nor the header carries a token
/// - `InvalidToken` for any verification failure, expiry included
pub fn authenticate(req: &HttpRequest, tokens: &TokenService) -> Result<Identity, AppError> {
    let token = locate_token(req).ok_or(AuthError::MissingToken)?;
    let identity = tokens.verify(&token)?;
    Ok(identity)
}

/// Guards a scope: requests without a valid token never reach the handlers.
pub struct JwtMiddleware {
    tokens: TokenService,
}

impl JwtMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.request(), &self.tokens) {
            Ok(identity) => {
                tracing::debug!(
                    user_id = identity.id,
                    email = %identity.email,
                    role = %identity.role,
                    "token verified"
                );
                req.extensions_mut().insert(identity);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "request rejected by authentication gate");
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}
