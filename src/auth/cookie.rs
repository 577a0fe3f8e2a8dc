/// Token cookie helpers

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::configuration::CookieSettings;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Cookie carrying `token`, living as long as the token itself
pub fn token_cookie(token: &str, max_age_seconds: i64, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Expired cookie that makes the client drop its token
pub fn removal_cookie(settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Strict)
        .finish();
    cookie.make_removal();
    cookie
}
