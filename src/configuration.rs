/// Service configuration
///
/// Sources, lowest precedence first:
/// 1. built-in defaults
/// 2. `configuration.yaml` (optional) in the working directory
/// 3. `APP_<SECTION>__<KEY>` environment variables, e.g. `APP_JWT__SECRET`
/// 4. `JWT_SECRET` and `APP_ENVIRONMENT`

use crate::error::ConfigError;

/// Built-in signing secret. Refused in production.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-please-change-in-production";

const MIN_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub cookie: CookieSettings,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Serve from the in-process store instead of Postgres
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    /// seconds (86400 = 1 day)
    pub token_expiry: i64,
    pub issuer: String,
}

/// Token cookie settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct CookieSettings {
    /// Only send the cookie over HTTPS
    pub secure: bool,
}

impl Settings {
    /// Rejects the built-in or a short signing secret in production and
    /// nonsensical token lifetimes everywhere.
    pub fn check_secret(&self) -> Result<(), ConfigError> {
        if self.jwt.token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.token_expiry must be positive".to_string(),
            ));
        }

        if self.jwt.secret == DEFAULT_JWT_SECRET {
            if self.application.environment == Environment::Production {
                return Err(ConfigError::Insecure(
                    "the default JWT secret cannot be used in production; set JWT_SECRET".to_string(),
                ));
            }
            tracing::warn!("using the built-in JWT secret; set JWT_SECRET before deploying");
        } else if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            if self.application.environment == Environment::Production {
                return Err(ConfigError::Insecure(format!(
                    "the JWT secret must be at least {} bytes in production",
                    MIN_SECRET_LENGTH
                )));
            }
            tracing::warn!(
                length = self.jwt.secret.len(),
                "JWT secret is shorter than {} bytes",
                MIN_SECRET_LENGTH
            );
        }

        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080_i64)?
        .set_default("application.environment", "local")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "password")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432_i64)?
        .set_default("database.database_name", "users")?
        .set_default("database.in_memory", false)?
        .set_default("jwt.secret", DEFAULT_JWT_SECRET)?
        .set_default("jwt.token_expiry", 86_400_i64)?
        .set_default("jwt.issuer", "acl-service")?
        .set_default("cookie.secure", false)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
        .set_override_option("application.environment", std::env::var("APP_ENVIRONMENT").ok())?
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.check_secret()?;
    Ok(settings)
}
