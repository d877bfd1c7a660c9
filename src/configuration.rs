use config::ConfigError;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

/// Which deployment the process runs in
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Destructive admin operations are allowed
    Dev,
    Prod,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub platform: Platform,
    pub storage: StorageBackend,
    /// Directory served under `/app/`
    pub static_dir: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    /// Server-level connection, for creating databases
    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Credential settings
#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_days: i64,
    /// Shared secret of the payment provider's webhook
    pub polka_key: String,
}

/// Longest accepted access token lifetime (one day)
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 86_400;
/// Longest accepted refresh token lifetime (ten years)
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3_650;

impl AuthSettings {
    /// Clamped to `1..=MAX_ACCESS_TOKEN_TTL_SECONDS`; `validate` rejects values outside it
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(
            self.access_token_ttl_seconds
                .clamp(1, MAX_ACCESS_TOKEN_TTL_SECONDS),
        )
    }

    /// Clamped to `1..=MAX_REFRESH_TOKEN_TTL_DAYS`; `validate` rejects values outside it
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_ttl_days.clamp(1, MAX_REFRESH_TOKEN_TTL_DAYS))
    }

    /// # Errors
    /// `AppError::Config` naming the first unusable value
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::Config("auth.jwt_secret must be set".to_string()));
        }
        if self.polka_key.trim().is_empty() {
            return Err(AppError::Config("auth.polka_key must be set".to_string()));
        }
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&self.access_token_ttl_seconds) {
            return Err(AppError::Config(format!(
                "auth.access_token_ttl_seconds must be between 1 and {}",
                MAX_ACCESS_TOKEN_TTL_SECONDS
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.refresh_token_ttl_days) {
            return Err(AppError::Config(format!(
                "auth.refresh_token_ttl_days must be between 1 and {}",
                MAX_REFRESH_TOKEN_TTL_DAYS
            )));
        }
        Ok(())
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("polka_key", &"[redacted]")
            .finish()
    }
}

/// Load settings from `configuration.yaml` overlaid with `APP_*` environment
/// variables, e.g. `APP_AUTH__JWT_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .set_default("application.platform", "prod")?
        .set_default("application.storage", "postgres")?
        .set_default("application.static_dir", "./public")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.issuer", "chirpy-access")?
        .set_default("auth.access_token_ttl_seconds", 3600)?
        .set_default("auth.refresh_token_ttl_days", 60)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
