/*
 * Responsibility
 * - load settings from the environment (DATABASE_URL, JWT secret, rate limits, CORS)
 * - validate them up front (missing secret means the process does not start)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,

    // HMAC secret shared by token issuance and verification.
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,

    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
    pub trust_proxy_headers: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the secret or the database credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_max_connections", &self.database_max_connections)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        if jwt_secret.len() < 32 {
            tracing::warn!("JWT_SECRET is shorter than 32 bytes; use a longer random secret");
        }

        let access_token_ttl_seconds = parse_or("ACCESS_TOKEN_TTL_SECONDS", 86_400); // 24h
        let refresh_token_ttl_seconds = parse_or("REFRESH_TOKEN_TTL_SECONDS", 604_800); // 7 days
        if access_token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }
        if refresh_token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));
        }

        let rate_limit_per_minute = parse_or("RATE_LIMIT_PER_MINUTE", 100);
        let rate_limit_burst = parse_or("RATE_LIMIT_BURST", 100);
        if rate_limit_per_minute == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_PER_MINUTE"));
        }
        if rate_limit_burst == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_BURST"));
        }

        let trust_proxy_headers = parse_or("TRUST_PROXY_HEADERS", false);

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            rate_limit_per_minute,
            rate_limit_burst,
            trust_proxy_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_accepts_short_and_long_production_names() {
        assert_eq!(AppEnv::parse("prod"), AppEnv::Production);
        assert_eq!(AppEnv::parse("PRODUCTION"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn config_error_names_the_key() {
        assert_eq!(
            ConfigError::Missing("JWT_SECRET").to_string(),
            "missing configuration: JWT_SECRET"
        );
    }
}
