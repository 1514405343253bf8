/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: String,
    pub db_max_connections: u32,
    // development only: drop + recreate + seed the drinks table on start
    pub db_reset_on_start: bool,

    pub auth_domain: String,
    pub auth_audience: String,
    pub auth_issuer: String,
    pub auth_algorithms: Vec<Algorithm>,
    pub auth_jwks_url: Url,
    pub access_token_leeway_seconds: u64,
    pub jwks_refresh_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let db_reset_on_start = std::env::var("DB_RESET_ON_START")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth_domain =
            std::env::var("AUTH0_DOMAIN").map_err(|_| ConfigError::Missing("AUTH0_DOMAIN"))?;
        if auth_domain.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH0_DOMAIN"));
        }

        let auth_audience =
            std::env::var("API_AUDIENCE").map_err(|_| ConfigError::Missing("API_AUDIENCE"))?;

        let auth_issuer =
            std::env::var("AUTH_ISSUER").unwrap_or_else(|_| default_issuer(&auth_domain));

        let auth_algorithms = parse_algorithms(
            &std::env::var("AUTH_ALGORITHMS").unwrap_or_else(|_| "RS256".to_string()),
        )?;

        let auth_jwks_url = std::env::var("AUTH_JWKS_URL")
            .unwrap_or_else(|_| default_jwks_url(&auth_domain));
        let auth_jwks_url =
            Url::parse(&auth_jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let jwks_refresh_seconds = std::env::var("JWKS_REFRESH_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            db_max_connections,
            db_reset_on_start,
            auth_domain,
            auth_audience,
            auth_issuer,
            auth_algorithms,
            auth_jwks_url,
            access_token_leeway_seconds,
            jwks_refresh_seconds,
        })
    }

    /// Schema reset is a development convenience and is never honored in production.
    pub fn should_reset_store(&self) -> bool {
        self.db_reset_on_start && !self.app_env.is_production()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_issuer(domain: &str) -> String {
    format!("https://{}/", domain.trim_end_matches('/'))
}

fn default_jwks_url(domain: &str) -> String {
    format!("https://{}/.well-known/jwks.json", domain.trim_end_matches('/'))
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = split_list(raw)
        .iter()
        .map(|s| Algorithm::from_str(s).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS")))
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }
    Ok(algorithms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_accepts_short_production_name() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn issuer_and_jwks_url_derive_from_domain() {
        assert_eq!(default_issuer("tenant.auth0.com"), "https://tenant.auth0.com/");
        assert_eq!(
            default_jwks_url("tenant.auth0.com/"),
            "https://tenant.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn algorithms_parse_comma_separated_list() {
        let algs = parse_algorithms("RS256, ES256").unwrap();
        assert_eq!(algs, vec![Algorithm::RS256, Algorithm::ES256]);
    }

    #[test]
    fn algorithms_reject_unknown_or_empty() {
        assert!(matches!(
            parse_algorithms("HS999"),
            Err(ConfigError::Invalid("AUTH_ALGORITHMS"))
        ));
        assert!(matches!(
            parse_algorithms(" , "),
            Err(ConfigError::Invalid("AUTH_ALGORITHMS"))
        ));
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            split_list(" http://a.test ,,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
