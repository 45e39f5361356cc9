/// Configuration management for Murmur Service
///
/// All settings come from environment variables (optionally seeded from a
/// `.env` file by `main`). Production deployments must provide the CORS
/// origin list and the JWT secret explicitly.
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEV_JWT_SECRET: &str = "murmur-dev-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    pub allowed_origins: String,
}

/// Where collections and uploaded images live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_days", &self.jwt_ttl_days)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = is_production_env(&app_env);

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if production => bail!("CORS_ALLOWED_ORIGINS must be set in production"),
            Err(_) => "*".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
        }

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if production => bail!("JWT_SECRET must be set in production"),
            _ => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt_ttl_days = match std::env::var("JWT_TTL_DAYS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("JWT_TTL_DAYS must be an integer, got {raw:?}"))?,
            Err(_) => crypto_core::jwt::DEFAULT_TTL_DAYS,
        };
        if jwt_ttl_days <= 0 {
            bail!("JWT_TTL_DAYS must be positive");
        }

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got {raw:?}"))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            cors: CorsConfig { allowed_origins },
            storage: StorageConfig {
                data_dir: env_path("DATA_DIR", "backend/data"),
                uploads_dir: env_path("UPLOADS_DIR", "backend/uploads"),
                max_upload_bytes,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_ttl_days,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        is_production_env(&self.app.env)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn is_production_env(env: &str) -> bool {
    env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod")
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "APP_ENV",
        "APP_HOST",
        "PORT",
        "CORS_ALLOWED_ORIGINS",
        "DATA_DIR",
        "UPLOADS_DIR",
        "MAX_UPLOAD_BYTES",
        "JWT_SECRET",
        "JWT_TTL_DAYS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.cors.allowed_origins, "*");
        assert_eq!(config.storage.data_dir, PathBuf::from("backend/data"));
        assert_eq!(config.storage.uploads_dir, PathBuf::from("backend/uploads"));
        assert_eq!(config.storage.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.auth.jwt_ttl_days, 7);
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_overrides_are_read() {
        clear_env();
        std::env::set_var("PORT", "8088");
        std::env::set_var("DATA_DIR", "/var/lib/murmur");
        std::env::set_var("JWT_TTL_DAYS", "1");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.port, 8088);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/murmur"));
        assert_eq!(config.auth.jwt_ttl_days, 1);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_requires_secret_and_origins() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        std::env::set_var("JWT_SECRET", "prod-secret");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://murmur.example");
        let config = Config::from_env().unwrap();
        assert!(config.is_production());
        assert_eq!(config.auth.jwt_secret, "prod-secret");

        std::env::remove_var("JWT_SECRET");
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
