//! Process configuration read from `APP_*` environment variables, with a
//! `.env` file loaded first when present.

use std::env;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_DOCUMENT_ROOT: &str = "storage/app/public";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Unknown names fall back to development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "ci" | "test" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub portal: PortalConfig,
    pub admin: AdminConfig,
}

fn setting(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn setting_or(key: &str, fallback: &str) -> String {
    setting(key).unwrap_or_else(|| fallback.to_string())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match setting("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            environment: AppEnvironment::parse(&setting_or("APP_ENV", "development")),
            server: ServerConfig {
                host: setting_or("APP_HOST", DEFAULT_HOST),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: setting_or("APP_LOG_LEVEL", "info"),
            },
            portal: PortalConfig {
                frontend_url: setting_or("APP_FRONTEND_URL", DEFAULT_FRONTEND_URL),
                document_root: PathBuf::from(setting_or("APP_DOCUMENT_ROOT", DEFAULT_DOCUMENT_ROOT)),
            },
            admin: AdminConfig {
                token: setting("APP_ADMIN_TOKEN")
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty()),
                name: setting_or("APP_ADMIN_NAME", "Super Admin"),
                email: setting_or("APP_ADMIN_EMAIL", "admin@example.com"),
            },
        })
    }
}

/// Listen address of the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` maps to the IPv4 loopback; anything else must be an IP literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Member-facing portal settings: where members log in and where issued
/// documents are written.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub frontend_url: String,
    pub document_root: PathBuf,
}

/// Seeded super-admin account. Without a token the admin routes are unreachable.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub token: Option<String>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT '{value}' is not a valid port number")]
    InvalidPort { value: String },
    #[error("APP_HOST '{value}' is neither localhost nor an IP address")]
    InvalidHost {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    const KEYS: [&str; 9] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "APP_FRONTEND_URL",
        "APP_DOCUMENT_ROOT",
        "APP_ADMIN_TOKEN",
        "APP_ADMIN_NAME",
        "APP_ADMIN_EMAIL",
    ];

    /// Runs `check` with only `vars` set, holding a lock so tests do not race on the environment.
    fn with_env(vars: &[(&str, &str)], check: impl FnOnce()) {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        let _held = LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        KEYS.iter().for_each(|key| env::remove_var(key));
        for (key, value) in vars {
            env::set_var(key, value);
        }
        check();
        KEYS.iter().for_each(|key| env::remove_var(key));
    }

    #[test]
    fn defaults_apply_without_environment() {
        with_env(&[], || {
            let config = AppConfig::load().expect("defaults load");
            assert_eq!(config.environment, AppEnvironment::Development);
            assert_eq!(
                config.server.socket_addr().expect("default host"),
                SocketAddr::from(([127, 0, 0, 1], 3000))
            );
            assert_eq!(config.telemetry.log_level, "info");
            assert_eq!(config.portal.frontend_url, "http://localhost:5173");
            assert_eq!(config.portal.document_root, PathBuf::from("storage/app/public"));
            assert!(config.admin.token.is_none());
            assert_eq!(config.admin.email, "admin@example.com");
        });
    }

    #[test]
    fn localhost_and_ipv6_hosts_resolve() {
        with_env(&[("APP_HOST", "LocalHost"), ("APP_PORT", "8080")], || {
            let config = AppConfig::load().expect("config loads");
            assert_eq!(
                config.server.socket_addr().expect("localhost"),
                SocketAddr::from(([127, 0, 0, 1], 8080))
            );
        });
        with_env(&[("APP_HOST", "::1")], || {
            let addr = AppConfig::load()
                .expect("config loads")
                .server
                .socket_addr()
                .expect("ipv6 literal");
            assert!(addr.is_ipv6());
        });
    }

    #[test]
    fn malformed_port_and_host_are_reported() {
        with_env(&[("APP_PORT", "eighty")], || {
            let err = AppConfig::load().expect_err("port must parse");
            assert!(matches!(err, ConfigError::InvalidPort { ref value } if value == "eighty"));
        });
        with_env(&[("APP_HOST", "portal.example.org")], || {
            let err = AppConfig::load()
                .expect("host is checked lazily")
                .server
                .socket_addr()
                .expect_err("hostnames are refused");
            assert!(std::error::Error::source(&err).is_some());
        });
    }

    #[test]
    fn blank_admin_token_counts_as_unset() {
        with_env(&[("APP_ADMIN_TOKEN", "   "), ("APP_ENV", "PROD")], || {
            let config = AppConfig::load().expect("config loads");
            assert!(config.admin.token.is_none());
            assert_eq!(config.environment, AppEnvironment::Production);
        });
    }
}
