use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEV_JWT_SECRET: &str = "travel-desk-development-secret-change-me";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/travel_desk".to_string()),
            max_connections: parse_number("DATABASE_MAX_CONNECTIONS", 5)?,
        };

        let jwt_secret = match optional_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingVar("JWT_SECRET"))
            }
            None => DEV_JWT_SECRET.to_string(),
        };
        let auth = AuthConfig {
            jwt_secret,
            token_ttl: Duration::from_secs(parse_number("JWT_TTL_SECS", 3600)?),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "travel-desk".to_string()),
        };

        let provider = match optional_var("MAIL_PROVIDER") {
            Some(raw) => MailProvider::parse(&raw).ok_or(ConfigError::InvalidMailProvider(raw))?,
            None => MailProvider::Console,
        };
        let mail = MailConfig {
            provider,
            api_key: optional_var("MAIL_API_KEY"),
            admin_address: optional_var("MAIL_ADMIN_ADDRESS"),
            from_address: optional_var("MAIL_FROM_ADDRESS"),
            from_name: env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Greater & Better Travel".to_string()),
            timeout: Duration::from_secs(parse_number("MAIL_TIMEOUT_SECS", 10)?),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database,
            auth,
            mail,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidNumber(name)),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Postgres connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub issuer: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Which outbound email implementation backs the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    /// Log messages instead of sending them.
    Console,
    Resend,
    SendGrid,
}

impl MailProvider {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" | "log" => Some(Self::Console),
            "resend" => Some(Self::Resend),
            "sendgrid" => Some(Self::SendGrid),
            _ => None,
        }
    }
}

/// Outbound email settings. Missing values are tolerated here and reported per
/// message by the notifier.
#[derive(Clone)]
pub struct MailConfig {
    pub provider: MailProvider,
    pub api_key: Option<String>,
    pub admin_address: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    pub timeout: Duration,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("admin_address", &self.admin_address)
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber(&'static str),
    InvalidMailProvider(String),
    MissingVar(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber(name) => write!(f, "{name} must be a positive integer"),
            ConfigError::InvalidMailProvider(value) => write!(
                f,
                "MAIL_PROVIDER '{value}' is not one of console, resend, sendgrid"
            ),
            ConfigError::MissingVar(name) => write!(f, "{name} must be set in production"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber(_)
            | ConfigError::InvalidMailProvider(_)
            | ConfigError::MissingVar(_) => None,
        }
    }
}
