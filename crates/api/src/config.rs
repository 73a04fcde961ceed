use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Email transport configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Dispatch pipeline configuration
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty means any origin (development).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Email transport configuration for the email channel adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Email provider: console (development), smtp, or sendgrid
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// SMTP server host (for smtp provider)
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP server port (for smtp provider)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username (for smtp provider)
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP password (for smtp provider)
    #[serde(default)]
    pub smtp_password: String,

    /// SendGrid API key (for sendgrid provider)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender address placed on outgoing mail
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender display name
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            sendgrid_api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
        }
    }
}

/// Dispatch pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Bound applied to each transport adapter call, in seconds.
    #[serde(default = "default_transport_timeout")]
    pub transport_timeout_secs: u64,

    /// Default page size for delivery history listings.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: i64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            transport_timeout_secs: default_transport_timeout(),
            history_page_size: default_history_page_size(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_email_provider() -> String {
    "console".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_sender_email() -> String {
    "no-reply@notifyhub.local".to_string()
}
fn default_sender_name() -> String {
    "NotifyHub".to_string()
}
fn default_transport_timeout() -> u64 {
    10
}
fn default_history_page_size() -> i64 {
    50
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with NH__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("NH").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(config::ConfigError::Message)?;
        Ok(cfg)
    }

    /// Returns the socket address to bind the server on.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must be set".to_string());
        }

        match self.email.provider.as_str() {
            "console" => {}
            "smtp" => {
                if self.email.smtp_host.is_empty() {
                    return Err("email.smtp_host must be set for the smtp provider".to_string());
                }
            }
            "sendgrid" => {
                if self.email.sendgrid_api_key.is_empty() {
                    return Err(
                        "email.sendgrid_api_key must be set for the sendgrid provider".to_string()
                    );
                }
            }
            other => {
                return Err(format!("unknown email provider: {}", other));
            }
        }

        if self.dispatch.transport_timeout_secs == 0 {
            return Err("dispatch.transport_timeout_secs must be at least 1".to_string());
        }

        Ok(())
    }
}
