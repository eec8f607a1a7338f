/// Configuration management for the API server
///
/// Configuration is read from environment variables (a `.env` file is
/// loaded first when present).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `API_PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `MAIL_FROM`: Sender of lead notifications
/// - `MAIL_LEAD_RECIPIENTS`: Comma-separated recipients of lead notifications
/// - `MAIL_RELAY_URL`: HTTP mail relay; messages are only logged when unset
/// - `RUST_LOG`: Log filter (default: leadcrm_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use leadcrm_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use leadcrm_shared::notify::NotificationSettings;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Production mode (HTTPS, HSTS header)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Outgoing mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// `from` address of lead notifications
    pub from: String,

    /// Who is told about every new lead
    pub lead_recipients: Vec<String>,

    /// Base URL of the HTTP mail relay
    pub relay_url: Option<String>,
}

impl MailConfig {
    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            sender: self.from.clone(),
            lead_recipients: self.lead_recipients.clone(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        let defaults = NotificationSettings::default();
        Self {
            from: defaults.sender,
            lead_recipients: defaults.lead_recipients,
            relay_url: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value does not
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = split_list(&env::var("API_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let production = env::var("API_PRODUCTION")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let mut mail = MailConfig::default();
        if let Ok(from) = env::var("MAIL_FROM") {
            mail.from = from;
        }
        if let Ok(recipients) = env::var("MAIL_LEAD_RECIPIENTS") {
            mail.lead_recipients = split_list(&recipients);
        }
        mail.relay_url = env::var("MAIL_RELAY_URL").ok().filter(|url| !url.is_empty());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            mail,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Splits a comma-separated variable, dropping blanks
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            mail: MailConfig::default(),
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" sales@example.com, ,ops@example.com "),
            vec!["sales@example.com".to_string(), "ops@example.com".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_notification_settings() {
        let mut mail = MailConfig::default();
        mail.from = "crm@example.com".to_string();
        mail.lead_recipients = vec!["desk@example.com".to_string()];

        let settings = mail.notification_settings();
        assert_eq!(settings.sender, "crm@example.com");
        assert_eq!(settings.lead_recipients, vec!["desk@example.com".to_string()]);
    }
}
