use std::path::PathBuf;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Firebase Cloud Messaging credentials. Push is disabled without them.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub access_token: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Timeout for every request except progress streams (default: `30`).
    pub request_timeout_secs: u64,
    /// Drain budget for background workers on shutdown (default: `10`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Processing worker base URL.
    pub worker_url: String,
    pub worker_timeout_secs: u64,
    /// Directory where uploaded source files are written.
    pub upload_dir: PathBuf,
    /// A progress stream with no event for this long is closed.
    pub stream_idle_timeout_secs: u64,
    pub subscriber_write_timeout_ms: u64,
    pub subscriber_buffer: usize,
    pub notify_workers: usize,
    pub notify_queue_capacity: usize,
    pub fcm: Option<FcmConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `8080`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `10`                       |
    /// | `WORKER_URL`                  | `http://localhost:5000`    |
    /// | `WORKER_TIMEOUT_SECS`         | `30`                       |
    /// | `UPLOAD_DIR`                  | `./uploads`                |
    /// | `STREAM_IDLE_TIMEOUT_SECS`    | `300`                      |
    /// | `SUBSCRIBER_WRITE_TIMEOUT_MS` | `2000`                     |
    /// | `SUBSCRIBER_BUFFER`           | `32`                       |
    /// | `NOTIFY_WORKERS`              | `4`                        |
    /// | `NOTIFY_QUEUE_CAPACITY`       | `256`                      |
    /// | `FCM_PROJECT_ID`              | unset (push disabled)      |
    /// | `FCM_ACCESS_TOKEN`            | unset (push disabled)      |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numeric values and when `JWT_SECRET` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let fcm = match (
            std::env::var("FCM_PROJECT_ID").ok().filter(|v| !v.is_empty()),
            std::env::var("FCM_ACCESS_TOKEN").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(project_id), Some(access_token)) => Some(FcmConfig {
                project_id,
                access_token,
            }),
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 10),
            jwt: JwtConfig::from_env(),
            worker_url: std::env::var("WORKER_URL")
                .unwrap_or_else(|_| "http://localhost:5000".into()),
            worker_timeout_secs: env_parse("WORKER_TIMEOUT_SECS", 30),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads".into())
                .into(),
            stream_idle_timeout_secs: env_parse("STREAM_IDLE_TIMEOUT_SECS", 300),
            subscriber_write_timeout_ms: env_parse("SUBSCRIBER_WRITE_TIMEOUT_MS", 2000),
            subscriber_buffer: env_parse("SUBSCRIBER_BUFFER", 32),
            notify_workers: env_parse("NOTIFY_WORKERS", 4),
            notify_queue_capacity: env_parse("NOTIFY_QUEUE_CAPACITY", 256),
            fcm,
        }
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + ToString,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid number"))
}
