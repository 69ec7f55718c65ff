use std::env;
use std::time::Duration;

use crate::alert_monitor::{
    MonitorConfig,
    DEFAULT_CHECK_INTERVAL_SECS,
    DEFAULT_DEDUP_WINDOW_SECS,
    DEFAULT_PACE_DELAY_MS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub openweather_api_key: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub server_host: String,
    pub server_port: u16,
    pub monitor: MonitorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let openweather_api_key = env::var("OPENWEATHER_API_KEY")?;

        let smtp_host = env::var("SMTP_HOST")?;
        let smtp_username = env::var("SMTP_USERNAME")?;
        let smtp_password = env::var("SMTP_PASSWORD")?;
        let smtp_from = env::var("SMTP_FROM")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        // Monitor pacing knobs; defaults are the shipped policy constants
        let check_interval_secs: u64 = env::var("MONITOR_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_CHECK_INTERVAL_SECS.to_string())
            .parse()?;
        let pace_delay_ms: u64 = env::var("MONITOR_PACE_DELAY_MS")
            .unwrap_or_else(|_| DEFAULT_PACE_DELAY_MS.to_string())
            .parse()?;
        let dedup_window_secs: i64 = env::var("ALERT_DEDUP_WINDOW_SECS")
            .unwrap_or_else(|_| DEFAULT_DEDUP_WINDOW_SECS.to_string())
            .parse()?;

        let monitor = MonitorConfig {
            check_interval: Duration::from_secs(check_interval_secs),
            pace_delay: Duration::from_millis(pace_delay_ms),
            dedup_window: chrono::Duration::seconds(dedup_window_secs),
        };

        Ok(Config {
            database_url,
            jwt_secret,
            openweather_api_key,
            smtp_host,
            smtp_username,
            smtp_password,
            smtp_from,
            server_host,
            server_port,
            monitor,
        })
    }
}
