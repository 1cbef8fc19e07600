//! Environment-driven configuration

use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub gateway: GatewayConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Publishable key, also handed to the client-side widget.
    pub key_id: String,
    /// Merchant secret; never leaves the server. Signs gateway callbacks.
    pub key_secret: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}")]
    Invalid(&'static str),
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 1227,
        };
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            nats_url: std::env::var("NATS_URL").ok(),
            gateway: GatewayConfig {
                key_id: required("RAZORPAY_KEY_ID")?,
                key_secret: required("RAZORPAY_KEY_SECRET")?,
                api_base: std::env::var("RAZORPAY_API_BASE")
                    .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
                currency: std::env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            },
        })
    }
}
