// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};

/// Smallest accepted charge, in minor currency units (1 NGN).
pub const MINIMUM_AMOUNT: i64 = 100;

/// Upper bound on any single gateway call.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Path the gateway redirects the browser back to after checkout.
pub const SUCCESS_CALLBACK_PATH: &str = "/payments/success";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paystack_secret_key: String,
    pub paystack_public_key: String,
    pub paystack_base_url: String,
    pub currency: String,
    pub database_url: Option<String>,
    pub database_name: String,
    pub app_name: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub public_base_url: Option<String>,
    pub verify_webhook_signature: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            paystack_secret_key: String::new(),
            paystack_public_key: String::new(),
            paystack_base_url: "https://api.paystack.co".to_string(),
            currency: "NGN".to_string(),
            database_url: None,
            database_name: "payment_service".to_string(),
            app_name: "Payment Service".to_string(),
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            environment: "development".to_string(),
            public_base_url: None,
            verify_webhook_signature: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();

        let paystack_secret_key = env::var("PAYSTACK_SECRET_KEY").unwrap_or_default();
        if paystack_secret_key.trim().is_empty() {
            return Err(AppError::configuration("PAYSTACK_SECRET_KEY must be set"));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::configuration(format!("PORT must be a number, got {raw:?}")))?,
            Err(_) => defaults.port,
        };

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => defaults.allowed_origins,
        };

        Ok(AppConfig {
            paystack_secret_key,
            paystack_public_key: env::var("PAYSTACK_PUBLIC_KEY").unwrap_or_default(),
            paystack_base_url: env::var("PAYSTACK_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.paystack_base_url),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or(defaults.currency),
            database_url: non_empty_var("DATABASE_URL"),
            database_name: env::var("DATABASE_NAME").unwrap_or(defaults.database_name),
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
            debug: bool_var("DEBUG", defaults.debug)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            allowed_origins,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            verify_webhook_signature: bool_var(
                "VERIFY_WEBHOOK_SIGNATURE",
                defaults.verify_webhook_signature,
            )?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Base URL used to build the checkout callback when the request's own
    /// `Host` header is the only hint available.
    pub fn callback_base_url(&self, host: Option<&str>) -> String {
        if let Some(base) = &self.public_base_url {
            return base.clone();
        }
        match host {
            Some(host) if !host.is_empty() => format!("http://{}", host.trim_end_matches('/')),
            _ => format!("http://localhost:{}", self.port),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn bool_var(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(raw) => parse_bool(&raw)
            .ok_or_else(|| AppError::configuration(format!("{key} must be true or false, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
