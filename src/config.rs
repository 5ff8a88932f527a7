use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Pricing knobs consumed by the quote calculator. Resolved once per request
/// and passed down as a parameter; services never read these ambiently.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PricingSettings {
    /// GST rate applied to the cart subtotal, in percent.
    #[serde(default = "default_gst_percentage")]
    pub gst_percentage: Decimal,

    /// Base delivery charge for agent-handled pickup and drop.
    #[serde(default = "default_delivery_charges")]
    pub delivery_charges: Decimal,

    /// Surcharge applied on top when a shop fulfils an express order and the
    /// shop record carries no charge of its own.
    #[serde(default = "default_express_delivery_charges")]
    pub express_delivery_charges: Decimal,

    #[serde(default = "default_platform_fee")]
    pub platform_fee: Decimal,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            gst_percentage: default_gst_percentage(),
            delivery_charges: default_delivery_charges(),
            express_delivery_charges: default_express_delivery_charges(),
            platform_fee: default_platform_fee(),
        }
    }
}

fn default_gst_percentage() -> Decimal {
    Decimal::new(5, 0)
}
fn default_delivery_charges() -> Decimal {
    Decimal::new(40, 0)
}
fn default_express_delivery_charges() -> Decimal {
    Decimal::new(30, 0)
}
fn default_platform_fee() -> Decimal {
    Decimal::new(10, 0)
}

/// Opaque payment-gateway collaborator. The keys are forwarded verbatim; the
/// core never interprets gateway responses beyond success/failure.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PaymentGatewaySettings {
    pub base_url: String,
    pub api_key: String,
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL (postgres or sqlite).
    pub database_url: String,

    /// Redis connection URL, used by the notification inbox.
    pub redis_url: String,

    /// Server host address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment ("development", "test", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging).
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup.
    #[serde(default)]
    pub auto_migrate: bool,

    /// DB pool tuning.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default)]
    #[validate]
    pub pricing: PricingSettings,

    /// Absent in development; the payment endpoint reports the gateway as
    /// unconfigured rather than failing at startup.
    #[serde(default)]
    pub payment_gateway: Option<PaymentGatewaySettings>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

impl AppConfig {
    /// Programmatic constructor used by tests and tooling.
    pub fn new(
        database_url: String,
        redis_url: String,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            redis_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            pricing: PricingSettings::default(),
            payment_gateway: None,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Loads configuration from layered sources: `config/default.toml`, an
/// environment-specific file, and `APP__`-prefixed environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder();
    let default_path = Path::new(CONFIG_DIR).join("default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }
    let env_path = Path::new(CONFIG_DIR).join(format!("{run_env}.toml"));
    if env_path.exists() {
        builder = builder.add_source(File::from(env_path));
    }
    builder = builder.add_source(Environment::with_prefix("APP").separator("__"));

    let cfg: AppConfig = builder.build()?.try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    info!(environment = %cfg.environment, "Configuration loaded");
    Ok(cfg)
}

/// Installs the global tracing subscriber.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pricing_defaults_are_sane() {
        let pricing = PricingSettings::default();
        assert_eq!(pricing.gst_percentage, dec!(5));
        assert_eq!(pricing.delivery_charges, dec!(40));
        assert_eq!(pricing.platform_fee, dec!(10));
    }

    #[test]
    fn programmatic_config_defaults() {
        let cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "redis://127.0.0.1:6379".into(),
            "127.0.0.1".into(),
            18080,
            "test".into(),
        );
        assert!(!cfg.auto_migrate);
        assert!(cfg.payment_gateway.is_none());
        assert!(!cfg.is_development());
        assert_eq!(cfg.db_max_connections, 10);
    }
}
