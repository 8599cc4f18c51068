//! config-rs/lib.rs
//! Shared configuration for the ACH operator console
//! Provides backend base URLs, bind address and paging limits from the environment

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_CONSOLE_PORT: u16 = 8080;
pub const DEFAULT_BACKEND_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_ITEMS_LIMIT: usize = 100;
pub const MAX_ITEMS_LIMIT: usize = 1000;

/// Source of raw configuration values
pub trait ConfigProvider: Send + Sync {
    /// Get a raw value; empty strings count as unset
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads process environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider;

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed key/value map, used in tests and embedded setups
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Load a `.env` file from the working directory when one exists
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        log::debug!("Loaded environment from .env");
    }
}

/// Parse a numeric value, warning and falling back to the default when invalid
fn parse_or<T>(provider: &dyn ConfigProvider, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match provider.get(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("Invalid value '{}' in {}, using default {}", raw, key, default);
            default
        }),
        None => default,
    }
}

/// Get service port from configuration with proper fallback
///
/// # Arguments
/// * `provider` - Where values are read from
/// * `service_name` - The name of the service (e.g., "CONSOLE")
/// * `default_port` - The default port to use if not configured
pub fn get_service_port(provider: &dyn ConfigProvider, service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    parse_or(provider, &var_name, default_port)
}

/// Create a SocketAddr for binding a service
///
/// `<SERVICE>_SERVICE_ADDR` wins when it holds `host:port` or `http://host:port`;
/// otherwise the service binds `0.0.0.0` on the configured port.
pub fn get_bind_address(
    provider: &dyn ConfigProvider,
    service_name: &str,
    default_port: u16,
) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Some(addr_str) = provider.get(&var_name) {
        let stripped = addr_str
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&addr_str);

        match stripped.trim_end_matches('/').parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(provider, service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Output format for the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn from_config(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                log::warn!("Unknown LOG_FORMAT '{}', using text", other);
                LogFormat::Text
            }
        }
    }
}

/// Complete configuration for the console gateway process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub odfi_base_url: String,
    pub rdfi_base_url: String,
    pub ledger_base_url: String,
    pub eip_base_url: String,
    pub bind_address: SocketAddr,
    /// Per outbound HTTP call
    pub backend_timeout_seconds: u64,
    /// Applied to every fan-out task of one aggregate request
    pub request_deadline: Option<Duration>,
    pub default_limit: usize,
    pub max_limit: usize,
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_provider(&MemoryConfigProvider::new())
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment (after `.env`)
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_provider(&EnvConfigProvider::new())
    }

    /// Read configuration from any provider
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        let url = |key: &str, default: &str| provider.get(key).unwrap_or_else(|| default.to_string());

        let mut backend_timeout_seconds =
            parse_or(provider, "BACKEND_TIMEOUT_SECONDS", DEFAULT_BACKEND_TIMEOUT_SECONDS);
        if backend_timeout_seconds == 0 {
            log::warn!("BACKEND_TIMEOUT_SECONDS must be positive, using default");
            backend_timeout_seconds = DEFAULT_BACKEND_TIMEOUT_SECONDS;
        }

        let request_deadline = match parse_or(provider, "REQUEST_DEADLINE_MS", 0u64) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let mut max_limit = parse_or(provider, "ACH_ITEMS_MAX_LIMIT", MAX_ITEMS_LIMIT);
        if max_limit == 0 {
            max_limit = MAX_ITEMS_LIMIT;
        }
        let mut default_limit = parse_or(provider, "ACH_ITEMS_DEFAULT_LIMIT", DEFAULT_ITEMS_LIMIT);
        if default_limit == 0 {
            default_limit = DEFAULT_ITEMS_LIMIT;
        }
        if default_limit > max_limit {
            log::warn!(
                "ACH_ITEMS_DEFAULT_LIMIT {} exceeds max {}, clamping",
                default_limit,
                max_limit
            );
            default_limit = max_limit;
        }

        Self {
            odfi_base_url: url("ODFI_BASE_URL", "http://localhost:8081"),
            rdfi_base_url: url("RDFI_BASE_URL", "http://localhost:8082"),
            ledger_base_url: url("LEDGER_BASE_URL", "http://localhost:8083"),
            eip_base_url: url("EIP_BASE_URL", "http://localhost:8084"),
            bind_address: get_bind_address(provider, "CONSOLE", DEFAULT_CONSOLE_PORT),
            backend_timeout_seconds,
            request_deadline,
            default_limit,
            max_limit,
            log_format: LogFormat::from_config(provider.get("LOG_FORMAT")),
        }
    }
}
