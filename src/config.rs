use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ AppError, Result };

pub const DEFAULT_QR_API_BASE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_MAX_RETRIES: u32 = 1;
pub const DEFAULT_EXPORT_SIZE_PX: u32 = 1024;
pub const DEFAULT_PREVIEW_SIZE_PX: u32 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub qr_api_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_max_retries: u32,
    pub export_size_px: u32,
    pub preview_size_px: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qr_api_base_url: DEFAULT_QR_API_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            fetch_max_retries: DEFAULT_FETCH_MAX_RETRIES,
            export_size_px: DEFAULT_EXPORT_SIZE_PX,
            preview_size_px: DEFAULT_PREVIEW_SIZE_PX,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        let qr_api_base_url = lookup("QR_API_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_QR_API_BASE_URL.to_string());

        if !qr_api_base_url.starts_with("http://") && !qr_api_base_url.starts_with("https://") {
            return Err(AppError::Config("QR_API_BASE_URL must be an http(s) URL".to_string()));
        }

        let timeout_secs: u64 = parse_or(&lookup, "QR_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::Config("QR_FETCH_TIMEOUT_SECS must be greater than 0".to_string()));
        }

        let fetch_max_retries = parse_or(&lookup, "QR_FETCH_MAX_RETRIES", DEFAULT_FETCH_MAX_RETRIES)?;
        let export_size_px = parse_or(&lookup, "QR_EXPORT_SIZE_PX", DEFAULT_EXPORT_SIZE_PX)?;
        let preview_size_px = parse_or(&lookup, "QR_PREVIEW_SIZE_PX", DEFAULT_PREVIEW_SIZE_PX)?;

        if export_size_px == 0 || preview_size_px == 0 {
            return Err(AppError::Config("QR sizes must be greater than 0".to_string()));
        }

        Ok(Config {
            qr_api_base_url,
            fetch_timeout: Duration::from_secs(timeout_secs),
            fetch_max_retries,
            export_size_px,
            preview_size_px,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
    where F: Fn(&str) -> Option<String>, T: FromStr
{
    match lookup(key) {
        Some(raw) =>
            raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.qr_api_base_url, DEFAULT_QR_API_BASE_URL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.fetch_max_retries, 1);
        assert_eq!(config.export_size_px, 1024);
        assert_eq!(config.preview_size_px, 200);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(
            lookup_from(&[
                ("QR_API_BASE_URL", "http://localhost:9000/qr"),
                ("QR_FETCH_TIMEOUT_SECS", "3"),
                ("QR_FETCH_MAX_RETRIES", "0"),
                ("QR_EXPORT_SIZE_PX", "512"),
            ])
        ).unwrap();
        assert_eq!(config.qr_api_base_url, "http://localhost:9000/qr");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.fetch_max_retries, 0);
        assert_eq!(config.export_size_px, 512);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = Config::from_lookup(lookup_from(&[("QR_EXPORT_SIZE_PX", "huge")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("QR_API_BASE_URL", "ftp://x")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("QR_FETCH_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
