//! Runtime settings: `.env` / environment first, CLI flags override.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_WB_API_BASE: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_WEO_URL_TEMPLATE: &str =
    "https://www.imf.org/-/media/Files/Publications/WEO/WEO-Database/{year}/WEO{release}{year}all.ashx";
pub const DEFAULT_TARGET_MONTH: u32 = 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub wb_api_base: String,
    /// URL with `{year}` and `{release}` placeholders (release = `Oct`, `Apr`, ...).
    pub weo_url_template: String,
    pub data_dir: PathBuf,
    pub weo_target_month: u32,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wb_api_base: DEFAULT_WB_API_BASE.to_string(),
            weo_url_template: DEFAULT_WEO_URL_TEMPLATE.to_string(),
            data_dir: PathBuf::from("."),
            weo_target_month: DEFAULT_TARGET_MONTH,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load from the process environment (after reading an optional `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(base) = non_empty(lookup("WB_API_BASE")) {
            settings.wb_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(template) = non_empty(lookup("WEO_URL_TEMPLATE")) {
            settings.weo_url_template = template;
        }
        if let Some(dir) = non_empty(lookup("ECON_DATA_DIR")) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = non_empty(lookup("WEO_TARGET_MONTH")) {
            let month = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| AppError::usage(format!("Invalid WEO_TARGET_MONTH '{raw}': {e}")))?;
            settings.weo_target_month = month;
        }
        if let Some(raw) = non_empty(lookup("HTTP_TIMEOUT_SECS")) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| AppError::usage(format!("Invalid HTTP_TIMEOUT_SECS '{raw}': {e}")))?;
            settings.http_timeout = Duration::from_secs(secs);
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.weo_target_month) {
            return Err(AppError::usage(format!(
                "WEO target month must be in 1..=12 (got {}).",
                self.weo_target_month
            )));
        }
        if !self.weo_url_template.contains("{year}") || !self.weo_url_template.contains("{release}") {
            return Err(AppError::usage(
                "WEO_URL_TEMPLATE must contain both {year} and {release} placeholders.",
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(AppError::usage("HTTP_TIMEOUT_SECS must be positive."));
        }
        Ok(())
    }

    pub fn http_client(&self) -> Result<reqwest::blocking::Client, AppError> {
        reqwest::blocking::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("econ-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::usage(format!("Failed to build HTTP client: {e}")))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            ("WB_API_BASE", "http://localhost:9000/v2/"),
            ("ECON_DATA_DIR", "/tmp/econ"),
            ("WEO_TARGET_MONTH", "4"),
        ]))
        .unwrap();
        assert_eq!(settings.wb_api_base, "http://localhost:9000/v2");
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/econ"));
        assert_eq!(settings.weo_target_month, 4);
    }

    #[test]
    fn rejects_out_of_range_month() {
        let err = Settings::from_lookup(lookup(&[("WEO_TARGET_MONTH", "13")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_template_without_placeholders() {
        let err = Settings::from_lookup(lookup(&[("WEO_URL_TEMPLATE", "http://x/file.csv")])).unwrap_err();
        assert!(err.to_string().contains("placeholders"));
    }
}
