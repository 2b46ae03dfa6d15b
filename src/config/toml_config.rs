use crate::core::page::DEFAULT_AGENCY_LIMIT;
use crate::core::breadcrumbs::DEFAULT_URL_PREFIX;
use crate::core::resolver::{DEFAULT_MAX_DEPTH, DEFAULT_REQUEST_TIMEOUT};
use crate::core::ConfigProvider;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub max_depth: Option<usize>,
    pub url_prefix: Option<String>,
    /// Load the whole location table into memory before resolving.
    pub cache: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingConfig {
    pub agency_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DirectoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("backend.url", &self.backend.url)?;
        if let Some(key) = &self.backend.api_key {
            validate_non_empty_string("backend.api_key", key)?;
            if key.starts_with("${") {
                return Err(DirectoryError::MissingConfigError {
                    field: format!("backend.api_key ({} is not set)", key),
                });
            }
        }
        if let Some(timeout) = self.backend.timeout_ms {
            validate_range("backend.timeout_ms", timeout, 1, 120_000)?;
        }
        validate_range("resolver.max_depth", self.max_depth(), 1, 64)?;
        validate_url_prefix("resolver.url_prefix", self.url_prefix())?;
        validate_positive_number("listing.agency_limit", self.agency_limit(), 1)?;

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn cache_enabled(&self) -> bool {
        self.resolver.cache.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn backend_url(&self) -> &str {
        &self.backend.url
    }

    fn api_key(&self) -> Option<&str> {
        self.backend.api_key.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        self.backend
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    fn max_depth(&self) -> usize {
        self.resolver.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    fn url_prefix(&self) -> &str {
        self.resolver.url_prefix.as_deref().unwrap_or(DEFAULT_URL_PREFIX)
    }

    fn agency_limit(&self) -> usize {
        self.listing.agency_limit.unwrap_or(DEFAULT_AGENCY_LIMIT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
