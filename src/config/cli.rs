use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, validate_url_prefix,
    Validate,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "foster-locations")]
#[command(about = "Resolve directory locations into breadcrumbs, URLs and listings")]
pub struct CliConfig {
    /// Slug, id or slash-separated slug path, e.g. `england/south-east/surrey`
    pub location: String,

    #[arg(long, default_value = "http://localhost:54321")]
    pub backend_url: String,

    #[arg(long, env = "FOSTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// TOML configuration file; replaces the backend and resolver flags
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON snapshot to resolve against instead of the backend
    #[arg(long)]
    pub fixture: Option<String>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,

    #[arg(long, default_value = "10")]
    pub max_depth: usize,

    #[arg(long, default_value = "/locations")]
    pub url_prefix: String,

    #[arg(long, default_value = "20")]
    pub agency_limit: usize,

    /// Load the whole location table up front and resolve from memory
    #[arg(long)]
    pub cache: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn backend_url(&self) -> &str {
        &self.backend_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    fn agency_limit(&self) -> usize {
        self.agency_limit
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.fixture {
            Some(fixture) => validate_path("fixture", fixture)?,
            None => validate_url("backend_url", &self.backend_url)?,
        }
        validate_range("timeout_ms", self.timeout_ms, 1, 120_000)?;
        validate_range("max_depth", self.max_depth, 1, 64)?;
        validate_positive_number("agency_limit", self.agency_limit, 1)?;
        validate_url_prefix("url_prefix", &self.url_prefix)?;
        Ok(())
    }
}
