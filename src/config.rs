// config.rs
use crate::errors::PipelineError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const BASE_URL: &str = "https://api.rentcast.io/v1/properties";

// The raw listings cache refreshes once per year; the paid API bills per call.
const CACHE_EXPIRY_HOURS: u64 = 24 * 365;

/// Runtime settings for a pipeline run. Everything except the API key has a
/// working default so tests can build one without touching the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub raw_data_dir: PathBuf,
    pub processed_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub cache_expiry: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            api_key: std::env::var("RENTCAST_API_KEY").ok(),
            ..Settings::default()
        }
    }

    /// The API key is only required when an actual fetch happens; cached
    /// runs and tests never need it.
    pub fn require_api_key(&self) -> Result<&str, PipelineError> {
        self.api_key.as_deref().ok_or_else(|| {
            PipelineError::Config("RENTCAST_API_KEY environment variable not set".into())
        })
    }

    pub fn processed_csv_path(&self) -> PathBuf {
        self.processed_data_dir.join("properties.csv")
    }

    pub fn quality_report_path(&self) -> PathBuf {
        self.processed_data_dir.join("quality_report.json")
    }

    pub fn ensure_dirs(&self) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.raw_data_dir)?;
        fs::create_dir_all(&self.processed_data_dir)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: None,
            base_url: BASE_URL.to_string(),
            raw_data_dir: PathBuf::from("data/raw"),
            processed_data_dir: PathBuf::from("data/processed"),
            db_path: PathBuf::from("rentcast.sqlite3"),
            cache_expiry: Duration::from_secs(CACHE_EXPIRY_HOURS * 3600),
        }
    }
}
