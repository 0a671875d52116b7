use crate::error::{FloraIdError, Result};
use crate::retry::RetryPolicy;
use crate::sources::SourceKind;
use flora_id_common::SearchQuery;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_GBIF_URL: &str = "https://api.gbif.org/v1";
pub const DEFAULT_EFLORA_URL: &str = "https://biodiversityadvisor.sanbi.org";
pub const DEFAULT_POWO_URL: &str = "https://powo.science.kew.org";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const REPORT_FILE_NAME: &str = "taxonomic_analysis.html";

/// Run-wide settings, loaded once at startup and passed by reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub species_delay_ms: u64,
    pub occurrence_limit: u32,
    pub source_order: Vec<SourceKind>,
    pub gbif_url: String,
    pub eflora_url: String,
    pub powo_url: String,
    pub gemini_url: String,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_radius_km: f64,
    pub default_taxon: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            species_delay_ms: 2000,
            occurrence_limit: 1000,
            source_order: vec![SourceKind::Eflora, SourceKind::Powo],
            gbif_url: DEFAULT_GBIF_URL.into(),
            eflora_url: DEFAULT_EFLORA_URL.into(),
            powo_url: DEFAULT_POWO_URL.into(),
            gemini_url: DEFAULT_GEMINI_URL.into(),
            default_latitude: -34.459745,
            default_longitude: 20.4001533333,
            default_radius_km: 4.0,
            default_taxon: "Thymelaeaceae".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FloraIdError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("flora-id").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.retry_attempts == 0 {
            return Err(FloraIdError::Config("retry_attempts must be at least 1".into()));
        }
        if self.source_order.is_empty() {
            return Err(FloraIdError::Config("source_order must name at least one source".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(FloraIdError::Config("timeout_seconds must be at least 1".into()));
        }
        Ok(())
    }

    /// Environment first (GOOGLE_API_KEY, then GEMINI_API_KEY), then the file.
    /// Called once at startup; the result is stored back into the config.
    pub fn resolve_api_key(&self) -> Option<String> {
        ["GOOGLE_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(FloraIdError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn species_delay(&self) -> Duration {
        Duration::from_millis(self.species_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    /// Query from the given overrides, falling back to the configured
    /// defaults for anything not supplied
    pub fn query(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_km: Option<f64>,
        taxon: Option<&str>,
    ) -> Result<SearchQuery> {
        Ok(SearchQuery::new(
            latitude.unwrap_or(self.default_latitude),
            longitude.unwrap_or(self.default_longitude),
            radius_km.unwrap_or(self.default_radius_km),
            taxon.unwrap_or(self.default_taxon.as_str()),
        )?)
    }

    /// API key shown as `abcd…` for `config --show`
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) if key.chars().count() > 4 => {
                format!("{}…", key.chars().take(4).collect::<String>())
            }
            Some(_) => "set".into(),
            None => "not set".into(),
        }
    }
}
