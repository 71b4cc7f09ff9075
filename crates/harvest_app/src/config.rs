//! RON run-configuration loading and validation.
//!
//! Anything wrong here is fatal: the run must refuse to start rather than
//! harvest against a half-understood plan.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harvest_core::{HarvestPlan, PlanEntry, PlanError, Strategy};
use harvest_engine::{FetchSettings, RunSettings};
use serde::Deserialize;
use url::Url;

/// Site identifiers the adapter directory knows how to build.
pub const KNOWN_SITES: &[&str] = &["petvalu", "petsmart"];

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub output_dir: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default)]
    pub run_deadline_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub entries: Vec<ConfigEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntry {
    pub category: String,
    pub site: String,
    pub base_url: String,
    pub strategy: String,
}

fn default_workers() -> usize {
    2
}

fn default_top_n() -> usize {
    harvest_core::DEFAULT_TOP_N
}

fn default_page_delay_ms() -> u64 {
    500
}

/// Everything the run needs, already validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub run_settings: RunSettings,
    pub fetch_settings: FetchSettings,
    pub plan: HarvestPlan,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    UnknownStrategy { category: String, value: String },
    UnknownSite { category: String, site: String },
    InvalidBaseUrl { category: String, url: String },
    Plan(PlanError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "cannot read config: {msg}"),
            ConfigError::Parse(msg) => write!(f, "cannot parse config: {msg}"),
            ConfigError::UnknownStrategy { category, value } => {
                write!(f, "{category}: unknown strategy '{value}'")
            }
            ConfigError::UnknownSite { category, site } => {
                write!(f, "{category}: unknown site '{site}'")
            }
            ConfigError::InvalidBaseUrl { category, url } => {
                write!(f, "{category}: invalid base url '{url}'")
            }
            ConfigError::Plan(err) => write!(f, "invalid plan: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let file: ConfigFile = ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;

    let mut entries = Vec::with_capacity(file.entries.len());
    for entry in &file.entries {
        if !KNOWN_SITES.contains(&entry.site.as_str()) {
            return Err(ConfigError::UnknownSite {
                category: entry.category.clone(),
                site: entry.site.clone(),
            });
        }
        let strategy = Strategy::parse(&entry.strategy).ok_or_else(|| {
            ConfigError::UnknownStrategy {
                category: entry.category.clone(),
                value: entry.strategy.clone(),
            }
        })?;
        let base_url = Url::parse(&entry.base_url).map_err(|_| ConfigError::InvalidBaseUrl {
            category: entry.category.clone(),
            url: entry.base_url.clone(),
        })?;
        entries.push(PlanEntry {
            category: entry.category.clone(),
            site: entry.site.clone(),
            base_url,
            strategy,
        });
    }

    let plan = HarvestPlan::new(entries);
    plan.validate().map_err(ConfigError::Plan)?;

    let run_settings = RunSettings {
        workers: file.workers,
        top_n: file.top_n,
        page_delay: Duration::from_millis(file.page_delay_ms),
        run_deadline: file.run_deadline_secs.map(Duration::from_secs),
    };
    let mut fetch_settings = FetchSettings::default();
    if let Some(secs) = file.request_timeout_secs {
        fetch_settings.request_timeout = Duration::from_secs(secs);
    }

    Ok(AppConfig {
        output_dir: PathBuf::from(file.output_dir),
        run_settings,
        fetch_settings,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"(
        output_dir: "out",
        workers: 3,
        entries: [
            (
                category: "Cat Dry Food",
                site: "petvalu",
                base_url: "https://www.petvalu.ca/category/cat/dry-food/21001",
                strategy: "counted-total",
            ),
            (
                category: "Cat Dry Food",
                site: "petsmart",
                base_url: "https://www.petsmart.ca/cat/food-and-treats/dry-food/",
                strategy: "click-next",
            ),
        ],
    )"#;

    #[test]
    fn sample_config_parses_and_validates() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.run_settings.workers, 3);
        assert_eq!(config.run_settings.top_n, harvest_core::DEFAULT_TOP_N);
        assert_eq!(config.plan.entries.len(), 2);
        assert_eq!(config.plan.entries[1].strategy, Strategy::ClickNext);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let text = SAMPLE.replace("counted-total", "infinite-scroll");
        assert!(matches!(
            parse_config(&text),
            Err(ConfigError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn unknown_site_is_rejected() {
        let text = SAMPLE.replace("petvalu", "petgalaxy");
        assert!(matches!(
            parse_config(&text),
            Err(ConfigError::UnknownSite { .. })
        ));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let text = SAMPLE.replace("https://www.petvalu.ca/category/cat/dry-food/21001", "cat/dry-food");
        assert!(matches!(
            parse_config(&text),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
