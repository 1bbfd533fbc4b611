use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::categories::{Category, CategoryBudgets, CategoryCatalog};
use crate::clock::{SystemClock, ZoneSpec};
use crate::stats::DEFAULT_SAVINGS_CATEGORY;

/// Default household member that auto-registered transactions belong to.
fn default_user_id() -> String {
    "me".to_string()
}

fn default_savings_category() -> String {
    DEFAULT_SAVINGS_CATEGORY.to_string()
}

fn default_trend_months() -> usize {
    6
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// When true, render amounts with thousands separators.
    ///
    /// This only affects optional `*_display` fields.
    pub currency_grouping: bool,

    /// Optional currency symbol (e.g. "₩", "$") for display rendering.
    pub currency_symbol: Option<String>,
}

/// Monthly statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Expense category counted as saving rather than spending.
    #[serde(default = "default_savings_category")]
    pub savings_category: String,

    /// Number of months shown by `trend` when none is requested.
    #[serde(default = "default_trend_months")]
    pub trend_months: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            savings_category: default_savings_category(),
            trend_months: default_trend_months(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Household member recorded on auto-registered transactions.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Zone that decides which calendar day "today" is
    /// (`local`, `utc`, or an IANA name). Defaults to local time.
    pub timezone: Option<String>,

    /// Statistics settings.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Display/output formatting settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Monthly budget per expense category id.
    #[serde(default)]
    pub budgets: BTreeMap<String, i64>,

    /// Replaces the built-in category set when present.
    pub categories: Option<Vec<Category>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            user_id: default_user_id(),
            timezone: None,
            stats: StatsConfig::default(),
            display: DisplayConfig::default(),
            budgets: BTreeMap::new(),
            categories: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }

    /// Validate and resolve against `config_dir`.
    pub fn resolve(self, config_dir: &Path) -> Result<ResolvedConfig> {
        let data_dir = self.resolve_data_dir(config_dir);
        let zone = ZoneSpec::parse(self.timezone.as_deref())?;

        let catalog = match self.categories {
            Some(categories) => {
                CategoryCatalog::new(categories).context("Invalid [[categories]] table")?
            }
            None => CategoryCatalog::household_defaults(),
        };
        let budgets =
            CategoryBudgets::new(&catalog, self.budgets).context("Invalid [budgets] table")?;

        anyhow::ensure!(
            !self.user_id.trim().is_empty(),
            "user_id must not be empty"
        );

        Ok(ResolvedConfig {
            data_dir,
            user_id: self.user_id,
            zone,
            stats: self.stats,
            display: self.display,
            catalog,
            budgets,
        })
    }
}

/// Loaded configuration with resolved paths, zone and validated budgets.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    pub user_id: String,

    pub zone: ZoneSpec,

    /// Statistics settings.
    pub stats: StatsConfig,

    /// Display/output formatting settings.
    pub display: DisplayConfig,

    pub catalog: CategoryCatalog,

    pub budgets: CategoryBudgets,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./hearthbook.toml` if it exists in current directory
/// 2. `~/.local/share/hearthbook/hearthbook.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("hearthbook.toml");
    if local_config.exists() {
        return local_config;
    }

    // XDG data directory fallback
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("hearthbook").join("hearthbook.toml");
    }

    // Final fallback to local
    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Config::load(&config_path)?.resolve(config_dir)
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// If the config file doesn't exist, uses the config file's intended
    /// parent directory as the data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Config::default().resolve(config_dir)
    }

    /// Wall clock in the configured zone.
    pub fn clock(&self) -> SystemClock {
        SystemClock::in_zone(self.zone.clone())
    }
}
