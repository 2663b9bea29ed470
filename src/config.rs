use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::taxonomy::Taxonomy;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bspec: BspecConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

/// Core configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BspecConfig {
    /// Directory containing the BSpec markdown documents.
    pub docs_folder: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Query engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Default number of results for similarity search
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
    /// Result count above which the engine suggests narrowing filters
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            similar_limit: default_similar_limit(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

/// Optional overrides for the built-in taxonomy tables.
///
/// Domains and type codes are plain strings here; [`Taxonomy::from_config`]
/// checks them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyConfig {
    pub type_domains: Option<BTreeMap<String, String>>,
    pub domain_types: Option<BTreeMap<String, Vec<String>>>,
    pub families: Option<BTreeMap<String, Vec<String>>>,
    /// Codes accepted as a document `type`
    pub known_types: Option<Vec<String>>,
    /// Types placed first on the critical path
    pub foundation_types: Option<Vec<String>>,
    pub known_type_count: Option<usize>,
    pub strategic_domain: Option<String>,
    pub fallback_domain: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_similar_limit() -> usize {
    5
}

fn default_suggestion_threshold() -> usize {
    100
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in BSPEC_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("BSPEC_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Load and validate a specific config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Config for a docs folder with every other setting defaulted
    pub fn for_docs_folder(docs_folder: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            bspec: BspecConfig {
                docs_folder: docs_folder.into(),
                log_level: default_log_level(),
            },
            query: QueryConfig::default(),
            taxonomy: TaxonomyConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.bspec.docs_folder.exists() {
            anyhow::bail!(
                "docs_folder path does not exist: {}. Set docs_folder in config.toml to your BSpec documents directory.",
                self.bspec.docs_folder.display()
            );
        }

        if !self.bspec.docs_folder.is_dir() {
            anyhow::bail!(
                "docs_folder must be a directory, not a file: {}",
                self.bspec.docs_folder.display()
            );
        }

        if self.query.similar_limit == 0 {
            anyhow::bail!("query.similar_limit must be greater than 0");
        }

        // Surface taxonomy errors at load time rather than on first use
        self.build_taxonomy()?;

        Ok(())
    }

    /// Get the docs root path
    pub fn docs_folder(&self) -> &Path {
        &self.bspec.docs_folder
    }

    /// Build the taxonomy described by the `[taxonomy]` section
    pub fn build_taxonomy(&self) -> Result<Taxonomy> {
        Taxonomy::from_config(&self.taxonomy).context("Invalid [taxonomy] section")
    }
}
