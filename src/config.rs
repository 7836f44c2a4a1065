//! Run configuration.
//!
//! A configuration file is optional JSON; any field left out takes its
//! default. Command-line flags are applied on top with [`Config::apply`].

use crate::error::{Result, WosError};
use crate::matcher::VenueRule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default report title
const DEFAULT_TITLE: &str = "Citation report";

/// Default output directory
const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Settings for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Export files holding the canonical papers
    pub papers: Vec<PathBuf>,
    /// Export files holding the citing records
    pub citing: Vec<PathBuf>,
    /// Directory receiving the report, CSV and summary
    pub output_dir: PathBuf,
    /// First line of the text report
    pub title: String,
    /// Venue rendering for constructed guesses and the report
    pub venue_rule: VenueRule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            papers: Vec::new(),
            citing: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            title: DEFAULT_TITLE.to_string(),
            venue_rule: VenueRule::default(),
        }
    }
}

/// Values given on the command line; `None` or empty keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub papers: Vec<PathBuf>,
    pub citing: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub venue_rule: Option<VenueRule>,
}

impl Config {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        info!(path = ?path, "Loaded config");
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if !overrides.papers.is_empty() {
            self.papers = overrides.papers;
        }
        if !overrides.citing.is_empty() {
            self.citing = overrides.citing;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if let Some(venue_rule) = overrides.venue_rule {
            self.venue_rule = venue_rule;
        }
        self
    }

    /// Check that there is something to read
    pub fn validate(&self) -> Result<()> {
        if self.papers.is_empty() {
            return Err(WosError::Config("No paper files configured".to_string()));
        }
        if self.citing.is_empty() {
            return Err(WosError::Config("No citing files configured".to_string()));
        }
        Ok(())
    }
}
