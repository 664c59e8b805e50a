use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::Cli;

pub const CONFIG_ENV_VAR: &str = "EPISODE_SCRAPER_CONFIG";

const SEASON_PLACEHOLDER: &str = "{season}";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub url_template: String,
    pub first_season: u64,
    pub last_season: u64,
    pub output: PathBuf,
    pub markers: RowMarkers,
}

/// Class names and cell positions that identify episode rows in a season page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RowMarkers {
    /// Class of the `<table>` holding the episode list
    pub table: String,
    /// Class of a row carrying one episode's summary line
    pub entry_row: String,
    /// Class of the sibling row carrying the expanded synopsis
    pub detail_row: String,
    /// Class of the `<div>` inside a detail row holding the synopsis text
    pub summary: String,
    /// Zero-based `<td>` index of the title inside an entry row
    pub title_cell: usize,
    /// Entry rows with fewer `<td>` cells than this are ignored
    pub min_cells: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: "https://en.wikipedia.org/wiki/Seinfeld_season_{season}".to_string(),
            first_season: 1,
            last_season: 9,
            output: PathBuf::from("seinfeld_episodes.json"),
            markers: RowMarkers::default(),
        }
    }
}

impl Default for RowMarkers {
    fn default() -> Self {
        Self {
            table: "wikiepisodetable".to_string(),
            entry_row: "vevent".to_string(),
            detail_row: "expand-child".to_string(),
            summary: "shortSummaryText".to_string(),
            title_cell: 1,
            min_cells: 3,
        }
    }
}

impl ScrapeConfig {
    pub fn seasons(&self) -> RangeInclusive<u64> {
        self.first_season..=self.last_season
    }

    pub fn page_url(&self, season: u64) -> String {
        page_url(&self.url_template, season)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.output = output.clone();
        }
        if let Some(first) = cli.first_season {
            self.first_season = first;
        }
        if let Some(last) = cli.last_season {
            self.last_season = last;
        }
        if let Some(template) = &cli.url_template {
            self.url_template = template.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains(SEASON_PLACEHOLDER) {
            bail!(
                "url_template \"{}\" must contain the {SEASON_PLACEHOLDER} placeholder",
                self.url_template
            );
        }
        if self.first_season == 0 {
            bail!("first_season must be at least 1");
        }
        if self.first_season > self.last_season {
            bail!(
                "first_season ({}) is after last_season ({})",
                self.first_season,
                self.last_season
            );
        }

        let markers = &self.markers;
        for (key, class) in [
            ("markers.table", &markers.table),
            ("markers.entry_row", &markers.entry_row),
            ("markers.detail_row", &markers.detail_row),
            ("markers.summary", &markers.summary),
        ] {
            if !is_class_name(class) {
                bail!("{key} \"{class}\" is not a usable CSS class name");
            }
        }
        if markers.title_cell >= markers.min_cells {
            bail!(
                "markers.title_cell ({}) must be below markers.min_cells ({})",
                markers.title_cell,
                markers.min_cells
            );
        }

        Ok(())
    }
}

pub fn page_url(template: &str, season: u64) -> String {
    template.replace(SEASON_PLACEHOLDER, &season.to_string())
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, PartialEq, Eq)]
enum ConfigPath {
    /// Named by the user; must exist
    Explicit(PathBuf),
    /// Standard location; optional
    Default(PathBuf),
}

fn resolve_config_path(flag: Option<&Path>, env_value: Option<OsString>) -> ConfigPath {
    if let Some(path) = flag {
        return ConfigPath::Explicit(path.to_path_buf());
    }
    match env_value {
        Some(value) if !value.is_empty() => ConfigPath::Explicit(PathBuf::from(value)),
        _ => ConfigPath::Default(get_config_path()),
    }
}

fn read_config_file(path: &Path) -> Result<ScrapeConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Resolves the effective configuration: config file, then CLI overrides.
pub fn load(cli: &Cli) -> Result<ScrapeConfig> {
    let mut config = match resolve_config_path(cli.config.as_deref(), env::var_os(CONFIG_ENV_VAR))
    {
        ConfigPath::Explicit(path) => {
            debug!(path = %path.display(), "loading config");
            read_config_file(&path)?
        }
        ConfigPath::Default(path) if path.exists() => {
            debug!(path = %path.display(), "loading default config");
            read_config_file(&path)?
        }
        ConfigPath::Default(_) => {
            debug!("no config file found, using built-in defaults");
            ScrapeConfig::default()
        }
    };

    config.apply_overrides(cli);
    config.validate()?;
    Ok(config)
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("episode-scraper"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}
