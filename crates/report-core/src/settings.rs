use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::models::OpportunisticSet;
use crate::time_utils;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly per-site usage report comparing each organization with the month before
#[derive(Parser, Debug, Clone)]
#[command(
    name = "site-report",
    about = "Monthly per-site usage report comparing each organization with the month before",
    version
)]
pub struct Settings {
    /// Any date inside the report month (yyyy-mm-dd or yyyy/mm/dd); defaults to last month
    #[arg(long)]
    pub date: Option<String>,

    /// Directory holding the stored aggregation results
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated opportunistic organizations
    #[arg(long)]
    pub opportunistic: Option<String>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "csv", "html", "json"])]
    pub format: String,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report recipients (comma-separated)
    #[arg(long = "to", value_delimiter = ',')]
    pub recipients: Vec<String>,

    /// Report title (defaults to one naming the report month)
    #[arg(long)]
    pub title: Option<String>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Build the report but do not deliver it
    #[arg(long)]
    pub dry_run: bool,
}

// ── ReportConfig ───────────────────────────────────────────────────────────────

/// Persistent configuration read from `~/.site-report/config.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ReportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunistic_orgs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl ReportConfig {
    /// Default config file location: `~/.site-report/config.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&base_dir())
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".site-report").join("config.json")
    }

    /// Load from an explicit path. A missing or unreadable file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `path` if it exists, otherwise return the default config.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge in the config file.
    pub fn load() -> Result<Self> {
        Self::load_impl(std::env::args_os().collect(), &ReportConfig::config_path())
    }

    /// Full implementation: explicit args and default config path so tests
    /// can redirect to a temporary directory.
    ///
    /// `--config` overrides `default_config`; a missing default file is
    /// fine, a missing explicit one is not. Values given on the command line
    /// always win over the file.
    pub fn load_impl(args: Vec<std::ffi::OsString>, default_config: &Path) -> Result<Self> {
        // Raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        let config = match &settings.config {
            Some(path) => ReportConfig::load_from(path)?,
            None => ReportConfig::load_or_default(default_config)?,
        };

        if !is_arg_explicitly_set(&matches, "opportunistic") {
            if let Some(orgs) = config.opportunistic_orgs {
                settings.opportunistic = Some(orgs.join(","));
            }
        }
        if !is_arg_explicitly_set(&matches, "data_dir") && settings.data_dir.is_none() {
            settings.data_dir = config.data_dir;
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(format) = config.format {
                settings.format = format;
            }
        }
        if !is_arg_explicitly_set(&matches, "recipients") && settings.recipients.is_empty() {
            settings.recipients = config.recipients;
        }
        if !is_arg_explicitly_set(&matches, "log_file") && settings.log_file.is_none() {
            settings.log_file = config.log_file;
        }

        if settings.verbose {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// The configured opportunistic organizations.
    pub fn opportunistic_set(&self) -> Result<OpportunisticSet> {
        match &self.opportunistic {
            Some(list) => OpportunisticSet::parse_list(list),
            None => Err(ReportError::Config(
                "no opportunistic organizations configured (use --opportunistic or the config file)"
                    .to_string(),
            )),
        }
    }

    /// Date inside the report month; defaults to a day in last month.
    pub fn report_date(&self) -> Result<NaiveDate> {
        match &self.date {
            Some(s) => time_utils::parse_date(s),
            None => Ok(time_utils::prev_month_range(Local::now().date_naive()).0),
        }
    }

    /// Directory of stored results, defaulting to `~/.site-report/data`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| base_dir().join(".site-report").join("data"))
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn base_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
