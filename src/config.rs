//! Command-line and file configuration.
//!
//! Sources, highest priority first:
//! 1. Command-line flags (and their `ISITONION_*` environment variables)
//! 2. TOML file given with `--config`
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::select::RetryPolicy;
use crate::validate::Rules;

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com/r";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const APP_DIR: &str = "isitonion";

#[derive(Debug, Parser)]
#[command(name = "isitonion", version, about = "Guess whether a headline is from The Onion")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "ISITONION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subreddit root URL.
    #[arg(long, env = "ISITONION_BASE_URL")]
    pub base_url: Option<String>,

    /// Reject titles containing this text (repeatable; replaces the
    /// defaults).
    #[arg(long = "banned-word", value_name = "TEXT")]
    pub banned_words: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ISITONION_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Consecutive fetch failures before giving up.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Where the aggregate score tally is kept.
    #[arg(long, env = "ISITONION_TALLY")]
    pub tally: Option<PathBuf>,

    /// Keep the tally in memory only.
    #[arg(long)]
    pub no_tally: bool,

    /// Log file (the terminal is taken by the UI).
    #[arg(long, env = "ISITONION_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Schema of the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub banned_words: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub retry: Option<RetryPolicy>,
    pub tally: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub rules: Rules,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// `None` keeps the tally in memory.
    pub tally: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl Settings {
    /// Load the config file named on the command line (if any) and merge.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let rules = if !cli.banned_words.is_empty() {
            Rules {
                banned_words: cli.banned_words.clone(),
            }
        } else if let Some(words) = file.banned_words {
            Rules {
                banned_words: words,
            }
        } else {
            Rules::default()
        };

        let mut retry = file.retry.unwrap_or_default();
        if let Some(n) = cli.max_attempts {
            retry.max_attempts = n;
        }

        let tally = if cli.no_tally {
            None
        } else {
            Some(
                cli.tally
                    .clone()
                    .or(file.tally)
                    .unwrap_or_else(|| data_dir().join("tally.json")),
            )
        };

        Self {
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            rules,
            timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            retry,
            tally,
            log_file: cli
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or_else(|| data_dir().join("isitonion.log")),
        }
    }
}

/// Per-user data directory, falling back to the working directory.
fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["isitonion"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let s = Settings::merge(&cli(&[]), FileConfig::default());
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.rules, Rules::default());
        assert_eq!(s.timeout, Duration::from_secs(30));
        assert_eq!(s.retry, RetryPolicy::default());
        assert!(s.tally.unwrap().ends_with("tally.json"));
    }

    #[test]
    fn file_values_apply() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("isitonion.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://localhost:9000/r"
banned_words = ["Quiz:", "?", "Opinion"]
timeout_secs = 5
tally = "/tmp/tally.json"

[retry]
max_attempts = 2
initial_delay_ms = 100
"#,
        )
        .unwrap();

        let file = FileConfig::load(&path).unwrap();
        let s = Settings::merge(&cli(&[]), file);
        assert_eq!(s.base_url, "http://localhost:9000/r");
        assert_eq!(s.rules.banned_words.len(), 3);
        assert_eq!(s.timeout, Duration::from_secs(5));
        assert_eq!(s.retry.max_attempts, 2);
        assert_eq!(s.retry.initial_delay_ms, 100);
        // Unset retry fields keep their defaults.
        assert_eq!(s.retry.max_delay_ms, RetryPolicy::default().max_delay_ms);
        assert_eq!(s.tally, Some(PathBuf::from("/tmp/tally.json")));
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            base_url: Some("http://file".into()),
            banned_words: Some(vec!["File".into()]),
            timeout_secs: Some(5),
            ..FileConfig::default()
        };
        let s = Settings::merge(
            &cli(&[
                "--base-url",
                "http://flag",
                "--banned-word",
                "Flag",
                "--timeout-secs",
                "9",
                "--max-attempts",
                "7",
            ]),
            file,
        );
        assert_eq!(s.base_url, "http://flag");
        assert_eq!(s.rules.banned_words, vec!["Flag".to_string()]);
        assert_eq!(s.timeout, Duration::from_secs(9));
        assert_eq!(s.retry.max_attempts, 7);
    }

    #[test]
    fn no_tally_disables_file() {
        let s = Settings::merge(&cli(&["--no-tally", "--tally", "/x"]), FileConfig::default());
        assert!(s.tally.is_none());
    }

    #[test]
    fn unknown_file_keys_are_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let c = cli(&["--config", "/definitely/not/here.toml"]);
        let err = Settings::resolve(&c).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
