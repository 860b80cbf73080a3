//! Configuration loading
//!
//! Credentials and output settings live in a TOML file, one section per
//! broker. Session credentials (cookies, CSRF token, bearer token) are
//! short-lived and pasted in by the user from an authenticated browser
//! session; the tool never performs a login itself.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_start_year() -> i32 {
    2017
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Used in the report file name.
    pub username: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    pub kite: Option<KiteConfig>,
    pub indmoney: Option<IndmoneyConfig>,
}

/// Zerodha Kite session credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct KiteConfig {
    pub cookie_holdings: String,
    pub cookie_trades: String,
    pub csrf_token: String,

    /// First year to walk the tradebook from.
    #[serde(default = "default_start_year")]
    pub start_year: i32,
}

/// INDmoney session credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct IndmoneyConfig {
    pub auth_token: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn kite(&self) -> Result<&KiteConfig> {
        self.kite.as_ref().ok_or_else(|| {
            EngineError::ConfigError("missing [kite] section in config".to_string()).into()
        })
    }

    pub fn indmoney(&self) -> Result<&IndmoneyConfig> {
        self.indmoney.as_ref().ok_or_else(|| {
            EngineError::ConfigError("missing [indmoney] section in config".to_string()).into()
        })
    }
}
