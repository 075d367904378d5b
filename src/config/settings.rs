//! Application settings loaded from `config.toml`.
//!
//! The file is optional. When it is absent the defaults apply and no staff
//! accounts are seeded. The path can be overridden with `KOMPOST_CONFIG`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Limits for paginated listings
    #[serde(default)]
    pub listing: ListingConfig,
    /// Staff accounts to create on start-up
    #[serde(default)]
    pub staff: Vec<StaffConfig>,
}

/// Limits applied to the admin pickup listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Largest `limit` a caller may request per page
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

const fn default_max_page_size() -> u64 {
    DEFAULT_MAX_PAGE_SIZE
}

/// A staff account to seed. The credential is stored as given.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffConfig {
    /// Login email
    pub email: String,
    /// Pre-hashed credential
    pub password_hash: String,
    /// Contact phone number
    pub phone: String,
    /// Given name
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// One of `super_admin`, `hub_manager`, `collection_staff`, `processor`
    pub role: String,
    /// Hub the staff member works from
    #[serde(default)]
    pub hub_location: String,
    /// Department
    #[serde(default)]
    pub department: String,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `KOMPOST_CONFIG` or `./config.toml`, falling back to defaults
/// when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("KOMPOST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!(%path, "config file not found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
