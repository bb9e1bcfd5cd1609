//! Application configuration for ClipScout.
//!
//! User config lives at `~/.clipscout/clipscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClipScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "clipscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".clipscout";

/// Canonical origin relative links are resolved against.
pub const DEFAULT_ORIGIN: &str = "https://artlist.io";

/// Largest record count a single extraction may request.
pub const MAX_RECORD_COUNT: usize = 50;

// ---------------------------------------------------------------------------
// Config structs (matching clipscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Browser-identifying User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer header sent with page requests.
    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .into()
}
fn default_referer() -> String {
    "https://artlist.io/".into()
}
fn default_max_redirects() -> usize {
    5
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Canonical site origin for resolving relative URLs.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Provenance tag written into every record.
    #[serde(default = "default_source_tag")]
    pub source_tag: String,

    /// A strategy wins once it yields at least this many candidates.
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,

    /// Over-fetch factor for the precise strategies.
    #[serde(default = "default_headroom")]
    pub headroom: usize,

    /// Over-fetch factor for the generic fallback.
    #[serde(default = "default_generic_overfetch")]
    pub generic_overfetch: usize,

    /// Drop records whose video URL was already seen.
    #[serde(default = "default_true")]
    pub dedup: bool,

    /// Maximum description length in characters.
    #[serde(default = "default_description_max")]
    pub description_max: usize,

    /// Record count used when the CLI is not given one.
    #[serde(default = "default_count")]
    pub default_count: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            source_tag: default_source_tag(),
            min_candidates: default_min_candidates(),
            headroom: default_headroom(),
            generic_overfetch: default_generic_overfetch(),
            dedup: true,
            description_max: default_description_max(),
            default_count: default_count(),
        }
    }
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.into()
}
fn default_source_tag() -> String {
    "artlist.io".into()
}
fn default_min_candidates() -> usize {
    1
}
fn default_headroom() -> usize {
    2
}
fn default_generic_overfetch() -> usize {
    5
}
fn default_true() -> bool {
    true
}
fn default_description_max() -> usize {
    500
}
fn default_count() -> usize {
    20
}

/// `[thumbnails]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Keyword-search image provider.
    #[serde(default = "default_primary_base")]
    pub primary_base: String,

    /// Seeded image provider used when the primary is unreachable.
    #[serde(default = "default_fallback_base")]
    pub fallback_base: String,

    /// Static placeholder service.
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Liveness probe timeout in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Probe providers over the network. When off, synthesis goes straight
    /// to the placeholder.
    #[serde(default = "default_true")]
    pub probe: bool,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            primary_base: default_primary_base(),
            fallback_base: default_fallback_base(),
            placeholder_base: default_placeholder_base(),
            width: default_width(),
            height: default_height(),
            probe_timeout_secs: default_probe_timeout(),
            probe: true,
        }
    }
}

fn default_primary_base() -> String {
    "https://source.unsplash.com".into()
}
fn default_fallback_base() -> String {
    "https://picsum.photos".into()
}
fn default_placeholder_base() -> String {
    "https://placehold.co".into()
}
fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    360
}
fn default_probe_timeout() -> u64 {
    3
}

// ---------------------------------------------------------------------------
// Runtime options (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub referer: String,
    pub max_redirects: usize,
}

impl From<&AppConfig> for FetchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            user_agent: config.fetch.user_agent.clone(),
            referer: config.fetch.referer.clone(),
            max_redirects: config.fetch.max_redirects,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime extraction options.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub origin: Url,
    pub source_tag: String,
    pub min_candidates: usize,
    pub headroom: usize,
    pub generic_overfetch: usize,
    pub dedup: bool,
    pub description_max: usize,
}

impl TryFrom<&AppConfig> for ExtractOptions {
    type Error = ClipScoutError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let ex = &config.extraction;
        let origin = Url::parse(&ex.origin).map_err(|e| {
            ClipScoutError::config(format!("extraction.origin '{}' is not a URL: {e}", ex.origin))
        })?;

        Ok(Self {
            origin,
            source_tag: ex.source_tag.clone(),
            min_candidates: ex.min_candidates.max(1),
            headroom: ex.headroom.max(1),
            generic_overfetch: ex.generic_overfetch.max(1),
            dedup: ex.dedup,
            description_max: ex.description_max,
        })
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("valid default origin"),
            source_tag: default_source_tag(),
            min_candidates: default_min_candidates(),
            headroom: default_headroom(),
            generic_overfetch: default_generic_overfetch(),
            dedup: true,
            description_max: default_description_max(),
        }
    }
}

/// Runtime thumbnail synthesis options.
#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    pub primary_base: String,
    pub fallback_base: String,
    pub placeholder_base: String,
    pub width: u32,
    pub height: u32,
    pub probe_timeout: Duration,
    pub probe: bool,
}

impl From<&AppConfig> for ThumbnailOptions {
    fn from(config: &AppConfig) -> Self {
        let th = &config.thumbnails;
        Self {
            primary_base: th.primary_base.trim_end_matches('/').to_string(),
            fallback_base: th.fallback_base.trim_end_matches('/').to_string(),
            placeholder_base: th.placeholder_base.trim_end_matches('/').to_string(),
            width: th.width,
            height: th.height,
            probe_timeout: Duration::from_secs(th.probe_timeout_secs),
            probe: th.probe,
        }
    }
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Check a requested record count against the accepted range.
pub fn validate_count(count: usize) -> Result<usize> {
    if (1..=MAX_RECORD_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(ClipScoutError::validation(format!(
            "record count must be between 1 and {MAX_RECORD_COUNT}, got {count}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.clipscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClipScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.clipscout/clipscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ClipScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ClipScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ClipScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ClipScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ClipScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
