//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.folio/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub start_tab: Option<String>,
    pub page_size: Option<usize>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub url: Option<String>,
}

/// Per-command budgets, in seconds.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimeoutConfig {
    pub primary_secs: Option<u64>,
    pub enrichment_secs: Option<u64>,
    pub image_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub filter_debounce_ms: Option<u64>,
    pub list_debounce_ms: Option<u64>,
    pub toast_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "https://api.hardcover.app/v1/graphql";
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_LIST_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Time budgets handed to every command, grouped by command family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub primary: Duration,
    pub enrichment: Duration,
    pub image: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_TIMEOUT,
            enrichment: DEFAULT_ENRICHMENT_TIMEOUT,
            image: DEFAULT_IMAGE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    /// Token from `FOLIO_TOKEN`. Takes precedence over the credential file.
    pub env_token: Option<String>,
    pub start_tab: Option<String>,
    pub page_size: usize,
    pub log_level: String,
    pub timeouts: Timeouts,
    pub filter_debounce: Duration,
    pub list_debounce: Duration,
    pub toast_duration: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&FolioConfig::default(), &CliOverrides::default())
    }
}

/// Values that came from CLI flags (`None` = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub tab: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.folio/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".folio").join("config.toml"))
}

/// Load config from `~/.folio/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FolioConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FolioConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FolioConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<FolioConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FolioConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FolioConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Folio Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# start_tab = "home"                 # "home", "search", "lists" or "stats"
# page_size = 25
# log_level = "debug"                # written to ./folio.log

# [api]
# url = "https://api.hardcover.app/v1/graphql"   # Or set FOLIO_API_URL
# The token itself is stored in ~/.folio/credentials.toml (or FOLIO_TOKEN).

# [timeouts]
# primary_secs = 30                  # library, search, lists, book
# enrichment_secs = 15               # tags, reviews
# image_secs = 10

# [ui]
# filter_debounce_ms = 300
# list_debounce_ms = 250
# toast_secs = 3
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FolioConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable env lookup.
pub fn resolve_with_env(
    config: &FolioConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API URL: CLI → env → config → default
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| env("FOLIO_API_URL"))
        .or_else(|| config.api.url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let env_token = env("FOLIO_TOKEN").filter(|t| !t.trim().is_empty());

    let start_tab = cli.tab.clone().or_else(|| config.general.start_tab.clone());

    let secs = |v: Option<u64>, default: Duration| v.map(Duration::from_secs).unwrap_or(default);
    let millis =
        |v: Option<u64>, default: Duration| v.map(Duration::from_millis).unwrap_or(default);

    ResolvedConfig {
        api_url,
        env_token,
        start_tab,
        page_size: config
            .general
            .page_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        log_level: config
            .general
            .log_level
            .clone()
            .unwrap_or_else(|| "debug".to_string()),
        timeouts: Timeouts {
            primary: secs(config.timeouts.primary_secs, DEFAULT_PRIMARY_TIMEOUT),
            enrichment: secs(config.timeouts.enrichment_secs, DEFAULT_ENRICHMENT_TIMEOUT),
            image: secs(config.timeouts.image_secs, DEFAULT_IMAGE_TIMEOUT),
        },
        filter_debounce: millis(config.ui.filter_debounce_ms, DEFAULT_FILTER_DEBOUNCE),
        list_debounce: millis(config.ui.list_debounce_ms, DEFAULT_LIST_DEBOUNCE),
        toast_duration: secs(config.ui.toast_secs, DEFAULT_TOAST_DURATION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&FolioConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.api_url, DEFAULT_API_URL);
        assert_eq!(resolved.timeouts, Timeouts::default());
        assert_eq!(resolved.timeouts.primary, Duration::from_secs(30));
        assert_eq!(resolved.timeouts.enrichment, Duration::from_secs(15));
        assert_eq!(resolved.timeouts.image, Duration::from_secs(10));
        assert_eq!(resolved.filter_debounce, Duration::from_millis(300));
        assert_eq!(resolved.list_debounce, Duration::from_millis(250));
        assert_eq!(resolved.toast_duration, Duration::from_secs(3));
        assert_eq!(resolved.page_size, DEFAULT_PAGE_SIZE);
        assert!(resolved.env_token.is_none());
    }

    #[test]
    fn test_override_order() {
        let config = FolioConfig {
            api: ApiConfig {
                url: Some("http://file".into()),
            },
            ..Default::default()
        };
        let env = |key: &str| (key == "FOLIO_API_URL").then(|| "http://env".to_string());

        let from_env = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(from_env.api_url, "http://env");

        let cli = CliOverrides {
            api_url: Some("http://cli".into()),
            ..Default::default()
        };
        let from_cli = resolve_with_env(&config, &cli, env);
        assert_eq!(from_cli.api_url, "http://cli");

        let from_file = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(from_file.api_url, "http://file");
    }

    #[test]
    fn test_blank_env_token_ignored() {
        let env = |key: &str| (key == "FOLIO_TOKEN").then(|| "   ".to_string());
        let resolved = resolve_with_env(&FolioConfig::default(), &CliOverrides::default(), env);
        assert!(resolved.env_token.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[timeouts]
enrichment_secs = 5

[ui]
filter_debounce_ms = 100
"#;
        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timeouts.enrichment_secs, Some(5));
        assert!(config.timeouts.primary_secs.is_none());
        assert!(config.api.url.is_none());

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.timeouts.enrichment, Duration::from_secs(5));
        assert_eq!(resolved.timeouts.primary, DEFAULT_PRIMARY_TIMEOUT);
        assert_eq!(resolved.filter_debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let config = FolioConfig {
            general: GeneralConfig {
                page_size: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("folio-config-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.general.start_tab.is_none());
        assert!(path.exists());

        // The generated file is all comments, so it parses back to defaults
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.api.url.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("folio-config-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[ui\nfilter_debounce_ms = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
