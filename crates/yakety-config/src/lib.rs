//! Configuration management for the Yakety dev server.
//!
//! Parses `yakety.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3333
//! dev = true
//!
//! [static]
//! dir = "html"
//!
//! [live_reload]
//! root = "html"
//! watch_patterns = ["build/**"]
//! debounce_ms = 0
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override development mode flag.
    pub dev: Option<bool>,
    /// Override static files directory.
    pub static_dir: Option<PathBuf>,
    /// Override live reload watch root.
    pub watch_root: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "yakety.toml";

/// Default directory for both static files and the watched root.
const DEFAULT_ASSET_DIR: &str = "html";

/// Upper bound for the debounce window.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Static files configuration (paths are relative strings from TOML).
    #[serde(rename = "static")]
    static_files: StaticConfigRaw,
    /// Live reload configuration (paths are relative strings from TOML).
    live_reload: LiveReloadConfigRaw,

    /// Resolved static files configuration (set after loading).
    #[serde(skip)]
    pub static_resolved: StaticConfig,
    /// Resolved live reload configuration (set after loading).
    #[serde(skip)]
    pub live_reload_resolved: LiveReloadConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Development mode. Live reload only exists when this is set.
    pub dev: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3333,
            dev: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StaticConfigRaw {
    dir: Option<String>,
}

/// Resolved static files configuration.
#[derive(Debug, Default)]
pub struct StaticConfig {
    /// Directory served as the HTTP fallback.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LiveReloadConfigRaw {
    root: Option<String>,
    watch_patterns: Option<Vec<String>>,
    debounce_ms: Option<u64>,
    client_port: Option<u16>,
}

/// Resolved live reload configuration with absolute paths.
#[derive(Debug, Default)]
pub struct LiveReloadConfig {
    /// Directory watched recursively for changes.
    pub root: PathBuf,
    /// Glob patterns (relative to `root`) that may trigger a reload.
    /// Empty means every non-hidden path.
    pub watch_patterns: Vec<String>,
    /// Debounce window in milliseconds. Zero forwards every event as-is.
    pub debounce_ms: u64,
    /// Port the browser script connects to, when it differs from `server.port`
    /// (e.g. behind a container port mapping).
    pub client_port: Option<u16>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `yakety.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Port the browser script should connect to.
    #[must_use]
    pub fn client_port(&self) -> u16 {
        self.live_reload_resolved
            .client_port
            .unwrap_or(self.server.port)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(dev) = settings.dev {
            self.server.dev = dev;
        }
        if let Some(static_dir) = &settings.static_dir {
            self.static_resolved.dir.clone_from(static_dir);
        }
        if let Some(watch_root) = &settings.watch_root {
            self.live_reload_resolved.root.clone_from(watch_root);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: StaticConfigRaw::default(),
            live_reload: LiveReloadConfigRaw::default(),
            static_resolved: StaticConfig {
                dir: base.join(DEFAULT_ASSET_DIR),
            },
            live_reload_resolved: LiveReloadConfig {
                root: base.join(DEFAULT_ASSET_DIR),
                ..LiveReloadConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_live_reload()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but the
        // browser script needs a well-known port to connect back to
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        let live_reload = &self.live_reload_resolved;

        if live_reload.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "live_reload.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }

        if live_reload.client_port == Some(0) {
            return Err(ConfigError::Validation(
                "live_reload.client_port cannot be 0".to_owned(),
            ));
        }

        for pattern in &live_reload.watch_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!(
                    "live_reload.watch_patterns: invalid pattern '{pattern}': {e}"
                ))
            })?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>| config_dir.join(path.unwrap_or(DEFAULT_ASSET_DIR));

        self.static_resolved = StaticConfig {
            dir: resolve(self.static_files.dir.as_deref()),
        };

        self.live_reload_resolved = LiveReloadConfig {
            root: resolve(self.live_reload.root.as_deref()),
            watch_patterns: self.live_reload.watch_patterns.clone().unwrap_or_default(),
            debounce_ms: self.live_reload.debounce_ms.unwrap_or(0),
            client_port: self.live_reload.client_port,
        };
    }
}
