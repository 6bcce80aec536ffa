//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mazecast/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::Host;
use crate::core::viewport::{DEFAULT_FONT_SIZE_PX, Margins};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MazecastConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub headless: HeadlessConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub host: Option<Host>,
    pub refresh_ms: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ViewportConfig {
    pub margin_x_px: Option<i32>,
    pub margin_y_px: Option<i32>,
    pub font_size_px: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HeadlessConfig {
    pub frames: Option<u32>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InputConfig {
    pub release_fallback_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:7878";
pub const DEFAULT_REFRESH_MS: u64 = 16;
pub const DEFAULT_MARGIN_X_PX: i32 = 40;
pub const DEFAULT_MARGIN_Y_PX: i32 = 100;
pub const DEFAULT_HEADLESS_FRAMES: u32 = 1;
pub const DEFAULT_HEADLESS_OUTPUT: &str = "mazecast.html";
pub const DEFAULT_RELEASE_FALLBACK_MS: u64 = 600;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: Host,
    pub refresh: Duration,
    pub log_level: LevelFilter,
    pub service_url: String,
    /// `None` means no timeout: a slow call just delays the next frame.
    pub service_timeout: Option<Duration>,
    pub margins: Margins,
    pub font_size_px: u32,
    pub headless_frames: u32,
    pub headless_output: PathBuf,
    /// `None` disables synthetic key releases.
    pub release_fallback: Option<Duration>,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub host: Option<Host>,
    pub service_url: Option<String>,
    pub refresh_ms: Option<u64>,
    pub frames: Option<u32>,
    pub output: Option<PathBuf>,
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

/// Returns the path to `~/.mazecast/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mazecast").join("config.toml"))
}

/// Where the loaded settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from an existing file.
    File(PathBuf),
    /// No file existed; a commented default was written there.
    Generated(PathBuf),
    /// No file existed and the default could not be written.
    GenerateFailed { path: PathBuf, reason: String },
    /// No home directory to look in.
    NoHome,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "loaded {}", path.display()),
            ConfigSource::Generated(path) => {
                write!(f, "no config file, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, reason } => write!(
                f,
                "no config file, failed to generate default at {}: {reason}",
                path.display()
            ),
            ConfigSource::NoHome => write!(f, "could not determine home directory, using defaults"),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: MazecastConfig,
    pub source: ConfigSource,
}

/// Load config from `~/.mazecast/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MazecastConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
///
/// Nothing is logged here: this runs before the logger is up, so the caller
/// reports [`LoadedConfig::source`].
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(LoadedConfig {
            config: MazecastConfig::default(),
            source: ConfigSource::NoHome,
        }),
    }
}

pub fn load_config_from(path: &Path) -> Result<LoadedConfig, ConfigError> {
    if !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated(path.to_path_buf()),
            Err(e) => ConfigSource::GenerateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        };
        return Ok(LoadedConfig {
            config: MazecastConfig::default(),
            source,
        });
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MazecastConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# Mazecast Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# host = "terminal"                  # "terminal" or "headless"
# refresh_ms = 16                    # Display refresh period
# log_level = "debug"                # off, error, warn, info, debug, trace

# [service]
# base_url = "http://127.0.0.1:7878" # Or set MAZECAST_SERVICE_URL
# timeout_ms = 0                     # 0 = wait as long as the service needs

# [viewport]
# margin_x_px = 40                   # Page chrome around the headless viewport
# margin_y_px = 100
# font_size_px = 12

# [headless]
# frames = 1
# output = "mazecast.html"

# [input]
# release_fallback_ms = 600          # For terminals without key-release events; 0 = off
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_CONTENT)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MazecastConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &MazecastConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Host: CLI → env → config → default
    let host = cli
        .host
        .or_else(|| env("MAZECAST_HOST").and_then(|s| Host::from_str(&s, true).ok()))
        .or(config.general.host)
        .unwrap_or_default();

    // Service URL: CLI → env → config → default
    let service_url = cli
        .service_url
        .clone()
        .or_else(|| env("MAZECAST_SERVICE_URL"))
        .or_else(|| config.service.base_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

    // Refresh period: CLI → env → config → default
    let refresh_ms = cli
        .refresh_ms
        .or_else(|| env("MAZECAST_REFRESH_MS").and_then(|s| s.parse().ok()))
        .or(config.general.refresh_ms)
        .unwrap_or(DEFAULT_REFRESH_MS)
        .max(1);

    // Log level: env → config → default
    let log_level = env("MAZECAST_LOG")
        .or_else(|| config.general.log_level.clone())
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let service_timeout = config
        .service
        .timeout_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    let release_fallback_ms = config
        .input
        .release_fallback_ms
        .unwrap_or(DEFAULT_RELEASE_FALLBACK_MS);

    ResolvedConfig {
        host,
        refresh: Duration::from_millis(refresh_ms),
        log_level,
        service_url,
        service_timeout,
        margins: Margins::new(
            config.viewport.margin_x_px.unwrap_or(DEFAULT_MARGIN_X_PX),
            config.viewport.margin_y_px.unwrap_or(DEFAULT_MARGIN_Y_PX),
        ),
        font_size_px: config.viewport.font_size_px.unwrap_or(DEFAULT_FONT_SIZE_PX),
        headless_frames: cli
            .frames
            .or(config.headless.frames)
            .unwrap_or(DEFAULT_HEADLESS_FRAMES),
        headless_output: cli
            .output
            .clone()
            .or_else(|| config.headless.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HEADLESS_OUTPUT)),
        release_fallback: (release_fallback_ms > 0)
            .then(|| Duration::from_millis(release_fallback_ms)),
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
        let resolved = resolve_with_env(&MazecastConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.host, Host::Terminal);
        assert_eq!(resolved.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(resolved.refresh, Duration::from_millis(16));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert_eq!(resolved.service_timeout, None);
        assert_eq!(resolved.margins, Margins::new(40, 100));
        assert_eq!(resolved.font_size_px, 12);
        assert_eq!(resolved.headless_frames, 1);
        assert_eq!(resolved.headless_output, PathBuf::from("mazecast.html"));
        assert_eq!(resolved.release_fallback, Some(Duration::from_millis(600)));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = MazecastConfig {
            general: GeneralConfig {
                host: Some(Host::Headless),
                refresh_ms: Some(33),
                log_level: Some("warn".to_string()),
            },
            service: ServiceConfig {
                base_url: Some("http://sim.local:9000".to_string()),
                timeout_ms: Some(2500),
            },
            input: InputConfig {
                release_fallback_ms: Some(0),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.host, Host::Headless);
        assert_eq!(resolved.refresh, Duration::from_millis(33));
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.service_url, "http://sim.local:9000");
        assert_eq!(resolved.service_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(resolved.release_fallback, None);
    }

    #[test]
    fn test_env_wins_over_config_and_cli_wins_over_env() {
        let config = MazecastConfig {
            service: ServiceConfig {
                base_url: Some("http://from-file".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "MAZECAST_SERVICE_URL" => Some("http://from-env".to_string()),
            "MAZECAST_HOST" => Some("HEADLESS".to_string()),
            "MAZECAST_REFRESH_MS" => Some("20".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.service_url, "http://from-env");
        assert_eq!(resolved.host, Host::Headless);
        assert_eq!(resolved.refresh, Duration::from_millis(20));

        let cli = CliOverrides {
            host: Some(Host::Terminal),
            service_url: Some("http://from-cli".to_string()),
            refresh_ms: Some(5),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.service_url, "http://from-cli");
        assert_eq!(resolved.host, Host::Terminal);
        assert_eq!(resolved.refresh, Duration::from_millis(5));
    }

    #[test]
    fn test_zero_refresh_is_raised_to_one_millisecond() {
        let cli = CliOverrides {
            refresh_ms: Some(0),
            ..Default::default()
        };
        let resolved = resolve_with_env(&MazecastConfig::default(), &cli, no_env);
        assert_eq!(resolved.refresh, Duration::from_millis(1));
    }

    #[test]
    fn test_bad_env_values_fall_through() {
        let env = |key: &str| match key {
            "MAZECAST_HOST" => Some("browser".to_string()),
            "MAZECAST_REFRESH_MS" => Some("fast".to_string()),
            "MAZECAST_LOG" => Some("loud".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&MazecastConfig::default(), &CliOverrides::default(), env);
        assert_eq!(resolved.host, Host::Terminal);
        assert_eq!(resolved.refresh, Duration::from_millis(DEFAULT_REFRESH_MS));
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
host = "headless"
refresh_ms = 40
log_level = "info"

[service]
base_url = "http://192.168.1.100:7878"
timeout_ms = 1000

[viewport]
margin_x_px = 0
margin_y_px = 0
font_size_px = 14

[headless]
frames = 12
output = "out/frame.html"
"#;
        let config: MazecastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.host, Some(Host::Headless));
        assert_eq!(config.general.refresh_ms, Some(40));
        assert_eq!(
            config.service.base_url.as_deref(),
            Some("http://192.168.1.100:7878")
        );
        assert_eq!(config.viewport.font_size_px, Some(14));
        assert_eq!(config.headless.frames, Some(12));
        assert_eq!(config.headless.output, Some(PathBuf::from("out/frame.html")));
        assert!(config.input.release_fallback_ms.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[service]
base_url = "http://sim:1"
"#;
        let config: MazecastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.base_url.as_deref(), Some("http://sim:1"));
        assert!(config.general.host.is_none());
        assert!(config.headless.frames.is_none());
    }

    #[test]
    fn test_generated_default_config_parses_to_defaults() {
        let config: MazecastConfig = toml::from_str(DEFAULT_CONFIG_CONTENT).unwrap();
        assert!(config.general.host.is_none());
        assert!(config.service.base_url.is_none());
    }

    #[test]
    fn test_missing_file_is_generated() {
        let dir = std::env::temp_dir().join(format!("mazecast-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let loaded = load_config_from(&path).unwrap();

        assert!(loaded.config.general.host.is_none());
        assert_eq!(loaded.source, ConfigSource::Generated(path.clone()));
        assert!(path.exists());

        // The second run reads the generated file back.
        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.source, ConfigSource::File(path.clone()));
        assert!(reloaded.config.service.base_url.is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_source_messages() {
        let path = PathBuf::from("/home/u/.mazecast/config.toml");
        assert_eq!(
            ConfigSource::File(path.clone()).to_string(),
            "loaded /home/u/.mazecast/config.toml"
        );
        assert_eq!(
            ConfigSource::Generated(path.clone()).to_string(),
            "no config file, generated default at /home/u/.mazecast/config.toml"
        );
        let failed = ConfigSource::GenerateFailed {
            path,
            reason: "read-only file system".to_string(),
        };
        assert!(failed.to_string().ends_with(": read-only file system"));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("mazecast-bad-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\nhost = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
