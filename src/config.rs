//! Startup configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON config
//! file, then command-line flags. The API credential comes from the
//! environment and is read once, before the window opens.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigError;

const DEFAULT_DATA_ROOT: &str = "simulation_data";
const DEFAULT_MEDIA_ROOT: &str = "pre_rendered_plots";
const DEFAULT_PLOT_OUTPUT: &str = "output_plot.png";
const DEFAULT_REFLECTION_LOG: &str = "student_reflections.txt";
const DEFAULT_PYTHON: &str = "python3";
const DEFAULT_MODEL: &str = "gpt-4-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TUTOR_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PLOT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_MEDIA_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the chat API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the chat API base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Parser, Debug, Default)]
#[command(name = "smbh-explorer")]
#[command(about = "SMBH simulation explorer with an AI tutor")]
pub struct Cli {
    /// JSON config file (defaults to <config dir>/smbh-explorer/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory containing one sub-directory per simulation scenario
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Directory containing pre-rendered .png/.gif/.mp4 files
    #[arg(long)]
    pub media_root: Option<PathBuf>,

    /// Where generated slice plots are written (overwritten each time)
    #[arg(long)]
    pub plot_output: Option<PathBuf>,

    /// Append-only file collecting student reflections
    #[arg(long)]
    pub reflection_log: Option<PathBuf>,

    /// Chat model used by the tutor
    #[arg(long)]
    pub model: Option<String>,

    /// Python interpreter with yt installed
    #[arg(long)]
    pub python: Option<String>,

    /// ffmpeg binary used to decode .mp4 media for inline playback
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Seconds before a tutor request is abandoned
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tutor_timeout_secs: Option<u64>,

    /// Seconds before plot generation is killed
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub plot_timeout_secs: Option<u64>,
}

/// On-disk config file. Every field is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_root: Option<PathBuf>,
    pub media_root: Option<PathBuf>,
    pub plot_output: Option<PathBuf>,
    pub reflection_log: Option<PathBuf>,
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub python: Option<String>,
    pub ffmpeg: Option<String>,
    pub tutor_timeout_secs: Option<u64>,
    pub plot_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the config file.
    ///
    /// An explicitly requested file must exist; the default location is
    /// optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path, true),
            None => match default_config_path() {
                Some(path) => Self::load_from(&path, false),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load `path`. A missing file is an error only when `required`.
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        // Nothing at the default location means built-in defaults
        if !required && !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // A zero timeout would fail every request before it starts
        for (key, value) in [
            ("tutor_timeout_secs", config.tutor_timeout_secs),
            ("plot_timeout_secs", config.plot_timeout_secs),
        ] {
            if value == Some(0) {
                return Err(ConfigError::ZeroTimeout {
                    path: path.to_path_buf(),
                    key,
                });
            }
        }

        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Default config file location
/// - Linux: ~/.config/smbh-explorer/config.json
/// - macOS: ~/Library/Application Support/smbh-explorer/config.json
/// - Windows: %APPDATA%\smbh-explorer\config.json
fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("smbh-explorer");
    path.push("config.json");
    Some(path)
}

/// Settings for the external visualization step
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub output: PathBuf,
    pub python: String,
    pub timeout: Duration,
}

/// Settings for inline playback of pre-rendered media
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConfig {
    pub ffmpeg: String,
    pub timeout: Duration,
}

/// Settings for the chat-completion client
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Fully resolved application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_root: PathBuf,
    pub media_root: PathBuf,
    pub reflection_log: PathBuf,
    pub plot: PlotConfig,
    pub media: MediaConfig,
    pub tutor: TutorConfig,
}

/// Values read from the process environment
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Env {
    pub fn from_process() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
            base_url: std::env::var(BASE_URL_ENV).ok().filter(|u| !u.trim().is_empty()),
        }
    }
}

impl AppConfig {
    /// Read the config file named by the CLI (if any) and resolve everything
    pub fn load(cli: &Cli, env: Env) -> Result<Self, ConfigError> {
        let file = FileConfig::load(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file, env))
    }

    /// Merge the layers. CLI beats file beats defaults; the environment
    /// base URL beats the file.
    pub fn resolve(cli: &Cli, file: FileConfig, env: Env) -> Self {
        let pick_path = |flag: &Option<PathBuf>, file: Option<PathBuf>, default: &str| {
            flag.clone()
                .or(file)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let data_root = pick_path(&cli.data_root, file.data_root, DEFAULT_DATA_ROOT);
        let media_root = pick_path(&cli.media_root, file.media_root, DEFAULT_MEDIA_ROOT);
        let plot_output = pick_path(&cli.plot_output, file.plot_output, DEFAULT_PLOT_OUTPUT);
        let reflection_log =
            pick_path(&cli.reflection_log, file.reflection_log, DEFAULT_REFLECTION_LOG);

        let plot = PlotConfig {
            output: plot_output,
            python: cli
                .python
                .clone()
                .or(file.python)
                .unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
            timeout: Duration::from_secs(
                cli.plot_timeout_secs
                    .or(file.plot_timeout_secs)
                    .unwrap_or(DEFAULT_PLOT_TIMEOUT_SECS),
            ),
        };

        let media = MediaConfig {
            ffmpeg: cli
                .ffmpeg
                .clone()
                .or(file.ffmpeg)
                .unwrap_or_else(|| DEFAULT_FFMPEG.to_string()),
            timeout: Duration::from_secs(DEFAULT_MEDIA_TIMEOUT_SECS),
        };

        let tutor = TutorConfig {
            api_key: env.api_key,
            base_url: env
                .base_url
                .or(file.api_base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: cli
                .model
                .clone()
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                cli.tutor_timeout_secs
                    .or(file.tutor_timeout_secs)
                    .unwrap_or(DEFAULT_TUTOR_TIMEOUT_SECS),
            ),
        };

        AppConfig {
            data_root,
            media_root,
            reflection_log,
            plot,
            media,
            tutor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&Cli::default(), FileConfig::default(), Env::default());

        assert_eq!(config.data_root, PathBuf::from("simulation_data"));
        assert_eq!(config.media_root, PathBuf::from("pre_rendered_plots"));
        assert_eq!(config.plot.output, PathBuf::from("output_plot.png"));
        assert_eq!(config.reflection_log, PathBuf::from("student_reflections.txt"));
        assert_eq!(config.tutor.model, "gpt-4-turbo");
        assert_eq!(config.tutor.base_url, "https://api.openai.com/v1");
        assert_eq!(config.tutor.timeout, Duration::from_secs(60));
        assert_eq!(config.media.ffmpeg, "ffmpeg");
        assert!(config.tutor.api_key.is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::from_json(
            r#"{ "data_root": "/srv/sims", "model": "gpt-4o", "tutor_timeout_secs": 30 }"#,
        )
        .unwrap();
        let cli = Cli {
            data_root: Some(PathBuf::from("/mnt/runs")),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, file, Env::default());

        assert_eq!(config.data_root, PathBuf::from("/mnt/runs"));
        assert_eq!(config.tutor.model, "gpt-4o");
        assert_eq!(config.tutor.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_supplies_credential_and_base_url() {
        let file = FileConfig::from_json(r#"{ "api_base_url": "http://file.example/v1" }"#).unwrap();
        let env = Env {
            api_key: Some("sk-test".to_string()),
            base_url: Some("http://localhost:8080/v1".to_string()),
        };

        let config = AppConfig::resolve(&Cli::default(), file, env);

        assert_eq!(config.tutor.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tutor.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(FileConfig::from_json(r#"{ "data_rot": "typo" }"#).is_err());
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");

        let err = FileConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_missing_default_config_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("smbh-explorer").join("config.json");

        let file = FileConfig::load_from(&missing, false).unwrap();
        assert_eq!(file, FileConfig::default());

        let err = FileConfig::load_from(&missing, true).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_default_config_file_is_read_when_present() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "python": "/opt/yt/bin/python" }"#).unwrap();

        let file = FileConfig::load_from(&path, false).unwrap();
        assert_eq!(file.python.as_deref(), Some("/opt/yt/bin/python"));
    }

    #[test]
    fn test_zero_timeout_in_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "plot_timeout_secs": 0 }"#).unwrap();

        let err = FileConfig::load_from(&path, true).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroTimeout { key: "plot_timeout_secs", .. }
        ));
    }

    #[test]
    fn test_zero_timeout_flag_is_rejected() {
        for flag in ["--tutor-timeout-secs", "--plot-timeout-secs"] {
            let result = Cli::try_parse_from(["smbh-explorer", flag, "0"]);
            assert!(result.is_err(), "{} 0 was accepted", flag);
        }
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "media_root": "media", "plot_timeout_secs": 10 }"#).unwrap();

        let file = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(file.media_root, Some(PathBuf::from("media")));
        assert_eq!(file.plot_timeout_secs, Some(10));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "smbh-explorer",
            "--data-root",
            "/data",
            "--tutor-timeout-secs",
            "5",
            "--ffmpeg",
            "/usr/local/bin/ffmpeg",
        ]);

        assert_eq!(cli.data_root, Some(PathBuf::from("/data")));
        assert_eq!(cli.tutor_timeout_secs, Some(5));
        assert_eq!(cli.ffmpeg.as_deref(), Some("/usr/local/bin/ffmpeg"));
    }
}
