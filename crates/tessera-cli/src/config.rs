//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! and locating the directory that holds the saved editor state.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tessera::{TesseraError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TesseraError {
    fn from(err: ConfigError) -> Self {
        TesseraError::Config(err.to_string())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tessera", "tessera")
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (tessera/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TesseraError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("tessera/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = project_dirs() {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Returns the directory for the saved editor state.
///
/// An explicit directory wins, then the platform data directory, then
/// `.tessera` in the working directory.
pub fn state_dir(explicit_dir: Option<impl AsRef<Path>>) -> PathBuf {
    if let Some(dir) = explicit_dir {
        return dir.as_ref().to_path_buf();
    }
    project_dirs()
        .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tessera"))
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TesseraError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;
    use tessera::{ExportFormat, ThemePreference, config::Backend};

    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[renderer]
backend = "command"
command = "/opt/mmdc"

[renderer.flowchart]
curve = "linear"

[editor]
debounce_ms = 250
theme = "dark"

[export]
format = "svg"
background = "#202020"
"##,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.renderer().backend(), Backend::Command);
        assert_eq!(config.renderer().command(), "/opt/mmdc");
        assert_eq!(
            config
                .renderer()
                .renderer_options(ThemePreference::Light)
                .flowchart
                .curve,
            "linear"
        );
        assert_eq!(config.editor().debounce(), Duration::from_millis(250));
        assert_eq!(config.editor().theme(), ThemePreference::Dark);
        assert_eq!(config.export().format(), ExportFormat::Svg);
        assert!(config.export().background().unwrap().is_some());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[renderer\nbackend = ").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_explicit_state_dir_wins() {
        assert_eq!(state_dir(Some("/tmp/state")), PathBuf::from("/tmp/state"));
    }
}
