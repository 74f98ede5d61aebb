//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(get_default_data_dir())
}

/// Path of the SQLite database inside the data folder
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("edutrack.db")
}

/// Create the data folder if it does not exist yet
pub fn ensure_data_dir(data_dir: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    Ok(())
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/edutrack/config.toml first, then /etc/edutrack/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("edutrack").join("config.toml"));
        let system_config = PathBuf::from("/etc/edutrack/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let config_path = dirs::config_dir()
            .map(|d| d.join("edutrack").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if config_path.exists() {
            Ok(config_path)
        } else {
            Err(Error::Config(format!(
                "Config file not found: {:?}",
                config_path
            )))
        }
    }
}

/// Get OS-dependent default data folder path
fn get_default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/edutrack (or /var/lib/edutrack for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("edutrack"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/edutrack"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/edutrack
        dirs::data_dir()
            .map(|d| d.join("edutrack"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/edutrack"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\edutrack
        dirs::data_local_dir()
            .map(|d| d.join("edutrack"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\edutrack"))
    } else {
        PathBuf::from("./edutrack_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_wins_over_everything() {
        let dir = resolve_data_dir(Some("/tmp/edutrack-cli"), "EDUTRACK_TEST_UNSET").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/edutrack-cli"));
    }

    #[test]
    fn falls_back_to_default_without_cli_or_env() {
        let dir = resolve_data_dir(None, "EDUTRACK_TEST_UNSET_XYZ").unwrap();
        assert!(dir.to_string_lossy().contains("edutrack"));
    }

    #[test]
    fn database_path_is_inside_data_dir() {
        let db = database_path(std::path::Path::new("/tmp/edutrack-data"));
        assert_eq!(db, PathBuf::from("/tmp/edutrack-data/edutrack.db"));
    }
}
