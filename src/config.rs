use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};
use crate::grid::WeekStart;

const CONFIG_PATH_ENV_VAR: &str = "CALGRID_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("calgrid").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".calgrid.toml"));
    }

    locations
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CalendarSpec {
    pub name: Option<String>,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default, rename = "calendar")]
    pub calendars: Vec<CalendarSpec>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("{}: {}", path.display(), e),
            )
        })?;

        // Calendar paths are relative to the config file
        if let Some(base) = path.parent() {
            for spec in config.calendars.iter_mut() {
                if spec.path.is_relative() {
                    spec.path = base.join(&spec.path);
                }
            }
        }

        Ok(config)
    }

    /// Loads `path` if given, otherwise the first config file found in the
    /// usual locations. Falls back to defaults when none exists.
    pub fn find_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Config::load(path);
        }

        match find_configfile_locations().into_iter().find(|p| p.is_file()) {
            Some(found) => {
                log::info!("Using config file '{}'", found.display());
                Config::load(&found)
            }
            None => {
                log::info!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::io::Write;

    #[test]
    fn parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
            week_start = "monday"

            [[calendar]]
            name = "Work"
            path = "work.toml"

            [[calendar]]
            path = "/abs/home.toml"
            "#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.week_start.weekday(), Weekday::Mon);
        assert_eq!(config.calendars.len(), 2);
        assert_eq!(config.calendars[0].name.as_deref(), Some("Work"));
        assert_eq!(config.calendars[0].path, dir.path().join("work.toml"));
        assert_eq!(config.calendars[1].path, PathBuf::from("/abs/home.toml"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.week_start.weekday(), Weekday::Sun);
    }

    #[test]
    fn bad_week_start_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "week_start = \"someday\"").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigParse));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::find_or_default(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IOError(_)));
    }
}
