//! Optional per-project `simplc.toml`.

use crate::error::DriverError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub jasmin_jar: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Looks next to the source file, then in the working directory. An
    /// absent file is not an error; a present-but-unparseable one is.
    pub fn load(source_path: &Path) -> Result<Config, DriverError> {
        let candidates = [
            source_path.parent().map(|d| d.join("simplc.toml")),
            Some(PathBuf::from("simplc.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                log::debug!("loading config from {}", candidate.display());
                let text = std::fs::read_to_string(&candidate).map_err(|e| DriverError::BadConfig {
                    path: candidate.display().to_string(),
                    reason: e.to_string(),
                })?;
                return toml::from_str(&text).map_err(|e| DriverError::BadConfig {
                    path: candidate.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("p.simpl")).unwrap();
        assert!(cfg.jasmin_jar.is_none());
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn config_next_to_source_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("simplc.toml"),
            "jasmin_jar = \"/opt/jasmin/jasmin.jar\"\noutput_dir = \"build\"\n",
        )
        .unwrap();
        let cfg = Config::load(&dir.path().join("p.simpl")).unwrap();
        assert_eq!(cfg.jasmin_jar, Some(PathBuf::from("/opt/jasmin/jasmin.jar")));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("simplc.toml"), "not valid toml = [").unwrap();
        let err = Config::load(&dir.path().join("p.simpl")).unwrap_err();
        assert!(matches!(err, DriverError::BadConfig { .. }));
    }
}
