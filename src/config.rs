//! Harness configuration.
//!
//! Defaults can be overridden from a YAML file, and the CLI overrides both.
//!
//! ```yaml
//! root: tests/regression
//! analyzer: ./goblint
//! base_args: ["--enable", "dbg.debug"]
//! run_skipped: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::RegrunError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory scanned for fixtures.
    pub root: PathBuf,
    /// Analyzer executable launched once per fixture.
    pub analyzer: String,
    /// Arguments passed before the fixture's own directives.
    pub base_args: Vec<String>,
    /// Run fixtures marked `SKIP` even when not named explicitly.
    pub run_skipped: bool,
    #[serde(skip)]
    pub use_colors: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tests/regression"),
            analyzer: "goblint".to_string(),
            base_args: Vec::new(),
            run_skipped: false,
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

impl HarnessConfig {
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self, RegrunError> {
        serde_yaml::from_str(text).map_err(|e| RegrunError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, RegrunError> {
        let text = std::fs::read_to_string(path).map_err(|e| RegrunError::io(path, e))?;
        Self::from_yaml_str(&text, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = HarnessConfig::from_yaml_str("analyzer: ./analyzer\n", Path::new("c.yaml"))
            .unwrap();
        assert_eq!(config.analyzer, "./analyzer");
        assert_eq!(config.root, PathBuf::from("tests/regression"));
        assert!(!config.run_skipped);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = HarnessConfig::from_yaml_str("anlyzer: x\n", Path::new("c.yaml")).unwrap_err();
        assert!(matches!(err, RegrunError::Config { .. }));
    }
}
