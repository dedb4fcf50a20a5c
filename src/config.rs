//! Bridge configuration.
//!
//! Identity of the acting controller position. Loaded once at startup from
//! a TOML file and passed by value into the gateway; a missing file means
//! defaults, so a bare checkout runs without setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Position identifier the bridge acts as, compared against each
    /// plan's tracking controller for modify permission.
    pub controller_id: String,
    /// Facility level of the position (1 = FSS, 2-4 = delivery/ground/
    /// tower, 5 = approach/departure, 6 = centre). Gates release-type
    /// status transitions.
    pub facility: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            controller_id: String::new(),
            facility: 6,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(BridgeConfig::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: BridgeConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = BridgeConfig::load(Path::new("/nonexistent/cdslink.toml")).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.facility, 6);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "controller_id = \"VR\"\nfacility = 4").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.controller_id, "VR");
        assert_eq!(config.facility, 4);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "controller_id = \"ZZ\"").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.controller_id, "ZZ");
        assert_eq!(config.facility, 6);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "controller_id = [").unwrap();
        assert!(BridgeConfig::load(file.path()).is_err());
    }
}
