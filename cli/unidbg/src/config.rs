//! `unidbg.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use unidbg_core::{parse_library_version, Version};
use unidbg_unitex::DecodeLimits;

/// File name searched for from the working directory upward.
pub const CONFIG_FILE: &str = "unidbg.toml";

/// The top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Printer settings.
    #[serde(default)]
    pub printers: PrintersConfig,
    /// Log filter used when `RUST_LOG` is not set, e.g. "debug".
    #[serde(default)]
    pub log_level: Option<String>,
}

/// The `[printers]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintersConfig {
    /// Selectors (`category` or `category;name`) disabled at startup.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Code units shown before a string is cut off.
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Library version to assume instead of the detected one.
    #[serde(default)]
    pub version_override: Option<String>,
}

impl Config {
    /// Search upward from `start_dir` for a `unidbg.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse a configuration from a TOML string.
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        if config.printers.max_chars == Some(0) {
            anyhow::bail!("printers.max_chars must be at least 1");
        }
        Ok(config)
    }

    /// Decode limits for string printers.
    pub fn limits(&self) -> DecodeLimits {
        match self.printers.max_chars {
            Some(max_code_units) => DecodeLimits { max_code_units },
            None => DecodeLimits::default(),
        }
    }

    /// The configured version override, parsed.
    pub fn version_override(&self) -> Result<Option<Version>> {
        self.printers
            .version_override
            .as_deref()
            .map(|v| parse_library_version(v).context("printers.version_override"))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config = Config::from_str(
            r#"
log_level = "debug"

[printers]
disabled = ["unitex;UnitexString"]
max_chars = 64
version_override = "3.4"
"#,
        )
        .unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.printers.disabled, ["unitex;UnitexString"]);
        assert_eq!(config.limits().max_code_units, 64);
        assert_eq!(config.version_override().unwrap(), Some(Version::new(3, 4, 0)));
    }

    #[test]
    fn parse_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.printers.disabled.is_empty());
        assert_eq!(config.limits(), DecodeLimits::default());
        assert_eq!(config.version_override().unwrap(), None);
    }

    #[test]
    fn rejects_zero_max_chars() {
        assert!(Config::from_str("[printers]\nmax_chars = 0").is_err());
    }

    #[test]
    fn rejects_bad_version_override() {
        let config = Config::from_str("[printers]\nversion_override = \"three\"").unwrap();
        assert!(config.version_override().is_err());
    }

    #[test]
    fn find_config_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[printers]\nmax_chars = 10\n").unwrap();

        let (config, found_in) = Config::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(found_in, dir.path());
        assert_eq!(config.limits().max_code_units, 10);
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[printers]\ndisabled = 3\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
