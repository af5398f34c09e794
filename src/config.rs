//! Project configuration (texport.yaml).
//!
//! Holds defaults for the export command. Every field can be overridden
//! from the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::export::ExportOptions;
use crate::host::DEFAULT_JPEG_QUALITY;

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "texport.yaml";

/// Export configuration loaded from texport.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory for exported textures.
    pub output: PathBuf,

    /// Copy stored files and trust declared alpha, as old scenes expect.
    #[serde(alias = "skip_texture_conversion")]
    pub compatibility_mode: bool,

    /// File name of the manifest written into the output directory.
    pub manifest: String,

    /// Quality used when re-encoding to JPEG (1-100).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            compatibility_mode: false,
            manifest: "textures.json".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportConfig {
    /// Load configuration from a texport.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Load `texport.yaml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content).map_err(|e| ExportError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })?;

        if !(1..=100).contains(&config.jpeg_quality) {
            return Err(ExportError::Parse {
                message: format!("jpeg_quality must be between 1 and 100, got {}", config.jpeg_quality),
                help: None,
            });
        }

        Ok(config)
    }

    /// Pipeline options derived from this configuration.
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            compatibility_mode: self.compatibility_mode,
        }
    }
}
