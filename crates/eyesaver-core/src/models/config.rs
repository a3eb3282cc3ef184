//! Configuration structures for recoloring, previews and backups.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::mode::{RenderMode, DEFAULT_INTENSITY};

/// Main configuration for eyesaver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyesaverConfig {
    /// Recoloring defaults.
    pub render: RenderConfig,

    /// Preview configuration.
    pub preview: PreviewConfig,

    /// Output file naming.
    pub output: OutputConfig,

    /// Optional backup of the original upload.
    pub backup: BackupConfig,
}

/// Default color and mode applied when the caller does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Background color.
    pub color: Color,

    /// Use overlay mode instead of standard mode.
    pub overlay: bool,

    /// Overlay alpha, exclusive range (0.0 - 1.0).
    pub intensity: f32,

    /// Compress content streams of the output.
    pub compress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: Color::CREAM,
            overlay: false,
            intensity: DEFAULT_INTENSITY,
            compress: false,
        }
    }
}

impl RenderConfig {
    pub fn mode(&self) -> RenderMode {
        RenderMode::from_flags(self.overlay, self.intensity)
    }
}

/// Highest preview resolution accepted from configuration and callers.
pub const MAX_PREVIEW_DPI: u32 = 1200;

/// Page-one preview configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Rasterization resolution.
    pub dpi: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { dpi: 100 }
    }
}

/// Output naming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix added to the input file name.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "colored_".to_string(),
        }
    }
}

impl OutputConfig {
    /// Output file name for an uploaded file name.
    pub fn output_name(&self, original_name: &str) -> String {
        format!("{}{}", self.prefix, original_name)
    }
}

/// Remote backup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Upload the original file before processing.
    pub enabled: bool,

    /// Base URL objects are PUT under.
    pub endpoint: Option<String>,

    /// Environment variable holding a bearer token.
    pub token_env: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            token_env: "EYESAVER_BACKUP_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EyesaverConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values the calling surface is expected to constrain.
    pub fn validate(&self) -> crate::Result<()> {
        let intensity = self.render.intensity;
        if !(intensity > 0.0 && intensity < 1.0) {
            return Err(crate::EyesaverError::Config(format!(
                "render.intensity must be between 0 and 1 (exclusive), got {}",
                intensity
            )));
        }
        if !(1..=MAX_PREVIEW_DPI).contains(&self.preview.dpi) {
            return Err(crate::EyesaverError::Config(format!(
                "preview.dpi must be between 1 and {}, got {}",
                MAX_PREVIEW_DPI, self.preview.dpi
            )));
        }
        Ok(())
    }
}
