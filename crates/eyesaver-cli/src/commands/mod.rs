//! Subcommands and the options they share.

pub mod config;
pub mod preview;
pub mod recolor;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use eyesaver_core::models::config::EyesaverConfig;
use eyesaver_core::{Color, RenderMode};

/// Color and mode options shared by `recolor` and `preview`.
#[derive(Args, Debug, Clone)]
pub struct ColorArgs {
    /// Background color as #RRGGBB (default from config, #FFFFCC)
    #[arg(short = 'C', long, value_parser = parse_color_arg)]
    pub color: Option<Color>,

    /// Overlay a translucent tint on top of the page (for scanned PDFs)
    #[arg(long)]
    pub overlay: bool,

    /// Paint an opaque background below the page, even if the config
    /// enables overlay mode
    #[arg(long, conflicts_with = "overlay")]
    pub standard: bool,

    /// Overlay intensity, between 0 and 1 (exclusive)
    #[arg(long, value_parser = parse_intensity)]
    pub intensity: Option<f32>,
}

impl ColorArgs {
    /// Resolve the color and mode, falling back to the configuration.
    pub fn resolve(&self, config: &EyesaverConfig) -> (Color, RenderMode) {
        let color = self.color.unwrap_or(config.render.color);
        let overlay = !self.standard && (self.overlay || config.render.overlay);
        let intensity = self.intensity.unwrap_or(config.render.intensity);
        (color, RenderMode::from_flags(overlay, intensity))
    }
}

fn parse_color_arg(value: &str) -> Result<Color, String> {
    Color::from_hex(value).map_err(|e| e.to_string())
}

fn parse_intensity(value: &str) -> Result<f32, String> {
    let intensity: f32 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if intensity > 0.0 && intensity < 1.0 {
        Ok(intensity)
    } else {
        Err(format!("intensity must be between 0 and 1 (exclusive), got {}", intensity))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eyesaver")
        .join("config.json")
}

/// Load the configuration: an explicit path, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<EyesaverConfig> {
    let config = match config_path {
        Some(path) => EyesaverConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                EyesaverConfig::from_file(&default_path)?
            } else {
                EyesaverConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Read a PDF input file, checking that it exists first.
pub fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(std::fs::read(input)?)
}

/// File name component of a path, for naming outputs and backups.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string()
}
