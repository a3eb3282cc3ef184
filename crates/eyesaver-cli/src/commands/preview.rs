//! Preview command - render page one with the background applied.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::{debug, info};

use eyesaver_core::{encode_png, preview, MAX_PREVIEW_DPI};

use super::{load_config, read_input, ColorArgs};

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output PNG file (default: <input stem>_preview.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    color: ColorArgs,

    /// Rendering resolution (default from config, 100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PREVIEW_DPI)))]
    dpi: Option<u32>,
}

pub async fn run(args: PreviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let data = read_input(&args.input)?;

    let (color, mode) = args.color.resolve(&config);
    let dpi = args.dpi.unwrap_or(config.preview.dpi);
    info!("Rendering preview of {} at {} dpi", args.input.display(), dpi);

    let image = preview(&data, color, mode, dpi)
        .map_err(|e| anyhow::anyhow!("Error generating preview: {}", e))?;
    let png = encode_png(&image)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_preview_path(&args.input));
    fs::write(&output_path, png)?;

    debug!("Preview is {}x{}", image.width(), image.height());
    println!(
        "{} Preview of page 1 written to {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn default_preview_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    input.with_file_name(format!("{}_preview.png", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preview_path() {
        assert_eq!(
            default_preview_path(Path::new("/tmp/notes.pdf")),
            PathBuf::from("/tmp/notes_preview.png")
        );
    }
}
