//! Recolor command - change the background of every page of a PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use eyesaver_core::models::config::EyesaverConfig;
use eyesaver_core::Compositor;

use super::{file_name, load_config, read_input, ColorArgs};
use crate::backup::{BackupOutcome, HttpBackup};

/// Arguments for the recolor command.
#[derive(Args)]
pub struct RecolorArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: colored_<input name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    color: ColorArgs,

    /// Compress content streams in the output
    #[arg(long)]
    compress: bool,

    /// Upload the original file to the configured backup endpoint
    #[arg(long)]
    backup: bool,
}

pub async fn run(args: RecolorArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let data = read_input(&args.input)?;
    let original_name = file_name(&args.input);
    info!("Processing file: {}", args.input.display());

    if args.backup || config.backup.enabled {
        backup_original(&config, &data, &original_name).await;
    }

    let (color, mode) = args.color.resolve(&config);
    let compositor = Compositor::new(color, mode).with_compression(args.compress || config.render.compress);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Processing...");

    let result = compositor.recolor(&data);
    pb.finish_and_clear();
    let output = result.map_err(|e| anyhow::anyhow!("An error occurred: {}", e))?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, &config, &original_name));
    fs::write(&output_path, &output)?;

    println!("{} Processing Complete!", style("✓").green());
    println!(
        "{} Modified PDF written to {}",
        style("✓").green(),
        output_path.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn default_output_path(input: &Path, config: &EyesaverConfig, original_name: &str) -> PathBuf {
    input.with_file_name(config.output.output_name(original_name))
}

/// Upload the original bytes. Failures are reported as warnings only.
async fn backup_original(config: &EyesaverConfig, data: &[u8], name: &str) {
    let outcome = match HttpBackup::from_config(&config.backup) {
        Ok(Some(backup)) => backup.upload(data.to_vec(), name).await,
        Ok(None) => BackupOutcome::Skipped,
        Err(e) => BackupOutcome::Failed(e.to_string()),
    };

    match outcome {
        BackupOutcome::Stored { url: Some(url) } => {
            println!("{} Backup stored at {}", style("ℹ").blue(), url);
        }
        BackupOutcome::Stored { url: None } => {
            println!("{} Backup stored", style("ℹ").blue());
        }
        BackupOutcome::Skipped => {
            eprintln!(
                "{} Backup skipped: no backup endpoint configured",
                style("⚠").yellow()
            );
        }
        BackupOutcome::Failed(reason) => {
            eprintln!("{} Backup failed: {}", style("⚠").yellow(), reason);
        }
    }
}
