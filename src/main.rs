use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use shiraga::assets;
use shiraga::batch::analyze_files;
use shiraga::pipeline::prepare_debug_dir;
use shiraga::{PipelineConfig, ThresholdMode};

#[derive(Parser)]
#[command(name = "shiraga")]
#[command(about = "Estimate the share of gray/white hair in a photo")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse one or more images and print JSON reports
    Analyze(AnalyzeArgs),
    /// Write the app icon as PNG
    Icon {
        /// Edge length in pixels
        #[arg(long, default_value_t = assets::DEFAULT_ICON_SIZE)]
        size: u32,

        #[arg(long, value_name = "FILE", default_value = "icon-512.png")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Fixed,
    Adaptive,
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Image files to analyse
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// JSON configuration file; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Fixed-mode cutoff (0-255)
    #[arg(long)]
    cutoff: Option<i32>,

    /// Adaptive-mode window size (odd, > 1)
    #[arg(long)]
    block_size: Option<u32>,

    /// Adaptive-mode offset subtracted from the local average
    #[arg(long, allow_hyphen_values = true)]
    constant: Option<f32>,

    /// Opening kernel size, 0 disables
    #[arg(long, allow_hyphen_values = true)]
    kernel: Option<i32>,

    #[arg(long)]
    sensitivity: Option<f64>,

    /// Decimal places in the reported ratio
    #[arg(long)]
    precision: Option<u32>,

    /// Skip bilateral smoothing
    #[arg(long)]
    no_denoise: bool,

    /// Save every stage as PNG under this directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn build_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.threshold.mode = match mode {
                ModeArg::Fixed => ThresholdMode::Fixed,
                ModeArg::Adaptive => ThresholdMode::Adaptive,
            };
        }
        if let Some(cutoff) = self.cutoff {
            config.threshold.fixed_cutoff = cutoff;
        }
        if let Some(block_size) = self.block_size {
            config.threshold.block_size = block_size;
        }
        if let Some(constant) = self.constant {
            config.threshold.constant = constant;
        }
        if let Some(kernel) = self.kernel {
            config.kernel_size = kernel;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if self.no_denoise {
            config.denoise.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "shiraga=debug" } else { "shiraga=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Analyze(analyze) => {
            let config = analyze.build_config()?;

            if let Some(dir) = &analyze.debug_out {
                prepare_debug_dir(dir)?;
            }

            let reports = analyze_files(analyze.images.clone(), config, analyze.debug_out.clone()).await;
            let failed = reports.iter().filter(|r| !r.report.is_success()).count();

            let json = if reports.len() == 1 {
                serde_json::to_string_pretty(&reports[0].report)?
            } else {
                serde_json::to_string_pretty(&reports)?
            };
            println!("{}", json);

            if failed > 0 {
                anyhow::bail!("{} of {} images could not be analysed", failed, reports.len());
            }
        }
        Command::Icon { size, out } => {
            if size == 0 {
                anyhow::bail!("Icon size must be positive");
            }
            let icon = if size == assets::DEFAULT_ICON_SIZE {
                assets::cached_icon()
            } else {
                std::sync::Arc::new(assets::render_icon(size))
            };
            let bytes = assets::encode_png(&icon)
                .map_err(|e| anyhow::anyhow!("Failed to encode icon: {}", e))?;
            std::fs::write(&out, bytes)?;
            tracing::info!(path = %out.display(), size, "wrote icon");
        }
    }

    Ok(())
}
