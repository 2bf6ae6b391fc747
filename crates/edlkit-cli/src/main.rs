//! edlkit - CMX3600 EDL offset and metadata tool
//!
//! Entry point: logging setup, option loading and subcommand dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use edlkit_core::FrameRate;
use edlkit_edl::{DocumentOptions, EdlDocument, Offset, TimecodeKind};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "edlkit", version)]
#[command(about = "Offset CMX3600 EDL timecodes and export marker metadata")]
struct Cli {
    /// JSON file with document options; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Frame rate, e.g. 24, 25, 29.97, 23.976 or 30000/1001
    #[arg(long, global = true)]
    fps: Option<FrameRate>,

    /// Write drop-frame timecode
    #[arg(long, global = true)]
    drop_frame: bool,

    /// Extract |-delimited markers from event notes
    #[arg(long, global = true)]
    markers: bool,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shift event timecodes and write the result
    #[command(group(ArgGroup::new("direction").required(true).args(["forward", "backward"])))]
    Offset {
        input: PathBuf,
        output: PathBuf,
        /// Amount to add (timecode, or frames with --frames)
        #[arg(long)]
        forward: Option<String>,
        /// Amount to subtract, floored at zero
        #[arg(long)]
        backward: Option<String>,
        /// Treat the amount as a frame count
        #[arg(long)]
        frames: bool,
        /// Shift source timecodes as well as record timecodes
        #[arg(long)]
        source: bool,
    },
    /// Print one segment metadata line per EDL
    Metadata {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Print the in/out timecodes of every event
    Timecodes {
        input: PathBuf,
        /// Source timecodes instead of record timecodes
        #[arg(long)]
        source: bool,
        #[arg(long, default_value = ",")]
        delim: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let options = load_options(&cli)?;
    match cli.command {
        Command::Offset {
            input,
            output,
            forward,
            backward,
            frames,
            source,
        } => {
            let mut doc = open(&input, options)?;
            if let Some(amount) = forward {
                doc.offset_forward(&parse_amount(&amount, frames)?, source)
                    .context("Forward offset failed")?;
            }
            if let Some(amount) = backward {
                doc.offset_backward(&parse_amount(&amount, frames)?, source)
                    .context("Backward offset failed")?;
            }
            doc.write(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Command::Metadata { inputs, json } => {
            // Segments come from markers, so extraction is always on here.
            let options = options.with_markers(true);
            for input in inputs {
                let metadata = open(&input, options)?
                    .metadata()
                    .with_context(|| format!("Failed to derive metadata for {}", input.display()))?;
                if json {
                    println!("{}", metadata.to_json()?);
                } else {
                    println!("{}", metadata);
                }
            }
        }
        Command::Timecodes {
            input,
            source,
            delim,
        } => {
            let kind = if source {
                TimecodeKind::Source
            } else {
                TimecodeKind::Record
            };
            let doc = open(&input, options)?;
            println!("{}", doc.timecodes_joined(&delim, kind));
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_options(cli: &Cli) -> Result<DocumentOptions> {
    let mut options = match &cli.config {
        Some(path) => DocumentOptions::load_from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => DocumentOptions::default(),
    };
    if let Some(rate) = cli.fps {
        options.frame_rate = Some(rate);
    }
    options.drop_frame |= cli.drop_frame;
    options.resolve_markers |= cli.markers;
    info!(?options, "Document options");
    Ok(options)
}

fn open(path: &Path, options: DocumentOptions) -> Result<EdlDocument> {
    EdlDocument::open(path, options).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_amount(amount: &str, frames: bool) -> Result<Offset> {
    if frames {
        let count = amount
            .parse()
            .with_context(|| format!("'{}' is not a frame count", amount))?;
        Ok(Offset::frames(count))
    } else {
        Ok(Offset::timecode(amount))
    }
}
