//! cwpair: Watson/Crick peak pairing
//!
//! Usage: cwpair <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cwpair::commands::{BedRemapCommand, MemeSplitCommand, NbTestCommand, PairCommand};
use cwpair::config::{InputDataset, OutputSelection, PairConfig};
use cwpair::error::CwpairError;
use cwpair::policy::MatchMethod;
use cwpair::threshold::Threshold;

#[derive(Parser)]
#[command(name = "cwpair")]
#[command(version)]
#[command(about = "cwpair: pair Watson and Crick strand peaks and report their distances", long_about = None)]
struct Cli {
    /// Log per-chromosome progress
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair Watson and Crick peaks of one or more GFF files
    Pair {
        /// Input GFF file and its dataset identifier (repeatable)
        #[arg(
            long = "input",
            num_args = 2,
            value_names = ["PATH", "ID"],
            action = ArgAction::Append,
            required = true
        )]
        input: Vec<String>,

        /// Matching method
        #[arg(
            long,
            default_value = "mode",
            value_parser = ["mode", "closest", "largest", "all"]
        )]
        method: String,

        /// Distance upstream from a Watson peak to search for a Crick partner
        #[arg(long = "up_distance", default_value = "50")]
        up_distance: i64,

        /// Distance downstream from a Watson peak to search for a Crick partner
        #[arg(long = "down_distance", default_value = "100")]
        down_distance: i64,

        /// Width of the distance histogram bins
        #[arg(long, default_value = "1")]
        binsize: i64,

        /// Percentage of the 95th percentile peak value to filter below
        #[arg(long = "relative_threshold", default_value = "0")]
        relative_threshold: f64,

        /// Absolute peak value to filter below (takes precedence when > 0)
        #[arg(long = "absolute_threshold", default_value = "0")]
        absolute_threshold: f64,

        /// Which outputs to write
        #[arg(
            long = "output_files",
            default_value = "matched_pair",
            value_parser = [
                "matched_pair",
                "matched_pair_orphan",
                "matched_pair_orphan_detail",
                "all"
            ]
        )]
        output_files: String,

        /// Root directory for the output tree
        #[arg(long = "output_dir", default_value = ".")]
        output_dir: PathBuf,

        /// Statistics table path
        #[arg(long = "statistics_output")]
        statistics_output: PathBuf,
    },

    /// Negative-binomial test of two density tables with BH correction
    Nbtest {
        /// Control density table
        #[arg(long)]
        control: PathBuf,

        /// Treatment density table
        #[arg(long)]
        treatment: PathBuf,

        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Adjusted p-value cutoff for the significance count
        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },

    /// Lift region-relative BED records into genome coordinates
    BedRemap {
        /// Input BED file with `chrom:start-end` region labels
        #[arg(short, long)]
        input: PathBuf,

        /// Output BED file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split a motif-scan GFF into one file per MEME motif
    MemeSplit {
        /// Input GFF file
        input: PathBuf,

        /// Directory for the per-motif files
        output_dir: PathBuf,

        /// Number of motifs to write files for
        #[arg(long, default_value = "3")]
        motifs: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cwpair=debug,info")
    } else {
        EnvFilter::new("cwpair=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Pair {
            input,
            method,
            up_distance,
            down_distance,
            binsize,
            relative_threshold,
            absolute_threshold,
            output_files,
            output_dir,
            statistics_output,
        } => run_pair(
            input,
            &method,
            up_distance,
            down_distance,
            binsize,
            relative_threshold,
            absolute_threshold,
            &output_files,
            output_dir,
            statistics_output,
        ),

        Commands::Nbtest {
            control,
            treatment,
            output,
            alpha,
        } => run_nbtest(control, treatment, output, alpha),

        Commands::BedRemap { input, output } => run_bed_remap(input, output),

        Commands::MemeSplit {
            input,
            output_dir,
            motifs,
        } => run_meme_split(input, output_dir, motifs),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pair(
    input: Vec<String>,
    method: &str,
    up_distance: i64,
    down_distance: i64,
    binsize: i64,
    relative_threshold: f64,
    absolute_threshold: f64,
    output_files: &str,
    output_dir: PathBuf,
    statistics_output: PathBuf,
) -> Result<(), CwpairError> {
    let inputs: Vec<InputDataset> = input
        .chunks(2)
        .map(|pair| InputDataset::new(&pair[0], pair[1].as_str()))
        .collect();

    let config = PairConfig {
        method: method.parse::<MatchMethod>()?,
        threshold: Threshold::from_options(absolute_threshold, relative_threshold),
        up_distance,
        down_distance,
        binsize,
        outputs: output_files.parse::<OutputSelection>()?,
        output_dir,
        ..PairConfig::default()
    };

    let cmd = PairCommand::new(config)?;
    let summary = cmd.run(&inputs, Some(&statistics_output))?;
    info!(
        inputs = inputs.len(),
        runs = summary.statistics.len(),
        failed = summary.failures.len(),
        "pair finished"
    );

    if summary.has_failures() {
        return Err(CwpairError::FailedInputs(summary.failures.len()));
    }
    Ok(())
}

fn run_nbtest(
    control: PathBuf,
    treatment: PathBuf,
    output: PathBuf,
    alpha: f64,
) -> Result<(), CwpairError> {
    let cmd = NbTestCommand::new().with_alpha(alpha);
    let stats = cmd.run(control, treatment, output)?;
    println!("Number of significant peaks: {}", stats.significant);
    Ok(())
}

fn run_bed_remap(input: PathBuf, output: PathBuf) -> Result<(), CwpairError> {
    let cmd = BedRemapCommand::new()?;
    let stats = cmd.run(input, output)?;
    info!("bed-remap stats: {}", stats);
    Ok(())
}

fn run_meme_split(input: PathBuf, output_dir: PathBuf, motifs: usize) -> Result<(), CwpairError> {
    let cmd = MemeSplitCommand::new().with_motifs(motifs);
    let written = cmd.run(input, output_dir)?;
    info!(files = written.len(), "meme-split finished");
    Ok(())
}
