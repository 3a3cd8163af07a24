use super::commands;
use super::logging::setup_logging;
use clap::{Args, Parser, Subcommand};
use distoseq_models::StrategyKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// Records as JSON Lines or a JSON array of `{sequence, coords}`
    #[arg(short, long)]
    pub records: PathBuf,

    /// JSON configuration; every field is optional
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a strategy, keeping the checkpoint with the best test loss
    Train {
        #[command(flatten)]
        input: RecordsArgs,
        /// Directory receiving `models/<Strategy>/<YYYYMMDD>/`
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = StrategyKind::DistogramToSequence)]
        strategy: StrategyKind,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        learning_rate: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Run on the CPU even when a GPU is available
        #[arg(long)]
        cpu: bool,
    },
    /// Compute distograms and contact maps for every record with coordinates
    Distogram {
        #[command(flatten)]
        input: RecordsArgs,
        /// Output JSON file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the hard contact map
        #[arg(long)]
        contacts: bool,
        /// Include the soft contact map
        #[arg(long)]
        soft: bool,
    },
    /// Rebuild 3D points from each distogram and score them against the input coordinates
    Reconstruct {
        #[command(flatten)]
        input: RecordsArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// MDS restarts
        #[arg(long)]
        n_init: Option<usize>,
        #[arg(long)]
        max_iter: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        setup_logging(self.verbose, self.quiet, self.log_file.as_deref())?;
        match self.command {
            Commands::Train {
                input,
                output,
                strategy,
                epochs,
                batch_size,
                learning_rate,
                seed,
                cpu,
            } => commands::train::execute(commands::train::TrainArgs {
                input,
                output,
                strategy,
                epochs,
                batch_size,
                learning_rate,
                seed,
                cpu,
            }),
            Commands::Distogram {
                input,
                output,
                contacts,
                soft,
            } => commands::distogram::execute(input, output, contacts, soft),
            Commands::Reconstruct {
                input,
                output,
                n_init,
                max_iter,
                seed,
            } => commands::reconstruct::execute(input, output, n_init, max_iter, seed),
        }
    }
}
