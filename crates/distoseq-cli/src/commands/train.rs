use super::{load_config, load_records};
use crate::cli::RecordsArgs;
use anyhow::Result;
use distoseq_models::{device, prepare_records, train_test_split, StrategyKind, Trainer};
use std::path::PathBuf;
use tracing::info;

pub struct TrainArgs {
    pub input: RecordsArgs,
    pub output: PathBuf,
    pub strategy: StrategyKind,
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub learning_rate: Option<f64>,
    pub seed: Option<u64>,
    pub cpu: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = load_config(args.input.config.as_deref())?;
    if let Some(epochs) = args.epochs {
        config.trainer.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.trainer.batch_size = batch_size;
    }
    if let Some(lr) = args.learning_rate {
        config.trainer.learning_rate = lr;
    }
    if args.seed.is_some() {
        config.trainer.seed = args.seed;
    }
    config.validate()?;

    let records = prepare_records(load_records(&args.input.records)?, &config.core.sizes);
    let (train, test) = train_test_split(&records, config.trainer.test_fraction);

    let device = device(args.cpu)?;
    let mut trainer = Trainer::new(args.strategy, config, device, &args.output)?;
    let report = trainer.fit(&train, &test)?;

    match (&report.checkpoint_dir, report.best_test_loss) {
        (Some(dir), Some(loss)) => {
            info!(path = %dir.display(), best_test_loss = loss, "training complete");
            println!("{}", dir.display());
        }
        _ => info!("training complete, no checkpoint written"),
    }
    Ok(())
}
