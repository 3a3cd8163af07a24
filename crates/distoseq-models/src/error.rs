use distoseq_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Non-finite loss {loss} at epoch {epoch}, batch {batch}")]
    NumericInstability { epoch: usize, batch: usize, loss: f32 },

    #[error("No usable records in the {0} set")]
    EmptyDataset(&'static str),

    #[error("Unknown strategy `{0}`")]
    UnknownStrategy(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}
