use candle_core::{Device, Tensor};
use chrono::NaiveDate;
use distoseq_core::{read_records, Mode};
use distoseq_models::{
    load_checkpoint, prepare_records, read_metadata, train_test_split, Batch, DistoseqConfig,
    StrategyKind, Trainer, TrainingError,
};
use distoseq_test_data::TestFile;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

fn tiny_config() -> DistoseqConfig {
    let mut config = DistoseqConfig::default();
    config.core.sizes.max_size = 40;
    config.core.sizes.max_training_size = 32;
    config.model.hidden_size = 12;
    config.model.num_heads = 3;
    config.model.num_layers = 2;
    config.trainer.epochs = 3;
    config.trainer.batch_size = 3;
    config.trainer.log_every = 1;
    config.trainer.seed = Some(7);
    config
}

#[test]
fn test_fit_writes_best_checkpoint() -> anyhow::Result<()> {
    let (path, _handle) = TestFile::records_small().create_temp()?;
    let config = tiny_config();
    let records = prepare_records(read_records(&path)?, &config.core.sizes);
    assert_eq!(records.len(), 6);
    let (train, test) = train_test_split(&records, config.trainer.test_fraction);
    assert_eq!((train.len(), test.len()), (4, 2));

    let output = tempfile::tempdir()?;
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let mut trainer = Trainer::new(
        StrategyKind::DistogramToSequence,
        config.clone(),
        Device::Cpu,
        output.path(),
    )?
    .with_date(date);
    let report = trainer.fit(&train, &test)?;

    assert_eq!(report.epochs.len(), 3);
    // the first epoch always improves on "nothing seen yet"
    assert!(report.epochs[0].checkpoint.is_some());
    for summary in &report.epochs {
        assert!(summary.train_loss.is_finite());
        assert!(summary.test_loss.is_finite());
    }
    let best = report
        .epochs
        .iter()
        .map(|e| e.test_loss)
        .fold(f32::INFINITY, f32::min);
    assert_eq!(report.best_test_loss, Some(best));

    let dir = output.path().join("models/DistogramToSequence/20240501");
    assert_eq!(report.checkpoint_dir.as_deref(), Some(dir.as_path()));
    assert!(dir.join("best_model.safetensors").exists());
    let metadata = read_metadata(&dir)?;
    assert_eq!(metadata.test_loss, best);
    assert_eq!(metadata.date, "20240501");
    assert_eq!(metadata.config, config);

    // the restored model reproduces the saved test loss
    let restored = load_checkpoint(&dir, &Device::Cpu)?;
    let mut rng = StdRng::seed_from_u64(0);
    let examples = test
        .iter()
        .map(|r| restored.strategy.load_inputs_and_ground_truth(r, Mode::Eval, &mut rng))
        .collect::<distoseq_core::Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    let batch = Batch::collate(&examples, restored.strategy.vocab_size(), &Device::Cpu)?;
    let output = restored.strategy.forward(&batch.inputs)?;
    let loss = restored
        .strategy
        .compute_loss(&output, &batch.ground_truth)?
        .to_scalar::<f32>()?;
    assert!((loss - best).abs() < 1e-4, "{loss} vs {best}");

    let predicted = restored.strategy.predict(&batch.inputs)?;
    assert_eq!(predicted.len(), test.len());
    Ok(())
}

#[test]
fn test_fit_rejects_empty_sets() -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;
    let mut trainer = Trainer::new(
        StrategyKind::DistogramToSequence,
        tiny_config(),
        Device::Cpu,
        output.path(),
    )?;
    let err = trainer.fit(&[], &[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<distoseq_models::TrainingError>(),
        Some(TrainingError::EmptyDataset(_))
    ));
    Ok(())
}

/// Bit patterns of every variable, keyed by name, so NaN weights compare equal.
fn snapshot(trainer: &Trainer) -> anyhow::Result<BTreeMap<String, Vec<u32>>> {
    let data = trainer.varmap().data().lock().unwrap();
    let mut weights = BTreeMap::new();
    for (name, var) in data.iter() {
        let values = var.flatten_all()?.to_vec1::<f32>()?;
        weights.insert(name.clone(), values.iter().map(|v| v.to_bits()).collect());
    }
    Ok(weights)
}

fn trainer_with_nan_head(output: &std::path::Path) -> anyhow::Result<Trainer> {
    let trainer = Trainer::new(
        StrategyKind::DistogramToSequence,
        tiny_config(),
        Device::Cpu,
        output,
    )?;
    {
        let data = trainer.varmap().data().lock().unwrap();
        let head = data.get("linear.weight").expect("head weight");
        head.set(&Tensor::full(f32::NAN, head.shape(), &Device::Cpu)?)?;
    }
    Ok(trainer)
}

#[test]
fn test_non_finite_training_loss_aborts_before_step() -> anyhow::Result<()> {
    let (path, _handle) = TestFile::records_small().create_temp()?;
    let config = tiny_config();
    let records = prepare_records(read_records(&path)?, &config.core.sizes);
    let (train, _) = train_test_split(&records, config.trainer.test_fraction);

    let output = tempfile::tempdir()?;
    let mut trainer = trainer_with_nan_head(output.path())?;
    assert_eq!(trainer.strategy().name(), "DistogramToSequence");
    let before = snapshot(&trainer)?;

    let err = trainer.train_epoch(1, &train).unwrap_err();
    match err.downcast_ref::<TrainingError>() {
        Some(TrainingError::NumericInstability { epoch, batch, loss }) => {
            assert_eq!((*epoch, *batch), (1, 1));
            assert!(!loss.is_finite());
        }
        other => panic!("expected NumericInstability, got {other:?}"),
    }
    // the optimizer never ran
    assert_eq!(snapshot(&trainer)?, before);
    Ok(())
}

#[test]
fn test_non_finite_test_loss_is_reported() -> anyhow::Result<()> {
    let (path, _handle) = TestFile::records_small().create_temp()?;
    let config = tiny_config();
    let records = prepare_records(read_records(&path)?, &config.core.sizes);
    let (_, test) = train_test_split(&records, config.trainer.test_fraction);

    let output = tempfile::tempdir()?;
    let trainer = trainer_with_nan_head(output.path())?;
    let err = trainer.evaluate(4, &test).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrainingError>(),
        Some(TrainingError::NumericInstability {
            epoch: 4,
            batch: 1,
            ..
        })
    ));
    assert!(!trainer.checkpoint_dir().exists());
    Ok(())
}
