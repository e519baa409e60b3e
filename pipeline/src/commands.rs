//! The `train` and `predict` commands.

use crate::data::{write_predictions, PriceDataset};
use crate::error::Result;
use crate::metrics::{Metrics, RegressionMetrics};
use clap::Parser;
use parcel_price::config::ModelConfig;
use parcel_price::model::{BenchmarkModel, FitReport, FittedBenchmarkModel, FittedLinearRegression};
use std::path::{Path, PathBuf};

/// The model the commands train and serve.
pub type PriceModel = FittedBenchmarkModel<FittedLinearRegression>;

/// Train the price model on offer rows and calibrate it on manual rows.
#[derive(Debug, Clone, Parser)]
#[command(name = "train", version)]
pub struct TrainOptions {
    /// Training CSV with features, target and price regime.
    #[arg(short = 'd', long)]
    pub train_data: PathBuf,
    /// Where to write the fitted model.
    #[arg(short, long)]
    pub model_path: PathBuf,
    /// JSON model configuration; defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Predict prices for a CSV file with a previously trained model.
#[derive(Debug, Clone, Parser)]
#[command(name = "predict", version)]
pub struct PredictOptions {
    /// CSV with the feature columns and an optional id column.
    #[arg(short = 'd', long)]
    pub test_data: PathBuf,
    /// Fitted model file.
    #[arg(short, long)]
    pub model_path: PathBuf,
    /// Output CSV (`id,per_square_meter_price`).
    #[arg(short, long)]
    pub output: PathBuf,
    /// JSON model configuration the model must have been trained with.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// What a training run produced.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub report: FitReport,
    /// Uncorrected predictions against offer prices.
    pub offer_metrics: RegressionMetrics,
    /// Corrected predictions against manual prices; `None` without manual rows.
    pub manual_metrics: Option<RegressionMetrics>,
}

fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "load config");
            Ok(ModelConfig::from_json_file(path)?)
        }
        None => Ok(ModelConfig::default()),
    }
}

/// Run the training command.
pub fn train(options: &TrainOptions) -> Result<TrainSummary> {
    tracing::info!("START train");
    let config = load_config(options.config.as_deref())?;

    tracing::info!(path = %options.train_data.display(), "load train data");
    let dataset = PriceDataset::load_train(&options.train_data, &config.features)?;
    let frame = dataset.frame();
    tracing::info!(rows = frame.n_rows(), columns = frame.n_columns(), "input shape");

    let split = frame.split_by_regime()?;
    tracing::info!(
        offer_rows = split.offer.n_rows(),
        manual_rows = split.manual.n_rows(),
        "price regime subsets"
    );

    tracing::info!("fit model");
    let (model, report) = BenchmarkModel::from_config(&config).fit(&split.offer, &split.manual)?;
    tracing::info!(path = %options.model_path.display(), "save model");
    model.save(&options.model_path)?;

    let target = config.features.target.as_str();
    let offer_pred = model.calibration().remove(&model.predict(&split.offer)?);
    let offer_metrics = Metrics::calculate_all(
        split.offer.numeric(target)?,
        &offer_pred.to_vec(),
    );
    tracing::info!("metrics for training rows with offer prices: {offer_metrics}");

    let manual_metrics = if split.manual.is_empty() {
        None
    } else {
        let manual_pred = model.predict(&split.manual)?;
        let metrics = Metrics::calculate_all(split.manual.numeric(target)?, &manual_pred.to_vec());
        tracing::info!("metrics for training rows with manual prices: {metrics}");
        Some(metrics)
    };

    tracing::info!(coefficient = model.correction(), "END train");
    Ok(TrainSummary {
        report,
        offer_metrics,
        manual_metrics,
    })
}

/// Run the prediction command. Returns the number of rows written.
pub fn predict(options: &PredictOptions) -> Result<usize> {
    tracing::info!("START predict");

    tracing::info!(path = %options.model_path.display(), "load model");
    let model = match options.config.as_deref() {
        Some(path) => {
            let config = load_config(Some(path))?;
            PriceModel::load_expecting(&options.model_path, &config.features)?
        }
        None => PriceModel::load(&options.model_path)?,
    };

    tracing::info!(path = %options.test_data.display(), "load test data");
    let dataset = PriceDataset::load_test(&options.test_data, model.feature_config())?;
    tracing::info!(
        rows = dataset.len(),
        columns = dataset.frame().n_columns(),
        "input shape"
    );

    tracing::info!("predict");
    let predictions = model.predict(dataset.frame())?;

    tracing::info!(path = %options.output.display(), "save results");
    write_predictions(&options.output, dataset.ids(), &predictions.to_vec())?;

    tracing::info!("END predict");
    Ok(dataset.len())
}
