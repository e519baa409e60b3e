//! CSV loading and writing.
//!
//! Only the columns named by the [`FeatureConfig`] are read; everything else
//! in the file is ignored. Numeric cells parse as `f64`, with empty, `nan`
//! and `NA` cells read as missing (`NaN`). Empty categorical cells are read
//! as missing (`None`).

use crate::error::{PipelineError, Result};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use parcel_price::config::FeatureConfig;
use parcel_price::dataset::{Column, Frame, PriceRegime};
use parcel_price::SchemaMismatch;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Header of the prediction output column.
pub const PREDICTION_COLUMN: &str = "per_square_meter_price";

/// Rows loaded from a CSV file, with their identifiers.
///
/// If the file has no id column, rows are identified by their zero-based
/// position.
#[derive(Debug, Clone)]
pub struct PriceDataset {
    frame: Frame,
    ids: Vec<String>,
}

/// Which bookkeeping columns a file must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Purpose {
    Train,
    Predict,
}

impl PriceDataset {
    /// Load a training file: features, target and price regime.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use parcel_pipeline::data::PriceDataset;
    /// use parcel_price::config::FeatureConfig;
    ///
    /// let dataset = PriceDataset::load_train("data/train.csv", &FeatureConfig::default()).unwrap();
    /// println!("{} rows", dataset.len());
    /// ```
    pub fn load_train<P: AsRef<Path>>(path: P, features: &FeatureConfig) -> Result<Self> {
        Self::load(path.as_ref(), features, Purpose::Train)
    }

    /// Load a file to predict on: features only.
    pub fn load_test<P: AsRef<Path>>(path: P, features: &FeatureConfig) -> Result<Self> {
        Self::load(path.as_ref(), features, Purpose::Predict)
    }

    fn load(path: &Path, features: &FeatureConfig, purpose: Purpose) -> Result<Self> {
        let file = File::open(path)?;
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(BufReader::new(file));
        let headers = rdr.headers()?.clone();

        let mut numeric: Vec<CellColumn<f64>> = features
            .numeric
            .iter()
            .map(|name| CellColumn::locate(&headers, name))
            .collect::<Result<_>>()?;
        let mut categorical: Vec<CellColumn<Option<String>>> = features
            .one_hot
            .iter()
            .chain(&features.ordinal)
            .map(|name| CellColumn::locate(&headers, name))
            .collect::<Result<_>>()?;
        let (mut target, mut regime) = match purpose {
            Purpose::Train => (
                Some(CellColumn::<f64>::locate(&headers, &features.target)?),
                Some(CellColumn::<PriceRegime>::locate(&headers, &features.regime)?),
            ),
            Purpose::Predict => (None, None),
        };
        let id_index = position(&headers, &features.id);

        let mut ids = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let line = row + 2;
            for column in &mut numeric {
                column.push_numeric(&record, path, line)?;
            }
            for column in &mut categorical {
                let cell = record.get(column.index).unwrap_or("");
                column
                    .values
                    .push((!cell.is_empty()).then(|| cell.to_string()));
            }
            if let Some(column) = &mut target {
                column.push_numeric(&record, path, line)?;
            }
            if let Some(column) = &mut regime {
                let cell = record.get(column.index).unwrap_or("");
                let value = cell.parse::<PriceRegime>().map_err(|err| {
                    PipelineError::data(path, format!("line {line}: {err}"))
                })?;
                column.values.push(value);
            }
            ids.push(match id_index {
                Some(index) => record.get(index).unwrap_or("").to_string(),
                None => row.to_string(),
            });
        }

        let mut frame = Frame::new();
        for column in numeric.into_iter().chain(target) {
            frame.insert(column.name, Column::Numeric(column.values))?;
        }
        for column in categorical {
            frame.insert(column.name, Column::Categorical(column.values))?;
        }
        if let Some(column) = regime {
            frame.set_regime(column.values)?;
        }
        tracing::debug!(path = %path.display(), rows = ids.len(), columns = frame.n_columns(), "loaded csv");

        Ok(Self { frame, ids })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the file had no data rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The loaded columns.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Row identifiers, in file order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Split into the frame and the identifiers.
    pub fn into_parts(self) -> (Frame, Vec<String>) {
        (self.frame, self.ids)
    }
}

struct CellColumn<T> {
    name: String,
    index: usize,
    values: Vec<T>,
}

impl<T> CellColumn<T> {
    fn locate(headers: &StringRecord, name: &str) -> Result<Self> {
        let index = position(headers, name).ok_or_else(|| {
            parcel_price::Error::from(SchemaMismatch::MissingColumn(name.to_string()))
        })?;
        Ok(Self {
            name: name.to_string(),
            index,
            values: Vec::new(),
        })
    }
}

impl CellColumn<f64> {
    fn push_numeric(&mut self, record: &StringRecord, path: &Path, line: usize) -> Result<()> {
        let cell = record.get(self.index).unwrap_or("");
        let value = parse_number(cell).ok_or_else(|| {
            PipelineError::data(
                path,
                format!("line {line}, column `{}`: `{cell}` is not a number", self.name),
            )
        })?;
        self.values.push(value);
        Ok(())
    }
}

fn position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Parse a numeric cell; missing markers become `NaN`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na") {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

/// Write `id,per_square_meter_price` rows.
pub fn write_predictions<P: AsRef<Path>>(path: P, ids: &[String], predictions: &[f64]) -> Result<()> {
    if ids.len() != predictions.len() {
        return Err(PipelineError::data(
            path,
            format!("{} ids but {} predictions", ids.len(), predictions.len()),
        ));
    }
    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    wtr.write_record(["id", PREDICTION_COLUMN])?;
    for (id, prediction) in ids.iter().zip(predictions) {
        let value = prediction.to_string();
        wtr.write_record([id.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn features() -> FeatureConfig {
        FeatureConfig::new(
            vec!["total_square".into(), "lat".into()],
            vec![],
            vec!["realty_type".into()],
            vec!["city".into()],
        )
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const TRAIN: &str = "\
id,city,lat,total_square,realty_type,price_type,per_square_meter_price,unused
a1,Moscow,55.7,120,10,0,90000,x
a2,,NA,80,110,1,70000,y
a3,Kazan,nan,,10,offer,50000,z
";

    #[rstest]
    #[case("", true)]
    #[case("nan", true)]
    #[case("NaN", true)]
    #[case("NA", true)]
    #[case(" 12.5 ", false)]
    fn test_parse_number(#[case] cell: &str, #[case] missing: bool) {
        let value = parse_number(cell).unwrap();
        assert_eq!(value.is_nan(), missing);
    }

    #[test]
    fn test_parse_number_rejects_text() {
        assert!(parse_number("twelve").is_none());
    }

    #[test]
    fn test_load_train() {
        let file = csv_file(TRAIN);
        let dataset = PriceDataset::load_train(file.path(), &features()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.ids(), ["a1", "a2", "a3"]);

        let frame = dataset.frame();
        assert_eq!(frame.numeric("total_square").unwrap()[1], 80.0);
        assert!(frame.numeric("total_square").unwrap()[2].is_nan());
        assert!(frame.numeric("lat").unwrap()[1].is_nan());
        assert_eq!(frame.categorical("city").unwrap()[1], None);
        assert_eq!(
            frame.categorical("realty_type").unwrap()[1].as_deref(),
            Some("110")
        );
        assert_eq!(
            frame.regime().unwrap(),
            [PriceRegime::Offer, PriceRegime::Manual, PriceRegime::Offer]
        );
        assert!(frame.column("unused").is_none());
    }

    #[test]
    fn test_load_test_needs_no_target() {
        let file = csv_file("id,city,lat,total_square,realty_type\nb1,Omsk,55.0,40,10\n");
        let dataset = PriceDataset::load_test(file.path(), &features()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.frame().regime().is_none());
        assert!(dataset.frame().column("per_square_meter_price").is_none());
    }

    #[test]
    fn test_missing_target_column() {
        let file = csv_file("id,city,lat,total_square,realty_type,price_type\nb1,Omsk,55.0,40,10,0\n");
        let err = PriceDataset::load_train(file.path(), &features()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Model(parcel_price::Error::SchemaMismatch(SchemaMismatch::MissingColumn(ref c)))
                if c == "per_square_meter_price"
        ));
    }

    #[test]
    fn test_bad_regime_names_line() {
        let file = csv_file(&TRAIN.replace("offer", "auction"));
        let err = PriceDataset::load_train(file.path(), &features()).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_bad_number_names_column() {
        let file = csv_file("city,lat,total_square,realty_type\nOmsk,north,40,10\n");
        let err = PriceDataset::load_test(file.path(), &features()).unwrap_err();
        assert!(err.to_string().contains("column `lat`"));
    }

    #[test]
    fn test_rows_without_id_are_numbered() {
        let file = csv_file("city,lat,total_square,realty_type\nOmsk,1,40,10\nTula,2,50,10\n");
        let dataset = PriceDataset::load_test(file.path(), &features()).unwrap();
        assert_eq!(dataset.ids(), ["0", "1"]);
    }

    #[test]
    fn test_write_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_predictions(&path, &["a".to_string(), "b".to_string()], &[1.5, 80000.0]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "id,per_square_meter_price\na,1.5\nb,80000\n");
    }

    #[test]
    fn test_write_predictions_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(write_predictions(&path, &["a".to_string()], &[]).is_err());
    }
}
