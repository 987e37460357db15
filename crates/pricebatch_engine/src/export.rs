use std::path::{Path, PathBuf};

use pricebatch_core::{detect_platform, JobRegistry, JobStatus, Progress};
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

pub const DEFAULT_EXPORT_FILENAME: &str = "batch_predictions.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no results to export")]
    Empty,
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub generated_utc: String,
    pub summary: Progress,
    pub results: Vec<ExportRow>,
}

/// One row per settled job; failed jobs carry only `url`, `platform` and `error`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExportRow {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_rating: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportDocument {
    /// Builds the document from a registry; jobs that never settled are skipped.
    pub fn from_registry(registry: &JobRegistry, generated_utc: impl Into<String>) -> Self {
        let prices: Vec<f64> = registry
            .jobs()
            .iter()
            .filter_map(|job| match job.status() {
                JobStatus::Succeeded(outcome) => Some(outcome.predicted_price),
                _ => None,
            })
            .collect();
        let average_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        let results = registry
            .jobs()
            .iter()
            .filter_map(|job| {
                let mut row = ExportRow {
                    url: job.url().to_owned(),
                    platform: detect_platform(job.url()).map(|p| p.name()),
                    ..ExportRow::default()
                };
                match job.status() {
                    JobStatus::Succeeded(outcome) => {
                        let car = &outcome.extracted_data;
                        row.make = Some(car.make.clone());
                        row.model = Some(car.model.clone());
                        row.year = Some(car.year);
                        row.mileage = Some(car.mileage);
                        row.condition = Some(car.condition.clone());
                        row.fuel_type = Some(car.fuel_type.clone());
                        row.location = Some(car.location.clone());
                        row.predicted_price = Some(outcome.predicted_price);
                        row.price_range_min = outcome.confidence_interval.map(|ci| ci.lower);
                        row.price_range_max = outcome.confidence_interval.map(|ci| ci.upper);
                        row.confidence_percent = outcome.confidence_interval.and_then(|ci| {
                            (outcome.predicted_price > 0.0).then(|| {
                                ((1.0 - (ci.upper - ci.lower) / outcome.predicted_price) * 100.0)
                                    .round() as i64
                            })
                        });
                        row.deal_rating = Some(deal_rating(outcome.predicted_price, average_price));
                    }
                    JobStatus::Failed(message) => row.error = Some(message.clone()),
                    JobStatus::Pending | JobStatus::Processing => return None,
                }
                Some(row)
            })
            .collect();

        Self {
            generated_utc: generated_utc.into(),
            summary: registry.progress(),
            results,
        }
    }
}

/// Rates a prediction against the batch average: 15% below is `Good`, 15% above is `Poor`.
fn deal_rating(predicted_price: f64, average_price: f64) -> &'static str {
    if predicted_price <= 0.0 || average_price <= 0.0 {
        return "Fair";
    }
    let ratio = predicted_price / average_price;
    if ratio < 0.85 {
        "Good"
    } else if ratio > 1.15 {
        "Poor"
    } else {
        "Fair"
    }
}

/// Writes `document` as pretty JSON to `{dir}/{filename}` and returns the path.
pub fn export_results(
    dir: &Path,
    document: &ExportDocument,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    if document.results.is_empty() {
        return Err(ExportError::Empty);
    }
    let content = serde_json::to_vec_pretty(document)?;
    let writer = AtomicFileWriter::new(dir);
    Ok(writer.write(filename, &content)?)
}
