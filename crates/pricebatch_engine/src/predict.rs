use std::time::Duration;

use pricebatch_core::{CarFeatures, ConfidenceInterval, PredictionOutcome, PriceComparison};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::{FailureKind, PredictError};

pub const PREDICT_FROM_URL_PATH: &str = "/api/predict/from-url";

const MSG_UNREACHABLE: &str = "Backend not running - Please start the backend server";
const MSG_NOT_FOUND: &str = "Listing no longer available - The URL may be expired or removed";
const MSG_TIMEOUT: &str = "Timeout while scraping - The listing page took too long to respond";
const MSG_RATE_LIMITED: &str = "Rate limit exceeded - Please try again in 1 minute";
const MSG_INVALID_RESPONSE: &str = "Invalid response format from server";

#[derive(Debug, Clone)]
pub struct PredictSettings {
    pub api_base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for PredictSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The single network boundary: extract a listing and predict its price.
#[async_trait::async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, url: &str) -> Result<PredictionOutcome, PredictError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestPredictor {
    pub fn new(settings: PredictSettings) -> Result<Self, PredictError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PredictError::new(FailureKind::Network, err.to_string()))?;
        let endpoint = format!(
            "{}{}",
            settings.api_base_url.trim_end_matches('/'),
            PREDICT_FROM_URL_PATH
        );
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Predictor for ReqwestPredictor {
    async fn predict(&self, url: &str) -> Result<PredictionOutcome, PredictError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PredictError::new(FailureKind::InvalidUrl, "URL is required"));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|_| PredictError::new(FailureKind::InvalidResponse, MSG_INVALID_RESPONSE))?;
        match envelope {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } => Ok(data.into_outcome()),
            Envelope {
                error: Some(error), ..
            } if !error.is_empty() => Err(PredictError::new(FailureKind::Backend, error)),
            _ => Err(PredictError::new(
                FailureKind::InvalidResponse,
                MSG_INVALID_RESPONSE,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    data: Option<ListingData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    make: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    year: u32,
    #[serde(default)]
    mileage: f64,
    #[serde(default)]
    condition: String,
    #[serde(default)]
    fuel_type: String,
    location: Option<String>,
    engine_size: Option<f64>,
    cylinders: Option<u32>,
    trim: Option<String>,
    color: Option<String>,
    predicted_price: f64,
    listing_price: Option<f64>,
    price_range: Option<PriceRange>,
    deal_explanation: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceRange {
    min: f64,
    max: f64,
}

impl ListingData {
    fn into_outcome(self) -> PredictionOutcome {
        // Empty or zero values fall back to the same defaults as absent ones.
        let extracted_data = CarFeatures {
            make: self.make,
            model: self.model,
            year: self.year,
            mileage: self.mileage,
            condition: self.condition,
            fuel_type: self.fuel_type,
            location: self
                .location
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| CarFeatures::DEFAULT_LOCATION.to_string()),
            engine_size: self
                .engine_size
                .filter(|size| *size != 0.0)
                .unwrap_or(CarFeatures::DEFAULT_ENGINE_SIZE),
            cylinders: self
                .cylinders
                .filter(|c| *c != 0)
                .unwrap_or(CarFeatures::DEFAULT_CYLINDERS),
            trim: self.trim,
            color: self.color,
        };
        let price_comparison = self
            .listing_price
            .and_then(|listing| PriceComparison::between(listing, self.predicted_price));

        PredictionOutcome {
            extracted_data,
            predicted_price: self.predicted_price,
            listing_price: self.listing_price,
            confidence_interval: self.price_range.map(|range| ConfidenceInterval {
                lower: range.min,
                upper: range.max,
            }),
            price_comparison,
            message: self.deal_explanation.or(self.message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

impl ErrorBody {
    /// FastAPI style: `detail` is a string or a list of `{loc, msg}` items.
    /// Empty text counts as absent.
    fn detail_text(&self) -> Option<String> {
        let text = match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| {
                        let field = item
                            .get("loc")
                            .and_then(|loc| loc.as_array())
                            .map(|parts| {
                                parts
                                    .iter()
                                    .map(|p| match p {
                                        serde_json::Value::String(s) => s.clone(),
                                        other => other.to_string(),
                                    })
                                    .collect::<Vec<_>>()
                                    .join(".")
                            })
                            .filter(|f| !f.is_empty())
                            .unwrap_or_else(|| "field".to_string());
                        let msg = item
                            .get("msg")
                            .and_then(|m| m.as_str())
                            .unwrap_or("Invalid value");
                        format!("{field}: {msg}")
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        };
        text.filter(|t| !t.is_empty())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PredictError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let fallback = || {
        parsed
            .detail_text()
            .or_else(|| parsed.message.clone().filter(|m| !m.is_empty()))
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
    };

    match status {
        StatusCode::NOT_FOUND => PredictError::new(FailureKind::NotFound, MSG_NOT_FOUND),
        StatusCode::REQUEST_TIMEOUT => PredictError::new(FailureKind::Timeout, MSG_TIMEOUT),
        StatusCode::TOO_MANY_REQUESTS => {
            PredictError::new(FailureKind::RateLimited, MSG_RATE_LIMITED)
        }
        StatusCode::BAD_REQUEST => {
            let detail = fallback();
            if detail.contains("Unsupported platform") || detail.contains("Invalid URL format") {
                PredictError::new(
                    FailureKind::BadRequest,
                    format!("Invalid URL format - {detail}"),
                )
            } else {
                PredictError::new(FailureKind::BadRequest, detail)
            }
        }
        other => PredictError::new(FailureKind::HttpStatus(other.as_u16()), fallback()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PredictError {
    if err.is_timeout() {
        return PredictError::new(FailureKind::Timeout, MSG_TIMEOUT);
    }
    if err.is_connect() {
        return PredictError::new(FailureKind::Unreachable, MSG_UNREACHABLE);
    }
    PredictError::new(FailureKind::Network, err.to_string())
}
