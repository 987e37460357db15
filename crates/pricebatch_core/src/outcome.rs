use serde::{Deserialize, Serialize};

/// Listing attributes extracted by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFeatures {
    pub make: String,
    pub model: String,
    pub year: u32,
    pub mileage: f64,
    pub condition: String,
    pub fuel_type: String,
    pub location: String,
    pub engine_size: f64,
    pub cylinders: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CarFeatures {
    pub const DEFAULT_LOCATION: &'static str = "Unknown";
    pub const DEFAULT_ENGINE_SIZE: f64 = 2.0;
    pub const DEFAULT_CYLINDERS: u32 = 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// How the asking price of a listing compares with the model's prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub listing_price: f64,
    pub predicted_price: f64,
    pub difference: f64,
    pub difference_percent: f64,
    pub is_above_market: bool,
    pub is_below_market: bool,
}

impl PriceComparison {
    /// Returns `None` unless both prices are present and non-zero.
    pub fn between(listing_price: f64, predicted_price: f64) -> Option<Self> {
        if listing_price == 0.0 || predicted_price == 0.0 {
            return None;
        }
        let difference = listing_price - predicted_price;
        Some(Self {
            listing_price,
            predicted_price,
            difference,
            difference_percent: difference / predicted_price * 100.0,
            is_above_market: listing_price > predicted_price,
            is_below_market: listing_price < predicted_price,
        })
    }
}

/// Successful result of one extraction+prediction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub extracted_data: CarFeatures,
    pub predicted_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<ConfidenceInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_comparison: Option<PriceComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One entry delivered to the batch consumer once the batch drains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub url: String,
    pub result: PredictionOutcome,
}
