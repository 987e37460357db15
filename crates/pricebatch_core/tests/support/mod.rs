#![allow(dead_code)]

use std::sync::Once;

use pricebatch_core::{CarFeatures, PredictionOutcome};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(batch_logging::initialize_for_tests);
}

pub fn outcome(price: f64) -> PredictionOutcome {
    PredictionOutcome {
        extracted_data: CarFeatures {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2019,
            mileage: 85_000.0,
            condition: "Good".to_string(),
            fuel_type: "Gasoline".to_string(),
            location: "Baghdad".to_string(),
            engine_size: 2.5,
            cylinders: 4,
            trim: None,
            color: None,
        },
        predicted_price: price,
        listing_price: None,
        confidence_interval: None,
        price_comparison: None,
        message: None,
    }
}
