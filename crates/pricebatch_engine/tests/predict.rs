use std::time::Duration;

use pretty_assertions::assert_eq;
use pricebatch_core::{CarFeatures, ConfidenceInterval};
use pricebatch_engine::{
    FailureKind, PredictSettings, Predictor, ReqwestPredictor, PREDICT_FROM_URL_PATH,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn predictor_for(server: &MockServer) -> ReqwestPredictor {
    ReqwestPredictor::new(PredictSettings {
        api_base_url: server.uri(),
        ..PredictSettings::default()
    })
    .expect("client")
}

async fn respond_with(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_FROM_URL_PATH))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn maps_success_envelope_and_applies_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_FROM_URL_PATH))
        .and(body_json(json!({ "url": "https://www.iqcars.net/en/car/1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "make": "Toyota",
                "model": "Camry",
                "year": 2018,
                "mileage": 120000,
                "condition": "Good",
                "fuel_type": "Gasoline",
                "cylinders": 0,
                "predicted_price": 15000.0,
                "listing_price": 18000.0,
                "price_range": { "min": 14000.0, "max": 16000.0 },
                "deal_explanation": "Above market"
            }
        })))
        .mount(&server)
        .await;

    let outcome = predictor_for(&server)
        .predict("  https://www.iqcars.net/en/car/1 \n")
        .await
        .expect("prediction");

    assert_eq!(
        outcome.extracted_data,
        CarFeatures {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2018,
            mileage: 120000.0,
            condition: "Good".to_string(),
            fuel_type: "Gasoline".to_string(),
            location: "Unknown".to_string(),
            engine_size: 2.0,
            cylinders: 4,
            trim: None,
            color: None,
        }
    );
    assert_eq!(outcome.predicted_price, 15000.0);
    assert_eq!(
        outcome.confidence_interval,
        Some(ConfidenceInterval {
            lower: 14000.0,
            upper: 16000.0
        })
    );
    let comparison = outcome.price_comparison.expect("comparison");
    assert_eq!(comparison.difference, 3000.0);
    assert_eq!(comparison.difference_percent, 20.0);
    assert!(comparison.is_above_market);
    assert!(!comparison.is_below_market);
    assert_eq!(outcome.message.as_deref(), Some("Above market"));
}

#[tokio::test]
async fn backend_error_field_becomes_message() {
    let server = respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "error": "Could not extract price"
    })))
    .await;

    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Backend);
    assert_eq!(err.message, "Could not extract price");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
    assert_eq!(err.message, "Invalid response format from server");

    let server = respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true }))).await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn not_found_and_rate_limit_have_friendly_messages() {
    let server = respond_with(ResponseTemplate::new(404)).await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert_eq!(
        err.message,
        "Listing no longer available - The URL may be expired or removed"
    );

    let server = respond_with(ResponseTemplate::new(429)).await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::RateLimited);
    assert_eq!(err.message, "Rate limit exceeded - Please try again in 1 minute");
}

#[tokio::test]
async fn bad_request_uses_detail() {
    let server = respond_with(
        ResponseTemplate::new(400).set_body_json(json!({ "detail": "Unsupported platform: example.com" })),
    )
    .await;
    let err = predictor_for(&server)
        .predict("https://example.com/car")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::BadRequest);
    assert_eq!(
        err.message,
        "Invalid URL format - Unsupported platform: example.com"
    );

    let server =
        respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Listing sold" })))
            .await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Listing sold");
}

#[tokio::test]
async fn validation_details_are_flattened() {
    let server = respond_with(ResponseTemplate::new(422).set_body_json(json!({
        "detail": [
            { "loc": ["body", "url"], "msg": "field required" },
            { "msg": "bad" }
        ]
    })))
    .await;

    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(422));
    assert_eq!(err.message, "body.url: field required, field: bad");
}

#[tokio::test]
async fn server_error_without_body_reports_status() {
    let server = respond_with(ResponseTemplate::new(503)).await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message, "Request failed with status code 503");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = respond_with(
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_json(json!({ "success": false })),
    )
    .await;
    let predictor = ReqwestPredictor::new(PredictSettings {
        api_base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..PredictSettings::default()
    })
    .unwrap();

    let err = predictor.predict("https://a.test/1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert_eq!(
        err.message,
        "Timeout while scraping - The listing page took too long to respond"
    );
}

#[tokio::test]
async fn empty_url_is_rejected_locally() {
    let predictor = ReqwestPredictor::new(PredictSettings::default()).unwrap();
    let err = predictor.predict("   ").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
    assert_eq!(err.message, "URL is required");
}

#[test]
fn endpoint_joins_base_url() {
    let predictor = ReqwestPredictor::new(PredictSettings {
        api_base_url: "http://backend:8000/".to_string(),
        ..PredictSettings::default()
    })
    .unwrap();
    assert_eq!(predictor.endpoint(), "http://backend:8000/api/predict/from-url");
}

#[tokio::test]
async fn empty_backend_error_is_invalid_response() {
    let server = respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "error": ""
    })))
    .await;

    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
    assert_eq!(err.message, "Invalid response format from server");
}

#[tokio::test]
async fn empty_detail_falls_back_to_status_text() {
    let server =
        respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "" }))).await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::BadRequest);
    assert_eq!(err.message, "Request failed with status code 400");

    let server = respond_with(
        ResponseTemplate::new(500).set_body_json(json!({ "detail": "", "message": "" })),
    )
    .await;
    let err = predictor_for(&server)
        .predict("https://a.test/1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "Request failed with status code 500");
}
