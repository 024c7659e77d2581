// HTTP API tests for RideReady

use actix_web::{test, web, App};
use rideready::core::{Catalog, Recommender};
use rideready::models::{ImageResponse, ImageSource, KeysPresent};
use rideready::routes::{self, handle_json_payload_error, AppState};
use rideready::services::{ImageResolver, NluClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const CATALOG_JSON: &str = r#"[
    {"id": "yamaha_r3", "name": "YZF-R3", "manufacturer": "Yamaha", "category": "sportbike",
     "seat_height_mm": 780, "wet_weight_kg": 169, "abs": true, "max_speed_mph": 112, "zero_to_sixty_s": 5.6},
    {"id": "honda_rebel300", "name": "Rebel 300", "manufacturer": "Honda", "category": "cruiser",
     "seat_height_mm": 690, "wet_weight_kg": 165, "abs": true},
    {"id": "ktm_390_duke", "name": "390 Duke", "manufacturer": "KTM", "category": "naked",
     "seat_height_mm": 820, "wet_weight_kg": 165, "abs": true},
    {"id": "bmw_g310r", "name": "G 310 R", "manufacturer": "BMW", "category": "naked",
     "seat_height_mm": 785, "wet_weight_kg": 164, "abs": "yes"},
    {"id": "mystery", "name": "No Category", "manufacturer": "Nobody"}
]"#;

fn create_state() -> AppState {
    let catalog = Catalog::from_json_str(CATALOG_JSON).unwrap();
    let manifest = HashMap::from([("yamaha_r3".to_string(), "yamaha_r3.jpg".to_string())]);

    AppState {
        catalog: Arc::new(catalog),
        recommender: Recommender::default(),
        images: Arc::new(ImageResolver::new(
            manifest,
            "/static/stock_images".to_string(),
            "motorcycle_ride.jpg".to_string(),
            None,
            100,
            60,
        )),
        nlu: Arc::new(NluClient::keyword_only()),
        keys: KeysPresent {
            google_cse_key: false,
            google_cse_cx: false,
            openai: false,
        },
    }
}

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .wrap(routes::security_headers())
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_catalog_and_keys() {
    let app = test_app!();
    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        resp.headers().get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["offline_mode"], true);
    assert_eq!(body["keys_present"]["openai"], false);
    assert_eq!(body["catalog"]["bikes"], 5);
    // The record without a category is reported
    assert!(body["catalog"]["warnings"].as_u64().unwrap() >= 1);
}

#[actix_web::test]
async fn test_recommend_with_pin() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .set_json(json!({"pin_ids": ["yamaha_r3"], "bike_types": ["naked"], "k": 2}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 2);
    assert_eq!(body["items"][0]["id"], "yamaha_r3");
    assert_eq!(body["items"][0]["source"], "pinned");
    assert_eq!(body["items"][1]["source"], "ranked");
    assert_eq!(body["profile"]["bike_types"], json!(["naked"]));
}

#[actix_web::test]
async fn test_recommend_normalizes_garbage_profile() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .set_json(json!({
            "experience": "veteran",
            "height_cm": 999,
            "budget_usd": "lots",
            "bike_types": "cruiser",
            "k": -4,
            "pin_ids": "yamaha_r3"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["profile"]["experience"], "no_experience");
    assert_eq!(body["profile"]["height_cm"], 210);
    assert_eq!(body["profile"]["budget_usd"], 6000);
    assert_eq!(body["profile"]["k"], 1);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["id"], "honda_rebel300");
}

#[actix_web::test]
async fn test_recommend_empty_result() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .set_json(json!({"bike_types": ["touring"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 0);
    assert_eq!(body["items"], json!([]));
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"k\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
    assert_eq!(body["status_code"], 400);
}

#[actix_web::test]
async fn test_chat_updates_profile_and_recommends() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({
            "message": "I'm 180 cm and want a naked bike",
            "profile": {"experience": "little_experience"}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["topic"], "MOTO_DOMAIN");
    assert_eq!(body["recommended"], true);
    assert_eq!(body["profile"]["height_cm"], 180);
    assert_eq!(body["profile"]["experience"], "little_experience");
    assert_eq!(body["profile"]["bike_types"], json!(["naked"]));
    assert_eq!(body["count"], 2);
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["category"], "naked");
    }
}

#[actix_web::test]
async fn test_chat_off_topic_recommends_nothing() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"message": "What is the weather tomorrow?"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["topic"], "OFFTOPIC");
    assert_eq!(body["recommended"], false);
    assert_eq!(body["count"], 0);
    assert_eq!(body["profile"]["k"], 2);
}

#[actix_web::test]
async fn test_chat_blank_and_empty_messages() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"message": "   "}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["topic"], "EMPTY");
    assert_eq!(body["recommended"], false);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"message": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_images_local_and_fallback() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/api/images")
        .set_json(json!({"id": "yamaha_r3", "query": "Yamaha R3", "limit": 1}))
        .to_request();
    let local: ImageResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(local.source, ImageSource::Local);
    assert_eq!(local.images[0].url, "/static/stock_images/yamaha_r3.jpg");

    let req = test::TestRequest::post()
        .uri("/api/images")
        .set_json(json!({"brand": "Honda", "name": "Navi"}))
        .to_request();
    let fallback: ImageResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fallback.source, ImageSource::Fallback);
    assert_eq!(fallback.images[0].url, "/static/stock_images/motorcycle_ride.jpg");
}

#[actix_web::test]
async fn test_images_limit_validated() {
    let app = test_app!();
    let req = test::TestRequest::post()
        .uri("/api/images")
        .set_json(json!({"id": "yamaha_r3", "limit": 9}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}
