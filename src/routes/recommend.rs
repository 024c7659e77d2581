use actix_web::{web, HttpResponse, Responder};
use serde_json::Value;
use tracing::Instrument;
use validator::Validate;

use crate::core::normalize_profile;
use crate::models::{
    CatalogHealth, ChatRequest, ChatResponse, HealthResponse, RecommendRequest, RecommendResponse,
};
use crate::routes::{validation_failed, AppState};

/// Configure recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommend", web::post().to(recommend))
        .route("/chat", web::post().to(chat));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // An empty catalog still answers requests, just with empty shortlists
    let status = if state.catalog.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        offline_mode: state.images.is_offline(),
        keys_present: state.keys.clone(),
        catalog: CatalogHealth {
            bikes: state.catalog.len(),
            warnings: state.catalog.warnings().len(),
        },
    })
}

/// Recommend endpoint
///
/// POST /api/recommend
///
/// Request body:
/// ```json
/// {
///   "experience": "no_experience",
///   "height_cm": 170,
///   "budget_usd": 6000,
///   "bike_types": ["sportbike"],
///   "k": 3,
///   "pin_ids": ["yamaha_r3"],
///   "external_items": [{"label": "BMW G 310 R"}]
/// }
/// ```
async fn recommend(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let span = tracing::info_span!("recommend", request_id = %uuid::Uuid::new_v4());
    async move {
        let request = RecommendRequest::from_value(body.into_inner());
        let shortlist = state.recommender.recommend_request(&state.catalog, &request);

        tracing::info!(
            "Recommended {} of k={} (experience={}, height={}cm, types={:?}, eligible={})",
            shortlist.count(),
            shortlist.profile.k,
            shortlist.profile.experience.as_str(),
            shortlist.profile.height_cm,
            shortlist.profile.bike_types,
            shortlist.eligible
        );

        let count = shortlist.count();
        HttpResponse::Ok().json(RecommendResponse {
            items: shortlist.items,
            count,
            profile: shortlist.profile,
        })
    }
    .instrument(span)
    .await
}

/// Chat endpoint
///
/// POST /api/chat
///
/// Request body:
/// ```json
/// {
///   "message": "I'm 180 cm and want a naked bike",
///   "profile": { "experience": "no_experience" }
/// }
/// ```
async fn chat(state: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for chat request: {}", errors);
        return validation_failed(errors);
    }

    let span = tracing::info_span!("chat", request_id = %uuid::Uuid::new_v4());
    async move {
        let current = normalize_profile(&req.profile, state.recommender.chat_default_k());
        let plan = state.nlu.make_plan(&req.message, &current).await;
        let outcome = state.recommender.apply_plan(&state.catalog, &current, &plan);

        let (recommended, items) = match outcome.shortlist {
            Some(shortlist) => (true, shortlist.items),
            None => (false, Vec::new()),
        };

        tracing::info!(
            "Chat topic={} actions={} recommended={} count={}",
            plan.topic,
            plan.actions.len(),
            recommended,
            items.len()
        );

        HttpResponse::Ok().json(ChatResponse {
            topic: plan.topic,
            message: plan.message,
            profile: outcome.profile,
            recommended,
            count: items.len(),
            items,
        })
    }
    .instrument(span)
    .await
}
