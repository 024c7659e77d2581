use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::ImageRequest;
use crate::routes::{validation_failed, AppState};

/// Configure image routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/images", web::post().to(resolve_images));
}

/// Image lookup endpoint
///
/// POST /api/images
///
/// Always answers with at least one picture; failed searches fall back to
/// the stock image.
async fn resolve_images(state: web::Data<AppState>, req: web::Json<ImageRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for images request: {}", errors);
        return validation_failed(errors);
    }

    let response = state.images.resolve(&req).await;
    tracing::debug!(
        "Resolved images for id={:?} model={:?}: {:?}",
        req.id,
        req.model,
        response.source
    );

    HttpResponse::Ok().json(response)
}
