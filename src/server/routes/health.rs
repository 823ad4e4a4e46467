//! Liveness endpoint

use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::{debug, error};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(ping));
}

/// 200 when the storage backend answers, 500 otherwise
pub async fn ping(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Ping requested");

    match state.service.ping().await {
        Ok(()) => Ok(HttpResponse::Ok().finish()),
        Err(e) => {
            error!("Storage ping failed: {}", e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}
