//! HTTP route modules

pub mod health;
pub mod metrics;

use actix_web::web;

/// Register every route on the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    health::configure_routes(cfg);
    metrics::configure_routes(cfg);
}
