//! Metric ingestion and query endpoints

use crate::core::models::{Metric, MetricKind, MetricValue, Metrics, metric::render_text};
use crate::server::state::AppState;
use crate::utils::crypto::{ENCRYPTION_HEADER, ENCRYPTION_SCHEME};
use crate::utils::error::{MetricError, Result};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Configure metric routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(dump_metrics))
        .route("/update", web::post().to(update_metric_json))
        .route(
            "/update/{kind}/{name}/{value}",
            web::post().to(update_metric_path),
        )
        .route("/updates", web::post().to(update_metrics_batch))
        .route("/value", web::post().to(get_metric_json))
        .route("/value/{kind}/{name}", web::get().to(get_metric_value));
}

/// Body of `POST /value`
#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
}

/// Look up the stored entry and attach a fresh hash
async fn signed_metric(state: &AppState, kind: &MetricKind, name: &str) -> Result<Metric> {
    let mut metric = state.service.get_metric(kind, name).await?;
    state.service.sign_metric(&mut metric)?;
    Ok(metric)
}

/// `POST /update` with one JSON metric
async fn update_metric_json(
    state: web::Data<AppState>,
    metric: web::Json<Metric>,
) -> Result<HttpResponse> {
    let metric = metric.into_inner();
    debug!("Update {} ({})", metric.id, metric.kind);

    state.service.verify_hash(&metric)?;
    state.service.add_metric(&metric).await?;

    let stored = signed_metric(&state, &metric.kind, &metric.id).await?;
    Ok(HttpResponse::Ok().json(stored))
}

/// `POST /update/{kind}/{name}/{value}`
async fn update_metric_path(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse> {
    let (kind, name, raw) = path.into_inner();
    let kind = MetricKind::from(kind);
    let value = MetricValue::parse(&kind, &raw)?;

    state
        .service
        .add_metric(&Metric::from_value(name, value))
        .await?;

    Ok(HttpResponse::Ok().content_type(ContentType::plaintext()).finish())
}

/// `POST /updates` with a JSON array, optionally encrypted
async fn update_metrics_batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let plaintext = decrypt_body(&state, &req, body)?;
    let metrics: Metrics = serde_json::from_slice(&plaintext)
        .map_err(|e| MetricError::validation(format!("Invalid metrics batch: {}", e)))?;

    // every element is checked before anything is written
    for metric in &metrics {
        metric.validate()?;
        state.service.verify_hash(metric)?;
    }
    state.service.add_metric_batch(&metrics).await?;

    info!("Accepted batch of {} metrics", metrics.len());
    Ok(HttpResponse::Ok().json(serde_json::json!({ "accepted": metrics.len() })))
}

fn decrypt_body(state: &AppState, req: &HttpRequest, body: web::Bytes) -> Result<Vec<u8>> {
    let Some(scheme) = req.headers().get(ENCRYPTION_HEADER) else {
        return Ok(body.to_vec());
    };
    if scheme.as_bytes() != ENCRYPTION_SCHEME.as_bytes() {
        return Err(MetricError::validation(format!(
            "Unsupported encryption scheme {:?}",
            scheme
        )));
    }
    match &state.decryptor {
        Some(decryptor) => decryptor.decrypt(&body),
        None => {
            warn!("Encrypted payload received but no private key is configured");
            Err(MetricError::validation(
                "Encrypted payloads are not accepted by this server",
            ))
        }
    }
}

/// `POST /value` with `{id, type}`
async fn get_metric_json(
    state: web::Data<AppState>,
    query: web::Json<MetricQuery>,
) -> Result<HttpResponse> {
    let MetricQuery { id, kind } = query.into_inner();
    kind.ensure_supported()?;

    let metric = signed_metric(&state, &kind, &id).await?;
    Ok(HttpResponse::Ok().json(metric))
}

/// `GET /value/{kind}/{name}` as plain text
async fn get_metric_value(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (kind, name) = path.into_inner();
    let kind = MetricKind::from(kind);
    kind.ensure_supported()?;

    let metric = state.service.get_metric(&kind, &name).await?;
    let value = metric
        .display_value()
        .ok_or_else(|| MetricError::not_found(name))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(value))
}

/// `GET /` text dump
async fn dump_metrics(state: web::Data<AppState>) -> Result<HttpResponse> {
    let metrics = state.service.get_all_metrics().await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_text(&metrics)))
}
