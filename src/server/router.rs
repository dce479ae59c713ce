use crate::server::handlers::{reports, scans, targets};
use crate::server::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/scan-targets", post(targets::create_target).get(targets::list_targets))
        .route("/scan-targets/:id", get(targets::get_target))
        .route("/scans/start", post(scans::start_scan))
        .route("/scans/stop/:target_id", post(scans::stop_scan))
        .route("/scans/results", get(scans::list_results))
        .route("/scans/results/:target_id", get(scans::get_results))
        .route("/vulnerabilities/:scan_id", get(scans::list_vulnerabilities))
        .route("/dashboard/stats", get(reports::dashboard_stats))
        .route("/reports/export/:scan_id", get(reports::export_report))
        .route("/payloads", get(reports::list_payloads));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
