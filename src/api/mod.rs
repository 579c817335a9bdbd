pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::service::{ReconciliationService, RequestSource};

pub use handlers::*;

/// 构建路由
pub fn router<S: RequestSource + 'static>(service: Arc<ReconciliationService<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/compare", post(compare_items))
        .route("/api/requests/:anfrage_id/positions", get(request_positions::<S>))
        .route("/api/offers/normalize", post(normalize_offer_upload::<S>))
        .route("/api/reconcile", post(reconcile::<S>))
        .route("/api/reconcile/export", post(reconcile_export::<S>))
        .with_state(service)
}
