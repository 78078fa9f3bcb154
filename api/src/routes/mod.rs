pub mod health;
pub mod predict;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(predict::routes())
}
