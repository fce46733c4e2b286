// Route exports
pub mod recommendations;
pub mod search;

use crate::core::Recommender;
use crate::services::{RecommendationStore, SharedIndex};
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<dyn RecommendationStore>,
    pub index: Arc<SharedIndex>,
    pub propagate_upstream_status: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(search::configure)
        .configure(recommendations::configure);
}
