use std::sync::Arc;

use crate::{
    config::EngineConfig,
    services::{MovieProvider, RecommendationEngine},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(provider: Arc<dyn MovieProvider>, config: EngineConfig) -> Self {
        Self {
            engine: Arc::new(RecommendationEngine::new(provider, config)),
        }
    }
}
