use std::sync::Arc;

use crate::engine::AnalysisEngine;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is immutable after startup; per-analysis
/// state (the evidence index) lives inside `AnalysisEngine::analyze`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}
