use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, CacheStats, ErrorCode, ScenarioBounds, ScenarioParameters, SimulationResult,
    SCHEMA_VERSION_V1,
};
use scenario_core::SimulationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::baseline::{BaselineError, BaselineSource};
use crate::{ScenarioService, ServiceError, BASELINE_YEAR};

const DEFAULT_TARGET_YEAR: i32 = 2035;

include!("error.rs");
include!("state.rs");
include!("routes/simulate.rs");
include!("routes/cache.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "scenario api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/simulate", post(simulate))
        .route("/api/v1/scenarios/{scenario_id}", get(get_scenario))
        .route("/api/v1/cache/stats", get(get_cache_stats))
        .route("/api/v1/cache/clear", post(clear_cache))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
