#[derive(Debug, Clone, Deserialize)]
struct SimulateRequest {
    region: String,
    #[serde(default = "default_target_year")]
    year: i32,
    rainfall_delta: f64,
    temperature_delta: f64,
    #[serde(default)]
    urban_growth: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SimulateResponse {
    schema_version: String,
    scenario_id: String,
    cached: bool,
    computation_time_ms: f64,
    result: SimulationResult,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    schema_version: String,
    status: String,
    cache_size: usize,
    archive_attached: bool,
    last_persistence_error: Option<String>,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpApiError> {
    let stats = state
        .service()
        .cache_stats()
        .map_err(HttpApiError::from_service)?;

    Ok(Json(HealthResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        status: "ok".to_string(),
        cache_size: stats.size,
        archive_attached: state.service().has_archive(),
        last_persistence_error: state.service().last_persistence_error(),
    }))
}

async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, HttpApiError> {
    let Json(request) = payload.map_err(HttpApiError::from_json_rejection)?;
    let scenario = scenario_from_request(request);
    state
        .bounds
        .validate(&scenario)
        .map_err(HttpApiError::invalid_scenario)?;

    let started = Instant::now();
    let service = Arc::clone(&state.service);
    let baselines = Arc::clone(&state.baselines);
    let outcome = tokio::task::spawn_blocking(move || {
        service.compute_or_fetch_with(&scenario, BASELINE_YEAR, baselines.as_ref())
    })
    .await
    .map_err(|err| HttpApiError::internal("simulation task failed", Some(err.to_string())))?
    .map_err(HttpApiError::from_service)?;
    let computation_time_ms = elapsed_ms(started.elapsed());

    info!(
        scenario_id = %outcome.result.scenario_id,
        cached = outcome.cache_hit,
        computation_time_ms,
        "simulate request served"
    );

    Ok(Json(SimulateResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        scenario_id: outcome.result.scenario_id.clone(),
        cached: outcome.cache_hit,
        computation_time_ms,
        result: SimulationResult::clone(&outcome.result),
    }))
}

async fn get_scenario(
    Path(scenario_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SimulationResult>, HttpApiError> {
    let found = state
        .service()
        .lookup(&scenario_id)
        .map_err(HttpApiError::from_service)?;

    match found {
        Some(result) => Ok(Json(SimulationResult::clone(&result))),
        None => Err(HttpApiError::scenario_not_found(&scenario_id)),
    }
}
