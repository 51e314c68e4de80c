#[derive(Debug, Serialize, Deserialize)]
struct ClearCacheResponse {
    schema_version: String,
    cleared: usize,
}

async fn get_cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>, HttpApiError> {
    let stats = state
        .service()
        .cache_stats()
        .map_err(HttpApiError::from_service)?;
    Ok(Json(stats))
}

async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<ClearCacheResponse>, HttpApiError> {
    let cleared = state
        .service()
        .invalidate_all()
        .map_err(HttpApiError::from_service)?;

    Ok(Json(ClearCacheResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        cleared,
    }))
}
