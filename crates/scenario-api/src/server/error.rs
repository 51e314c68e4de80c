#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status,
            error: ApiError::new(code, message, details),
        }
    }

    fn invalid_scenario(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn scenario_not_found(scenario_id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ErrorCode::ScenarioNotFound,
            "no cached or archived result for scenario_id",
            Some(format!("scenario_id={scenario_id}")),
        )
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError,
            message,
            details,
        )
    }

    fn from_json_rejection(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidScenario,
            "request body is not a valid scenario",
            Some(rejection.body_text()),
        )
    }

    fn from_service(err: ServiceError) -> Self {
        let details = Some(err.to_string());
        match err {
            ServiceError::Simulation(SimulationError::MalformedBaseline { .. }) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MalformedBaseline,
                "baseline data is malformed",
                details,
            ),
            ServiceError::Simulation(SimulationError::ComputationFailure { .. }) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ComputationFailure,
                "simulation failed",
                details,
            ),
            ServiceError::CacheUnavailable(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::CacheUnavailable,
                "result cache is unavailable",
                details,
            ),
            ServiceError::BaselineUnavailable(BaselineError::NotFound(_))
            | ServiceError::RegionMismatch { .. } => Self::new(
                StatusCode::NOT_FOUND,
                ErrorCode::RegionNotFound,
                "no baseline available for region",
                details,
            ),
            ServiceError::BaselineUnavailable(BaselineError::YearUnavailable { .. }) => Self::new(
                StatusCode::NOT_FOUND,
                ErrorCode::RegionNotFound,
                "no baseline available for the requested baseline year",
                details,
            ),
            ServiceError::BaselineUnavailable(BaselineError::Parse { .. }) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MalformedBaseline,
                "baseline data is malformed",
                details,
            ),
            ServiceError::BaselineUnavailable(BaselineError::Io { .. }) => {
                Self::internal("failed to load baseline", details)
            }
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
