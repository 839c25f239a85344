//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::directory::DirectoryError;
use crate::domain::{
    Distance, LineError, LineId, StationId, TimeOfDay, TimeTable, TravelTime,
};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations).post(create_station))
        .route("/lines", get(list_lines).post(create_line))
        .route("/lines/:id", get(get_line).delete(delete_line))
        .route("/lines/:id/stations", post(add_station))
        .route("/lines/:id/stations/:station_id", delete(remove_station))
        .route("/lines/:id/sections", post(add_section))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Path parameters, rejected with the JSON error body on a bad segment.
struct PathParams<T>(T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                warn!(uri = %parts.uri, error = %e, "rejected path");
                AppError::BadRequest {
                    message: e.body_text(),
                }
            })?;
        Ok(Self(params))
    }
}

/// List every station record.
async fn list_stations(State(state): State<AppState>) -> Json<StationListResponse> {
    let stations = state
        .directory
        .stations()
        .await
        .iter()
        .map(StationResult::from_station)
        .collect();
    Json(StationListResponse { stations })
}

/// Register a station.
async fn create_station(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: CreateStationRequest = parse_json(&body)?;
    let station = state.directory.create_station(&req.name).await?;
    Ok((StatusCode::CREATED, Json(StationResult::from_station(&station))).into_response())
}

/// List every line with its derived order.
async fn list_lines(State(state): State<AppState>) -> Result<Json<LineListResponse>, AppError> {
    let lines = state
        .directory
        .lines()
        .await
        .iter()
        .map(LineResult::from_line)
        .collect::<Result<_, _>>()?;
    Ok(Json(LineListResponse { lines }))
}

/// Create a line.
async fn create_line(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: CreateLineRequest = parse_json(&body)?;

    let start = TimeOfDay::parse_hhmm(&req.start_time).map_err(|e| AppError::BadRequest {
        message: format!("Invalid start time {}: {e}", req.start_time),
    })?;
    let end = TimeOfDay::parse_hhmm(&req.end_time).map_err(|e| AppError::BadRequest {
        message: format!("Invalid end time {}: {e}", req.end_time),
    })?;
    let time_table = TimeTable::new(start, end).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let line = state
        .directory
        .create_line(&req.name, time_table, req.interval)
        .await?;
    Ok((StatusCode::CREATED, Json(LineResult::from_line(&line)?)).into_response())
}

/// Get one line.
async fn get_line(
    State(state): State<AppState>,
    PathParams(id): PathParams<u64>,
) -> Result<Json<LineResult>, AppError> {
    let line = state.directory.line(LineId::new(id)).await?;
    Ok(Json(LineResult::from_line(&line)?))
}

/// Delete a line and its sections.
async fn delete_line(
    State(state): State<AppState>,
    PathParams(id): PathParams<u64>,
) -> Result<StatusCode, AppError> {
    state.directory.delete_line(LineId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register an existing station on a line.
async fn add_station(
    State(state): State<AppState>,
    PathParams(id): PathParams<u64>,
    body: Bytes,
) -> Result<Json<LineResult>, AppError> {
    let req: AddStationRequest = parse_json(&body)?;
    let line = state
        .directory
        .add_station_to_line(LineId::new(id), StationId::new(req.station_id))
        .await?;
    Ok(Json(LineResult::from_line(&line)?))
}

/// Add a section to a line.
async fn add_section(
    State(state): State<AppState>,
    PathParams(id): PathParams<u64>,
    body: Bytes,
) -> Result<Json<LineResult>, AppError> {
    let req: AddSectionRequest = parse_json(&body)?;

    let duration = match (req.duration_secs, req.duration.as_deref()) {
        (Some(secs), None) => TravelTime::from_secs(secs),
        (None, Some(text)) => TravelTime::parse(text),
        _ => {
            return Err(AppError::BadRequest {
                message: "exactly one of duration_secs or duration is required".to_string(),
            });
        }
    }
    .map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let distance = Distance::from_km(req.distance_km).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let line = state
        .directory
        .add_section(
            LineId::new(id),
            StationId::new(req.upstream_id),
            StationId::new(req.downstream_id),
            duration,
            distance,
        )
        .await?;
    Ok(Json(LineResult::from_line(&line)?))
}

/// Remove a station from a line, repairing the path.
async fn remove_station(
    State(state): State<AppState>,
    PathParams((id, station_id)): PathParams<(u64, u64)>,
) -> Result<Json<LineResult>, AppError> {
    let line = state
        .directory
        .remove_station(LineId::new(id), StationId::new(station_id))
        .await?;
    Ok(Json(LineResult::from_line(&line)?))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<LineError> for AppError {
    fn from(e: LineError) -> Self {
        let message = e.to_string();
        match e {
            LineError::DuplicateStation(_) => AppError::Conflict { message },
            LineError::StationNotFound(_) => AppError::NotFound { message },
            LineError::InvalidSection(_) | LineError::InvalidLine(_) => {
                AppError::BadRequest { message }
            }
            LineError::InvalidGraphState(_) => AppError::Internal { message },
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        let message = e.to_string();
        match e {
            DirectoryError::Line(inner) => AppError::from(inner),
            DirectoryError::DuplicateName(_) => AppError::Conflict { message },
            DirectoryError::LineNotFound(_) | DirectoryError::StationNotFound(_) => {
                AppError::NotFound { message }
            }
            DirectoryError::InvalidName(_) => AppError::BadRequest { message },
            DirectoryError::Snapshot { .. } => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
