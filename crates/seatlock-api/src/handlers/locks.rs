//! Lock snapshot handler for clients that poll instead of holding a socket.

use axum::Json;
use axum::extract::{Path, State};

use seatlock_core::types::ShowtimeId;
use seatlock_core::types::id::validate_identifier;

use crate::dto::response::{ApiResponse, LockSnapshotResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/showtimes/{showtime_id}/locks
pub async fn showtime_locks(
    State(state): State<AppState>,
    Path(showtime_id): Path<String>,
) -> Result<Json<ApiResponse<LockSnapshotResponse>>, ApiError> {
    validate_identifier("showtime_id", &showtime_id)?;
    let showtime_id = ShowtimeId::new(showtime_id);
    let seats = state.engine.coordinator.snapshot(&showtime_id).await?;

    Ok(Json(ApiResponse::ok(LockSnapshotResponse {
        showtime_id,
        seats,
    })))
}
