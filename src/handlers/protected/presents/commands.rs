use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::app::AppState;
use crate::database::Present;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::NewPresent;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(default)]
    pub present_id: String,
    /// Defaults to the authenticated user
    #[serde(default)]
    pub reserver_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// POST /api/present-commands/add - create an unreserved present on a wishlist
pub async fn present_add(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    body: Result<Json<NewPresent>, JsonRejection>,
) -> ApiResult<Present> {
    let request = json_body(body)?;
    let present = state.engine.add_present(request, &cancel).await?;
    Ok(ApiResponse::created(present))
}

/// DELETE /api/present-commands/delete/:present_id
pub async fn present_delete(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(present_id): Path<String>,
) -> ApiResult<Deleted> {
    state.engine.delete_present(&present_id, &cancel).await?;
    Ok(ApiResponse::success(Deleted {
        id: present_id,
        deleted: true,
    }))
}

/// POST /api/present-commands/reserve - reserve a present for the caller or a named user
pub async fn present_reserve(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(cancel): Extension<CancellationToken>,
    body: Result<Json<ReserveRequest>, JsonRejection>,
) -> ApiResult<Present> {
    let request = json_body(body)?;
    let reserver_id = request
        .reserver_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(user.user_id);

    let present = state
        .engine
        .reserve_present(&request.present_id, &reserver_id, &cancel)
        .await?;
    Ok(ApiResponse::success(present))
}
