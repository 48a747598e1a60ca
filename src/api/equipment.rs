//! Equipment API endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::equipment::{BorrowRequest, DeleteResponse, Equipment, EquipmentInput},
    AppState,
};

use super::{require_session, Bearer};

type IdPath = Result<Path<i64>, PathRejection>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.gateway.list_equipment(bearer.credential()).await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipments/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    path: IdPath,
) -> AppResult<Json<Equipment>> {
    require_session(&state, &bearer).await?;
    let Path(id) = path?;
    let equipment = state.gateway.get_equipment(bearer.credential(), id).await?;
    Ok(Json(equipment))
}

/// Create equipment (admin only)
#[utoipa::path(
    post,
    path = "/equipments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = EquipmentInput,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    body: Body<EquipmentInput>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    require_session(&state, &bearer).await?;
    let Json(input) = body?;
    let equipment = state.gateway.create_equipment(bearer.credential(), input).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment (admin only)
#[utoipa::path(
    put,
    path = "/equipments/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = EquipmentInput,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    path: IdPath,
    body: Body<EquipmentInput>,
) -> AppResult<Json<Equipment>> {
    require_session(&state, &bearer).await?;
    let Path(id) = path?;
    let Json(input) = body?;
    let equipment = state
        .gateway
        .update_equipment(bearer.credential(), id, input)
        .await?;
    Ok(Json(equipment))
}

/// Delete equipment (admin only)
#[utoipa::path(
    delete,
    path = "/equipments/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted", body = DeleteResponse),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    path: IdPath,
) -> AppResult<Json<DeleteResponse>> {
    require_session(&state, &bearer).await?;
    let Path(id) = path?;
    let response = state.gateway.delete_equipment(bearer.credential(), id).await?;
    Ok(Json(response))
}

/// Borrow an available item
#[utoipa::path(
    post,
    path = "/equipments/{id}/borrow",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Item borrowed", body = Equipment),
        (status = 400, description = "Borrower name missing or too short", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Item already borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    path: IdPath,
    body: Body<BorrowRequest>,
) -> AppResult<Json<Equipment>> {
    require_session(&state, &bearer).await?;
    let Path(id) = path?;
    let Json(request) = body?;
    let equipment = state
        .gateway
        .borrow_equipment(bearer.credential(), id, request)
        .await?;
    Ok(Json(equipment))
}

/// Return a borrowed item
#[utoipa::path(
    post,
    path = "/equipments/{id}/return",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Item returned", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Item is not borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_equipment(
    State(state): State<AppState>,
    bearer: Bearer,
    path: IdPath,
) -> AppResult<Json<Equipment>> {
    require_session(&state, &bearer).await?;
    let Path(id) = path?;
    let equipment = state.gateway.return_equipment(bearer.credential(), id).await?;
    Ok(Json(equipment))
}
