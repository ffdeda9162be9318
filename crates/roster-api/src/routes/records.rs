//! Employee record routes
//!
//! Every operation runs under the caller's scope: admins see the full
//! set, everyone else only their own records. Out-of-scope ids behave as
//! absent rather than forbidden.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    routing::{delete, get, post, put},
};
use roster_store::{NewEmployeeRecord, RecordScope, UpdateEmployeeRecord};
use tracing::{debug, info};
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{CreateRecordRequest, RecordResponse, UpdateRecordRequest};

/// GET /api/users
async fn list_records(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordResponse>>, ApiError> {
    let scope = RecordScope::for_caller(user.role, &user.id);
    let records = state.records.list(&scope).await?;

    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

/// GET /api/users/{id}
async fn get_record(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordResponse>, ApiError> {
    let scope = RecordScope::for_caller(user.role, &user.id);
    let record = state
        .records
        .get(id, &scope)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Record: {}", id)))?;

    Ok(Json(record.into()))
}

/// POST /api/users
async fn create_record(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<RecordResponse>), ApiError> {
    request.validate()?;

    // Only admins may assign ownership; everyone else owns what they create
    let owner_account_id = if user.role.is_admin() {
        request.owner_account_id.unwrap_or_else(|| user.id.clone())
    } else {
        user.id.clone()
    };

    let record = state
        .records
        .create(NewEmployeeRecord {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            owner_account_id,
            date_of_birth: request.date_of_birth,
            place_of_birth: request.place_of_birth,
            residence: request.residence,
            certificate_file_name: request.certificate_file_name,
        })
        .await?;

    info!("Created record {} for account {}", record.id, record.owner_account_id);
    metrics::counter!("roster_records_created_total").increment(1);

    let location = format!("/api/users/{}", record.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record.into()),
    ))
}

/// PUT /api/users/{id}
///
/// Full replace; the body must carry the path id.
async fn update_record(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    if request.id != id {
        return Err(ApiError::Validation(
            "Record id in body does not match the path".to_string(),
        ));
    }
    request.validate()?;

    let scope = RecordScope::for_caller(user.role, &user.id);
    let record = state
        .records
        .update(
            id,
            UpdateEmployeeRecord {
                first_name: Some(request.first_name),
                last_name: Some(request.last_name),
                email: Some(request.email),
                owner_account_id: None,
                date_of_birth: Some(request.date_of_birth),
                place_of_birth: Some(request.place_of_birth),
                residence: Some(request.residence),
                certificate_file_name: Some(request.certificate_file_name),
            },
            &scope,
        )
        .await?;

    debug!("Updated record {}", record.id);

    Ok(Json(record.into()))
}

/// DELETE /api/users/{id}
async fn delete_record(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let scope = RecordScope::for_caller(user.role, &user.id);
    let deleted = state.records.delete(id, &scope).await?;

    if deleted {
        info!("Deleted record {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Record: {}", id)))
    }
}

/// Create employee record routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_records))
        .route("/api/users", post(create_record))
        .route("/api/users/{id}", get(get_record))
        .route("/api/users/{id}", put(update_record))
        .route("/api/users/{id}", delete(delete_record))
}
