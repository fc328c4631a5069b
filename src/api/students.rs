//! Student Handlers
//!
//! One handler per contract operation. Each logs a single line naming the
//! operation, decodes and validates before touching storage, and lets
//! [`ApiError`] choose the status code. Extractor rejections are taken as
//! `Result` so they also answer with the JSON error body.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use student_core::{Student, StudentRequest, UpdateStudentRequest};

use super::error::{ApiError, ApiResult};
use super::AppState;

/// Create response: `{"success": "OK", "id": <new id>}`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: &'static str,
    pub id: i64,
}

/// `POST /api/students`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    tracing::info!("creating a student");

    let request: StudentRequest = decode_body(&body?)?;
    let fields = request.validate()?;
    let id = state.store.create_student(&fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { success: "OK", id }),
    ))
}

/// `GET /api/students/{id}`
pub async fn get_by_id(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Student>> {
    let Path(raw_id) = raw_id?;
    tracing::info!(id = %raw_id, "getting a student");

    let id = parse_id(&raw_id)?;
    let student = state.store.get_student_by_id(id).await?;
    Ok(Json(student))
}

/// `GET /api/students`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    tracing::info!("listing students");

    let students = state.store.get_students().await?;
    Ok(Json(students))
}

/// `PUT /api/students`
pub async fn update(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Student>> {
    tracing::info!("updating a student");

    let request: UpdateStudentRequest = decode_body(&body?)?;
    let (id, fields) = request.validate()?;
    let student = state.store.update_student_by_id(id, &fields).await?;
    Ok(Json(student))
}

/// `DELETE /api/students/{id}`
pub async fn delete_by_id(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Student>> {
    let Path(raw_id) = raw_id?;
    tracing::info!(id = %raw_id, "deleting a student");

    let id = parse_id(&raw_id)?;
    let student = state.store.delete_student_by_id(id).await?;
    Ok(Json(student))
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId(raw.to_string())),
    }
}
