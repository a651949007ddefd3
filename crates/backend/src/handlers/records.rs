//! Обобщённые обработчики REST для любой коллекции записей.
//! Маршруты собираются в `routes::record_routes::<T>()`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use contracts::domain::common::Record;
use contracts::shared::export::{export_file_name, ExportFormat, Exportable};
use serde_json::{json, Value};

use crate::domain::records::service;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

/// Тело запроса → запись. Ошибки синтаксиса и формы — 400 с JSON-телом,
/// а не стандартный текстовый ответ axum.
fn parse_body<T: Record>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let Json(mut value) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    // id необязателен при создании
    if let Some(obj) = value.as_object_mut() {
        obj.entry("id").or_insert_with(|| Value::String(String::new()));
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", T::element_name(), e)))
}

/// GET /api/<resource>
pub async fn list_all<T: Record>(State(state): State<AppState>) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(service::list_all::<T>(state.db()?).await?))
}

/// GET /api/<resource>/:id
pub async fn get_by_id<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError> {
    Ok(Json(service::get_by_id::<T>(state.db()?, &id).await?))
}

/// POST /api/<resource>
pub async fn create<T: Record>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    let db = state.db()?;
    let record = parse_body::<T>(body)?;
    let created = service::create(db, record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/<resource>/:id
pub async fn update<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<T>, ApiError> {
    let db = state.db()?;
    let record = parse_body::<T>(body)?;
    Ok(Json(service::update(db, &id, record).await?))
}

/// DELETE /api/<resource>/:id
pub async fn delete<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service::delete::<T>(state.db()?, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/<resource>/testdata
pub async fn insert_test_data<T: Record>(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let inserted = service::insert_test_data::<T>(state.db()?).await?;
    Ok(Json(json!({ "inserted": inserted })))
}

/// GET /api/<resource>/export.csv
pub async fn export_csv<T: Record + Exportable>(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let body = service::export_csv::<T>(state.db()?).await?;
    let filename = export_file_name(
        T::collection().resource(),
        ExportFormat::Csv,
        chrono::Utc::now().date_naive(),
    );
    Ok((
        [
            (
                header::CONTENT_TYPE,
                ExportFormat::Csv.mime_type().to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
