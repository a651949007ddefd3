use chrono::Utc;
use contracts::domain::common::{Record, RecordIdSource};
use contracts::shared::export::csv::to_csv;
use contracts::shared::export::Exportable;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::api_error::ApiError;

/// Получение списка всех записей коллекции
pub async fn list_all<T: Record>(conn: &DatabaseConnection) -> Result<Vec<T>, ApiError> {
    Ok(repository::list_all::<T>(conn).await?)
}

/// Получение записи по ID
pub async fn get_by_id<T: Record>(conn: &DatabaseConnection, id: &str) -> Result<T, ApiError> {
    repository::get_by_id::<T>(conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} {}", T::element_name(), id)))
}

/// Создание новой записи. Пустой id назначается сервером,
/// занятый id — ошибка клиента.
pub async fn create<T: Record>(conn: &DatabaseConnection, mut record: T) -> Result<T, ApiError> {
    let now = Utc::now();
    if record.id().trim().is_empty() {
        record.set_id(RecordIdSource::Uuid.next_id(now));
    } else if repository::exists(conn, T::collection(), record.id()).await? {
        return Err(ApiError::BadRequest(format!(
            "{} {} already exists",
            T::element_name(),
            record.id()
        )));
    }
    record.metadata_mut().created_at = now;
    record.metadata_mut().touch_at(now);

    record.validate().map_err(ApiError::BadRequest)?;

    repository::insert(conn, &record).await?;
    tracing::info!("{}: created {}", T::collection(), record.id());
    Ok(record)
}

/// Обновление существующей записи. id берётся из пути,
/// `createdAt` сохраняется.
pub async fn update<T: Record>(conn: &DatabaseConnection, id: &str, mut record: T) -> Result<T, ApiError> {
    let existing = get_by_id::<T>(conn, id).await?;

    record.set_id(id.to_string());
    *record.metadata_mut() = existing.metadata().clone();
    record.metadata_mut().touch_at(Utc::now());

    record.validate().map_err(ApiError::BadRequest)?;

    repository::update(conn, &record).await?;
    tracing::info!("{}: updated {}", T::collection(), id);
    Ok(record)
}

/// Удаление записи
pub async fn delete<T: Record>(conn: &DatabaseConnection, id: &str) -> Result<(), ApiError> {
    if repository::delete(conn, T::collection(), id).await? {
        tracing::info!("{}: deleted {}", T::collection(), id);
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{} {}", T::element_name(), id)))
    }
}

/// Вставка тестовых данных (демо-набор). Уже существующие записи
/// перезаписываются. Возвращает количество записей.
pub async fn insert_test_data<T: Record>(conn: &DatabaseConnection) -> Result<usize, ApiError> {
    let demo = T::demo_records();
    for record in &demo {
        if repository::exists(conn, T::collection(), record.id()).await? {
            repository::update(conn, record).await?;
        } else {
            repository::insert(conn, record).await?;
        }
    }
    tracing::info!("{}: {} demo records inserted", T::collection(), demo.len());
    Ok(demo.len())
}

/// CSV всей коллекции в порядке списка
pub async fn export_csv<T: Record + Exportable>(conn: &DatabaseConnection) -> Result<String, ApiError> {
    let items = repository::list_all::<T>(conn).await?;
    to_csv(&items).map_err(|e| ApiError::Internal(e.into()))
}
