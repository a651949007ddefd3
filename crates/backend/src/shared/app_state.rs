use sea_orm::DatabaseConnection;

use crate::shared::api_error::ApiError;

/// Состояние, общее для всех обработчиков.
///
/// `db == None`, если база не открылась при старте: сервер всё равно
/// поднимается и отвечает 503 `unavailable`, а фронтенд уходит в демо-режим.
#[derive(Clone, Default)]
pub struct AppState {
    db: Option<DatabaseConnection>,
}

impl AppState {
    pub fn new(db: Option<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Result<&DatabaseConnection, ApiError> {
        self.db.as_ref().ok_or(ApiError::Unavailable)
    }
}
