use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SortValue;

/// Метаданные жизненного цикла записи
///
/// Сериализуются плоско рядом с полями записи (`createdAt`, `updatedAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    /// Дата создания записи, не меняется после создания
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Дата последнего изменения
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RecordMetadata {
    /// Создать метаданные для новой записи
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Обновить timestamp
    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    /// `updated_at` никогда не опускается ниже `created_at`
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Значение для сортировки по общим полям (`createdAt`, `updatedAt`)
    pub fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "createdAt" => SortValue::Time(self.created_at),
            "updatedAt" => SortValue::Time(self.updated_at),
            _ => SortValue::Empty,
        }
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self::new()
    }
}
