use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;

use super::RecordMetadata;
use crate::shared::collection_key::CollectionKey;
use crate::shared::form::FormFields;

/// Всё, что хранится в коллекции и сопоставляется по `id`
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Трейт для записей админки (объекты, юниты, агенты)
///
/// Определяет обязательные методы и метаданные, которыми пользуются
/// хранилище, загрузчик, контроллер списка и REST-фасад.
pub trait Record:
    Identifiable + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Форма создания/редактирования (сырые строки из UI)
    type Form: FormFields;

    // ============================================================================
    // Методы экземпляра
    // ============================================================================

    /// Назначить id (сервер выдаёт его, если клиент прислал пустой)
    fn set_id(&mut self, id: String);

    fn metadata(&self) -> &RecordMetadata;

    fn metadata_mut(&mut self) -> &mut RecordMetadata;

    /// Заполнить форму текущими значениями
    fn to_form(&self) -> Self::Form;

    /// Перенести значения формы в запись (trim + приведение чисел).
    /// `id` и `createdAt` не трогаются.
    fn apply_form(&mut self, form: &Self::Form);

    /// Проверка обязательных полей
    fn validate(&self) -> Result<(), String>;

    /// Текст, по которому работает поиск в списке
    fn search_text(&self) -> String;

    /// Ключ текущего статуса (см. `status_options`). Неизвестный статус
    /// из источника возвращается как есть.
    fn status_key(&self) -> &str;

    /// Сменить только статус записи
    fn set_status(&mut self, key: &str) -> Result<(), String>;

    /// Значение ячейки таблицы для колонки `key` из `columns()`
    fn cell(&self, key: &str) -> String;

    /// Значение для сортировки по колонке `key`
    fn sort_value(&self, key: &str) -> SortValue;

    // ============================================================================
    // Метаданные типа записи
    // ============================================================================

    /// Пустая запись с заданным id
    fn blank(id: String, metadata: RecordMetadata) -> Self;

    /// Коллекция, к которой относится запись
    fn collection() -> CollectionKey;

    /// Имя элемента для UI (единственное число)
    fn element_name() -> &'static str;

    /// Допустимые статусы: (ключ, подпись)
    fn status_options() -> &'static [(&'static str, &'static str)];

    /// Колонки списка: (ключ, подпись)
    fn columns() -> &'static [(&'static str, &'static str)];

    /// Небольшой фиксированный набор данных для демо-режима
    fn demo_records() -> Vec<Self>;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Имя списка для UI (множественное число)
    fn list_name() -> &'static str {
        Self::collection().title()
    }

    fn status_label(&self) -> &str {
        let key = self.status_key();
        Self::status_options()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| *label)
            .unwrap_or(key)
    }

    /// Статус входит в `status_options`
    fn has_known_status(&self) -> bool {
        let key = self.status_key();
        Self::status_options().iter().any(|(k, _)| *k == key)
    }
}

/// Значение, по которому сортируется список
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Empty,
    Text(String),
    Number(f64),
    Time(DateTime<Utc>),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    /// Пустые значения идут первыми, разнотипные считаются равными
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Empty, SortValue::Empty) => Ordering::Equal,
            (SortValue::Empty, _) => Ordering::Less,
            (_, SortValue::Empty) => Ordering::Greater,
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_value_ordering() {
        assert_eq!(
            SortValue::text("Beta").compare(&SortValue::text("alpha")),
            Ordering::Greater
        );
        assert_eq!(
            SortValue::Number(2.0).compare(&SortValue::Number(10.0)),
            Ordering::Less
        );
        assert_eq!(
            SortValue::Empty.compare(&SortValue::Number(0.0)),
            Ordering::Less
        );
        assert_eq!(
            SortValue::Number(1.0).compare(&SortValue::text("1")),
            Ordering::Equal
        );
    }
}
