//! Примитивы upsert/remove над упорядоченной коллекцией с ключом `id`.
//!
//! Все функции чистые: входной срез не меняется, вызывающий код работает
//! с возвращённой коллекцией.

use std::collections::HashSet;

use crate::domain::common::Identifiable;

/// Заменить запись с тем же id на её месте или добавить в начало, если id
/// новый (списки админки идут от новых к старым)
pub fn upsert_by_id<T: Identifiable + Clone>(collection: &[T], record: T) -> Vec<T> {
    match collection.iter().position(|item| item.id() == record.id()) {
        Some(index) => {
            let mut next = collection.to_vec();
            next[index] = record;
            next
        }
        None => {
            let mut next = Vec::with_capacity(collection.len() + 1);
            next.push(record);
            next.extend_from_slice(collection);
            next
        }
    }
}

/// Убрать все записи с `id`. Отсутствующий id не ошибка.
pub fn remove_by_id<T: Identifiable + Clone>(collection: &[T], id: &str) -> Vec<T> {
    collection
        .iter()
        .filter(|item| item.id() != id)
        .cloned()
        .collect()
}

/// Оставить первое вхождение каждого id, порядок сохраняется
pub fn dedupe_by_id<T: Identifiable>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}

/// Коллекция в памяти; наружу отдаётся только срез для чтения.
///
/// `upserted`/`removed` считают следующее состояние, `replace` принимает
/// его после записи в хранилище.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStore<T> {
    items: Vec<T>,
}

impl<T> Default for CollectionStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identifiable + Clone> CollectionStore<T> {
    pub fn init(seed: Vec<T>) -> Self {
        Self {
            items: dedupe_by_id(seed),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn upserted(&self, record: T) -> Vec<T> {
        upsert_by_id(&self.items, record)
    }

    pub fn removed(&self, id: &str) -> Vec<T> {
        remove_by_id(&self.items, id)
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = dedupe_by_id(items);
    }
}
