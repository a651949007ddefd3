//! Локальное хранилище: JSON-документы под фиксированными ключами в
//! хранилище браузера (одно на origin).
//!
//! Чтение не падает (`None` значит "данных ещё нет"). Запись возвращает
//! ошибку, а показывать её или нет, решает вызывающий код.

use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    /// Переполнена квота, приватный режим и т.п.
    #[error("local storage rejected the write: {0}")]
    WriteRejected(String),
    #[error("failed to serialize value: {0}")]
    Serialize(String),
}

/// Синхронное строковое хранилище ключ-значение
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    #[cfg(target_arch = "wasm32")]
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }

    // Вне браузера хранилища нет
    #[cfg(not(target_arch = "wasm32"))]
    fn storage() -> Result<web_sys::Storage, StorageError> {
        Err(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }
}

/// Хранилище в памяти. Клоны видят одно и то же содержимое, как две
/// вкладки одного origin видят общий `localStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryStorageInner>>,
}

#[derive(Debug, Default)]
struct MemoryStorageInner {
    items: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Все записи будут отклоняться, как при полной квоте
    pub fn set_reject_writes(&self, reject: bool) {
        self.inner.borrow_mut().reject_writes = reject;
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.reject_writes {
            return Err(StorageError::WriteRejected("quota exceeded".into()));
        }
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.reject_writes {
            return Err(StorageError::WriteRejected("storage is read-only".into()));
        }
        inner.items.remove(key);
        Ok(())
    }
}

/// Прочитать и разобрать JSON под `key`.
///
/// Нет ключа, нет хранилища, битый JSON: во всех случаях `None`.
pub fn load_local_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::debug!("local store read of {} skipped: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring malformed local data under {}: {}", key, e);
            None
        }
    }
}

/// Сериализовать `value` и записать под `key`
pub fn save_local_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize(e.to_string()))?;
    store.set_item(key, &raw)
}
