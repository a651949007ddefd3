//! Клиент только для чтения коллекций с сервера (`GET /api/<resource>`).
//!
//! Ошибки классифицируются здесь, на границе, и загрузчик решает про
//! демо-данные по типу ошибки, а не по тексту сообщения.

use async_trait::async_trait;
use contracts::domain::common::Record;
use contracts::shared::api_error::{ApiErrorBody, ApiErrorKind};
use gloo_net::http::Request;
use std::marker::PhantomData;
use thiserror::Error;

use crate::shared::api_utils::{api_base, api_url};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}: {message}")]
    Server { status: u16, message: String },
    /// Бэкенд отвечает, но его хранилище недоступно (БД упала или не создана)
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("remote endpoint is not configured")]
    NotConfigured,
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Демо-данные подставляются только когда серверу нечего отдать.
    /// Настоящие ошибки сервера и сети показываются пользователю.
    pub fn allows_demo_fallback(&self) -> bool {
        matches!(self, FetchError::Unavailable(_) | FetchError::NotConfigured)
    }

    /// Классификация ответа не из 2xx
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
        let message = match &parsed {
            Some(b) if !b.error.trim().is_empty() => b.error.clone(),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => format!("HTTP {}", status),
        };

        let unavailable = match parsed.as_ref().and_then(|b| b.kind) {
            Some(kind) => kind == ApiErrorKind::Unavailable,
            None => status == 503 || mentions_backend_storage(&message),
        };

        if unavailable {
            FetchError::Unavailable(message)
        } else {
            FetchError::Server { status, message }
        }
    }
}

/// Старые серверы присылают текст ошибки без `kind`. Если в нём речь о базе
/// или соединении с ней, считаем бэкенд недоступным.
pub fn mentions_backend_storage(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("database") || lower.contains("connection")
}

/// Источник всей коллекции целиком
#[async_trait(?Send)]
pub trait RemoteCollection<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, FetchError>;
}

/// `GET {api_base}/api/<resource>` over `gloo-net`
#[derive(Debug, Clone)]
pub struct HttpCollection<T> {
    base: Option<String>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> HttpCollection<T> {
    /// Базовый URL из текущего адреса окна
    pub fn new() -> Self {
        Self::with_base(api_base())
    }

    pub fn with_base(base: Option<String>) -> Self {
        Self {
            base: base.filter(|b| !b.trim().is_empty()),
            _record: PhantomData,
        }
    }

    pub fn url(&self) -> Option<String> {
        self.base
            .as_deref()
            .map(|base| api_url(base, &T::collection().api_path()))
    }
}

impl<T: Record> Default for HttpCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl<T: Record> RemoteCollection<T> for HttpCollection<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, FetchError> {
        let url = self.url().ok_or(FetchError::NotConfigured)?;
        log::debug!("fetching {}", url);

        let response = Request::get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_response(status, &body));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}
