use serde::{Deserialize, Serialize};

/// Класс ошибки REST-фасада
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Хранилище бэкенда не настроено или недоступно
    Unavailable,
    NotFound,
    BadRequest,
    Internal,
}

/// Тело ответа с ошибкой: `{ "error": "...", "kind": "unavailable" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub kind: Option<ApiErrorKind>,
}

impl ApiErrorBody {
    pub fn new(kind: ApiErrorKind, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: Some(kind),
        }
    }
}
