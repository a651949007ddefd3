use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

static TIMESTAMP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Источник идентификаторов для новых записей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordIdSource {
    /// Случайный UUID v4
    #[default]
    Uuid,
    /// `<millis>-<counter>`, когда генератор случайных чисел недоступен
    Timestamp,
}

impl RecordIdSource {
    pub fn next_id(self, now: DateTime<Utc>) -> String {
        match self {
            RecordIdSource::Uuid => uuid::Uuid::new_v4().to_string(),
            RecordIdSource::Timestamp => {
                let seq = TIMESTAMP_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
                format!("{}-{}", now.timestamp_millis(), seq)
            }
        }
    }
}
