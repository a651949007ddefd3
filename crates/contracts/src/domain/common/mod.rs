//! Common types and traits for all records

pub mod record;
pub mod record_id;
pub mod record_metadata;

// Re-exports
pub use record::{Identifiable, Record, SortValue};
pub use record_id::RecordIdSource;
pub use record_metadata::RecordMetadata;
