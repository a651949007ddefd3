//! Экспорт видимой коллекции в CSV или PDF.
//!
//! Адаптеры не сортируют и не фильтруют: выводят ровно тот срез, что получили.

pub mod csv;
pub mod pdf;

use chrono::NaiveDate;
use thiserror::Error;

/// Trait для типов, которые могут быть экспортированы в таблицу
pub trait Exportable {
    /// Заголовки колонок
    fn headers() -> Vec<&'static str>;

    /// Скалярные поля записи в порядке `headers()`
    fn to_row(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("export buffer error: {0}")]
    Buffer(String),
}

/// `<resource>-export-<YYYY-MM-DD>.<ext>`
pub fn export_file_name(resource: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}-export-{}.{}",
        resource,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            export_file_name("units", ExportFormat::Csv, date),
            "units-export-2026-10-18.csv"
        );
        assert_eq!(
            export_file_name("properties", ExportFormat::Pdf, date),
            "properties-export-2026-10-18.pdf"
        );
    }
}
