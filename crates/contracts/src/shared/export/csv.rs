//! Экспорт в CSV: разделитель запятая, первая строка заголовки,
//! кавычки по RFC 4180.

use super::{ExportError, Exportable};

/// CSV из `items`. Пустой срез даёт документ только с заголовками.
pub fn to_csv<T: Exportable>(items: &[T]) -> Result<String, ExportError> {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(Exportable::to_row).collect();
    render_csv(&headers, &rows)
}

pub fn render_csv<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> Result<String, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(b',')
        .quote_style(::csv::QuoteStyle::Necessary)
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: &'static str,
        name: &'static str,
        note: &'static str,
    }

    impl Exportable for Row {
        fn headers() -> Vec<&'static str> {
            vec!["id", "name", "note"]
        }

        fn to_row(&self) -> Vec<String> {
            vec![self.id.into(), self.name.into(), self.note.into()]
        }
    }

    #[test]
    fn test_empty_collection_is_header_only() {
        let csv = to_csv::<Row>(&[]).unwrap();
        assert_eq!(csv, "id,name,note\r\n");
    }

    #[test]
    fn test_quotes_delimiters_quotes_and_newlines() {
        let rows = [
            Row { id: "1", name: "plain", note: "" },
            Row { id: "2", name: "a,b", note: "say \"hi\"" },
            Row { id: "3", name: "two\nlines", note: "x" },
        ];
        let csv = to_csv(&rows).unwrap();
        let expected = "id,name,note\r\n\
                        1,plain,\r\n\
                        2,\"a,b\",\"say \"\"hi\"\"\"\r\n\
                        3,\"two\nlines\",x\r\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let rows = [
            Row { id: "z", name: "", note: "" },
            Row { id: "a", name: "", note: "" },
        ];
        let csv = to_csv(&rows).unwrap();
        let ids: Vec<&str> = csv.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }
}
