//! Экспорт в PDF: одна таблица на A4 альбомной ориентации (PDF 1.4,
//! встроенная Helvetica), заголовок и дата на каждой странице.
//!
//! Ширина колонок считается по содержимому. Ячейка, которая не влезает,
//! переносится на следующие строки; высота строки таблицы учитывается при
//! разбиении на страницы.

use chrono::NaiveDate;

use super::Exportable;

pub const DEFAULT_ROWS_PER_PAGE: usize = 30;

const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 36.0;
const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 9.0;
const CELL_SIZE: f32 = 8.0;
const LINE_STEP: f32 = 10.0;
const ROW_GAP: f32 = 4.0;
// Отступ текста внутри колонки, слева и справа вместе
const CELL_PADDING: f32 = 6.0;
const HEADER_TOP: f32 = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
const TABLE_TOP: f32 = HEADER_TOP - 43.0;

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub title: String,
    pub generated_on: NaiveDate,
    pub rows_per_page: usize,
}

impl PdfOptions {
    pub fn new(title: impl Into<String>, generated_on: NaiveDate) -> Self {
        Self {
            title: title.into(),
            generated_on,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// Таблица из `items`. Пустой срез даёт одну страницу с шапкой.
pub fn to_pdf<T: Exportable>(items: &[T], options: &PdfOptions) -> Vec<u8> {
    let headers: Vec<String> = T::headers().into_iter().map(String::from).collect();
    let rows: Vec<Vec<String>> = items.iter().map(Exportable::to_row).collect();
    render_table(&headers, &rows, options)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>], options: &PdfOptions) -> Vec<u8> {
    let layout = TableLayout::new(headers, rows);
    let pages = layout.paginate(options.rows_per_page.max(1));
    let page_count = pages.len();

    // 1 каталог, 2 дерево страниц, 3 и 4 шрифты, дальше пары (страница, поток)
    let page_obj = |i: usize| 5 + 2 * i;
    let content_obj = |i: usize| 6 + 2 * i;

    let mut doc = PdfWriter::new();
    doc.object(1, "<< /Type /Catalog /Pages 2 0 R >>");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_obj(i))).collect();
    doc.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    );
    doc.object(
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    doc.object(
        4,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (i, page_rows) in pages.iter().enumerate() {
        doc.object(
            page_obj(i),
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                content_obj(i)
            ),
        );
        let header = PageHeader {
            title: &options.title,
            generated_on: options.generated_on,
            page_no: i + 1,
            page_count,
            total_rows: rows.len(),
        };
        let content = layout.page_content(&header, page_rows);
        doc.stream(content_obj(i), &content);
    }

    doc.finish(1)
}

struct PageHeader<'a> {
    title: &'a str,
    generated_on: NaiveDate,
    page_no: usize,
    page_count: usize,
    total_rows: usize,
}

/// Раскладка таблицы, общая для всех страниц
struct TableLayout {
    widths: Vec<f32>,
    header_lines: Vec<Vec<String>>,
    /// Для каждой строки: ячейки, разбитые на строки текста
    rows: Vec<Vec<Vec<String>>>,
    /// Базовая линия первой строки данных
    body_top: f32,
    max_lines: usize,
}

impl TableLayout {
    fn new(headers: &[String], rows: &[Vec<String>]) -> Self {
        let columns = headers.len().max(1);
        let natural: Vec<f32> = (0..columns)
            .map(|c| {
                let header = headers.get(c).map(|h| text_width(h, CELL_SIZE)).unwrap_or(0.0);
                rows.iter()
                    .filter_map(|row| row.get(c))
                    .flat_map(|cell| cell.lines().map(|l| text_width(l, CELL_SIZE)))
                    .fold(header, f32::max)
                    + CELL_PADDING
            })
            .collect();
        let widths = fit_widths(&natural, PAGE_WIDTH - 2.0 * MARGIN);

        let header_lines: Vec<Vec<String>> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| wrap(h, w - CELL_PADDING))
            .collect();
        let header_height = header_lines.iter().map(Vec::len).max().unwrap_or(1) as f32;
        let body_top = TABLE_TOP - header_height * LINE_STEP - 8.0;
        let max_lines = ((body_top - MARGIN) / LINE_STEP).floor().max(1.0) as usize + 1;

        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .take(columns)
                    .zip(&widths)
                    .map(|(cell, w)| clamp_lines(wrap(cell, w - CELL_PADDING), max_lines))
                    .collect()
            })
            .collect();

        Self {
            widths,
            header_lines,
            rows,
            body_top,
            max_lines,
        }
    }

    fn row_lines(&self, index: usize) -> usize {
        self.rows[index].iter().map(Vec::len).max().unwrap_or(1).clamp(1, self.max_lines)
    }

    /// Индексы строк по страницам. Страница закрывается по `per_page`
    /// или когда следующая строка не влезает по высоте.
    fn paginate(&self, per_page: usize) -> Vec<Vec<usize>> {
        let mut pages: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut cursor = self.body_top;

        for index in 0..self.rows.len() {
            let lines = self.row_lines(index);
            let bottom = cursor - (lines - 1) as f32 * LINE_STEP;
            if !current.is_empty() && (current.len() >= per_page || bottom < MARGIN) {
                pages.push(std::mem::take(&mut current));
                cursor = self.body_top;
            }
            current.push(index);
            cursor -= lines as f32 * LINE_STEP + ROW_GAP;
        }

        if !current.is_empty() || pages.is_empty() {
            pages.push(current);
        }
        pages
    }

    fn page_content(&self, header: &PageHeader<'_>, page_rows: &[usize]) -> String {
        let mut out = String::new();

        text(&mut out, "F2", TITLE_SIZE, MARGIN, HEADER_TOP, header.title);
        text(
            &mut out,
            "F1",
            META_SIZE,
            MARGIN,
            HEADER_TOP - 17.0,
            &format!(
                "Generated {} | {} records | Page {} of {}",
                header.generated_on.format("%Y-%m-%d"),
                header.total_rows,
                header.page_no,
                header.page_count
            ),
        );

        let xs = self.column_offsets();
        for (c, lines) in self.header_lines.iter().enumerate() {
            for (l, line) in lines.iter().enumerate() {
                let y = TABLE_TOP - l as f32 * LINE_STEP;
                text(&mut out, "F2", CELL_SIZE, xs[c] + CELL_PADDING / 2.0, y, line);
            }
        }
        let rule_y = self.body_top + LINE_STEP - 2.0;
        out.push_str(&format!(
            "0.5 w {:.1} {:.1} m {:.1} {:.1} l S\n",
            MARGIN,
            rule_y,
            PAGE_WIDTH - MARGIN,
            rule_y
        ));

        let mut cursor = self.body_top;
        for &index in page_rows {
            for (c, lines) in self.rows[index].iter().enumerate() {
                for (l, line) in lines.iter().enumerate() {
                    let y = cursor - l as f32 * LINE_STEP;
                    text(&mut out, "F1", CELL_SIZE, xs[c] + CELL_PADDING / 2.0, y, line);
                }
            }
            cursor -= self.row_lines(index) as f32 * LINE_STEP + ROW_GAP;
        }

        out
    }

    fn column_offsets(&self) -> Vec<f32> {
        let mut x = MARGIN;
        self.widths
            .iter()
            .map(|w| {
                let at = x;
                x += w;
                at
            })
            .collect()
    }
}

/// Ширины колонок в пределах `available`. Если всё влезает, колонки
/// получают свою ширину плюс равную долю остатка. Иначе узкие колонки
/// остаются как есть, а место делится поровну между широкими.
fn fit_widths(natural: &[f32], available: f32) -> Vec<f32> {
    let total: f32 = natural.iter().sum();
    if total <= available {
        let extra = (available - total) / natural.len().max(1) as f32;
        return natural.iter().map(|w| w + extra).collect();
    }

    let mut widths = vec![0.0; natural.len()];
    let mut open: Vec<usize> = (0..natural.len()).collect();
    let mut left = available;
    loop {
        let share = left / open.len().max(1) as f32;
        let (fits, wide): (Vec<usize>, Vec<usize>) =
            open.iter().copied().partition(|&c| natural[c] <= share);
        if fits.is_empty() {
            for c in wide {
                widths[c] = share;
            }
            return widths;
        }
        for c in fits {
            widths[c] = natural[c];
            left -= natural[c];
        }
        open = wide;
        if open.is_empty() {
            return widths;
        }
    }
}

/// Перенос по ширине: сначала по пробелам, слишком длинные слова режутся
fn wrap(value: &str, width: f32) -> Vec<String> {
    // запас на округление: колонка по содержимому не должна переноситься
    let width = width + 0.01;
    let mut lines = Vec::new();
    for paragraph in value.split(['\r', '\n']) {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(&candidate, CELL_SIZE) <= width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            for ch in word.chars() {
                line.push(ch);
                if text_width(&line, CELL_SIZE) > width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
        lines.push(line);
    }
    if lines.len() > 1 {
        lines.retain(|l| !l.is_empty());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Строки сверх `max_lines` отбрасываются, последняя помечается ".."
fn clamp_lines(mut lines: Vec<String>, max_lines: usize) -> Vec<String> {
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str("..");
        }
    }
    lines
}

fn text_width(value: &str, size: f32) -> f32 {
    value.chars().map(glyph_width).sum::<f32>() * size
}

/// Ширина глифа Helvetica в долях кегля, с округлением вверх
fn glyph_width(ch: char) -> f32 {
    match ch {
        ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.28,
        'f' | 't' | 'r' | 'I' | '-' | '(' | ')' | '/' | '[' | ']' => 0.34,
        'm' | 'W' => 0.95,
        'w' | 'M' => 0.84,
        '@' => 1.02,
        'A'..='Z' => 0.73,
        '0'..='9' | 'a'..='z' => 0.56,
        _ => 0.67,
    }
}

fn text(out: &mut String, font: &str, size: f32, x: f32, y: f32, value: &str) {
    out.push_str(&format!(
        "BT /{} {} Tf {:.1} {:.1} Td ({}) Tj ET\n",
        font,
        size,
        x,
        y,
        escape_text(value)
    ));
}

/// Литерал PDF в кодировке WinAnsi: ASCII как есть, `\`, `(`, `)`
/// экранируются, остальное восьмеричным кодом. Символы вне WinAnsi → `?`.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            ' '..='~' => escaped.push(ch),
            _ => match win_ansi_byte(ch) {
                Some(byte) => escaped.push_str(&format!("\\{:03o}", byte)),
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{00A0}'..='\u{00FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Минимальный писатель объектов: помнит смещения для таблицы xref
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets.push((id, self.buf.len()));
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn stream(&mut self, id: usize, content: &str) {
        self.offsets.push((id, self.buf.len()));
        self.buf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                id,
                content.len(),
                content
            )
            .as_bytes(),
        );
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let size = self.offsets.len() + 1;
        let xref_at = self.buf.len();

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for (_, offset) in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, root, xref_at
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "3f2b8c1e-9a4d-4e6f-b1c2-7d8e9f0a1b2c";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn page_count(doc: &str) -> usize {
        doc.matches("/Type /Page ").count()
    }

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n).map(|i| vec![format!("id-{}", i), format!("{}", i * 100)]).collect()
    }

    fn headers() -> Vec<String> {
        vec!["id".to_string(), "price".to_string()]
    }

    fn wide_headers() -> Vec<String> {
        [
            "id",
            "unitNo",
            "projectName",
            "unitType",
            "floor",
            "areaSqft",
            "price",
            "status",
            "createdAt",
            "updatedAt",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn wide_row(project: &str) -> Vec<String> {
        vec![
            UUID.to_string(),
            "A-101".to_string(),
            project.to_string(),
            "2BHK".to_string(),
            "12".to_string(),
            "1150".to_string(),
            "8500000".to_string(),
            "available".to_string(),
            "2026-10-18T10:10:00Z".to_string(),
            "2026-10-18T10:10:00Z".to_string(),
        ]
    }

    #[test]
    fn test_empty_table_renders_single_header_page() {
        let doc = as_text(&render_table(&headers(), &[], &PdfOptions::new("Units", date())));
        assert!(doc.starts_with("%PDF-1.4"));
        assert!(doc.ends_with("%%EOF\n"));
        assert_eq!(page_count(&doc), 1);
        assert!(doc.contains("(price) Tj"));
        assert!(doc.contains("Generated 2026-10-18 | 0 records | Page 1 of 1"));
    }

    #[test]
    fn test_paginates_and_repeats_header() {
        let mut options = PdfOptions::new("Units", date());
        options.rows_per_page = 30;
        let doc = as_text(&render_table(&headers(), &rows(65), &options));
        assert_eq!(page_count(&doc), 3);
        assert!(doc.contains("/Count 3"));
        assert_eq!(doc.matches("(price) Tj").count(), 3);
        assert!(doc.contains("(id-64) Tj"));
        assert!(doc.contains("Page 3 of 3"));
    }

    #[test]
    fn test_rows_keep_input_order() {
        let doc = as_text(&render_table(&headers(), &rows(3), &PdfOptions::new("Units", date())));
        let first = doc.find("(id-0)").unwrap();
        let second = doc.find("(id-1)").unwrap();
        let third = doc.find("(id-2)").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_startxref_points_at_xref_table() {
        let bytes = render_table(&headers(), &rows(5), &PdfOptions::new("Units", date()));
        let doc = as_text(&bytes);
        let tail = doc.rsplit("startxref\n").next().unwrap();
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn test_full_ids_and_timestamps_are_printed() {
        let rows = vec![wide_row("Skyline Residency")];
        let doc = as_text(&render_table(&wide_headers(), &rows, &PdfOptions::new("Units", date())));
        assert!(doc.contains(&format!("({}) Tj", UUID)));
        assert_eq!(doc.matches("(2026-10-18T10:10:00Z) Tj").count(), 2);
        assert!(doc.contains("(Skyline Residency) Tj"));
        assert!(!doc.contains(".."));
    }

    #[test]
    fn test_accented_text_uses_win_ansi_codes() {
        let rows = vec![wide_row("Résidence Océan")];
        let doc = as_text(&render_table(&wide_headers(), &rows, &PdfOptions::new("Units", date())));
        assert!(doc.contains("(R\\351sidence Oc\\351an) Tj"));
        assert!(!doc.contains("R?sidence"));
    }

    #[test]
    fn test_escapes_and_replaces_unmapped_characters() {
        assert_eq!(escape_text("a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(escape_text("é"), "\\351");
        assert_eq!(escape_text("€5"), "\\2005");
        assert_eq!(escape_text("₹100"), "?100");
    }

    #[test]
    fn test_long_cells_wrap_without_losing_text() {
        let long = "Sea-view apartment with private terrace and two covered parking slots near the promenade";
        let mut cells: Vec<Vec<String>> = vec![vec![long.to_string(), "x".to_string()]];
        cells[0].extend((0..10).map(|i| format!("column value {}", i)));
        let heads: Vec<String> = (0..12).map(|i| format!("h{}", i)).collect();

        let layout = TableLayout::new(&heads, &cells);
        let lines = &layout.rows[0][0];
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), long);
        assert!(layout.widths.iter().sum::<f32>() <= PAGE_WIDTH - 2.0 * MARGIN + 0.01);
    }

    #[test]
    fn test_tall_rows_move_to_next_page() {
        let tall = vec!["word ".repeat(1000), "1".to_string()];
        let heads = headers();
        let layout = TableLayout::new(&heads, &[tall.clone(), tall.clone(), tall]);
        assert!(layout.row_lines(0) > 20);

        let pages = layout.paginate(DEFAULT_ROWS_PER_PAGE);
        assert_eq!(pages, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_narrow_columns_keep_their_width() {
        let widths = fit_widths(&[20.0, 500.0, 500.0], 620.0);
        assert_eq!(widths[0], 20.0);
        assert_eq!(widths[1], 300.0);
        assert_eq!(widths[2], 300.0);

        let roomy = fit_widths(&[20.0, 40.0], 100.0);
        assert_eq!(roomy, vec![40.0, 60.0]);
    }
}
