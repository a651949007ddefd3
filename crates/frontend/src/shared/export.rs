/// Выгрузка видимого списка в CSV/PDF и скачивание файла браузером
use contracts::shared::export::csv::to_csv;
use contracts::shared::export::pdf::{to_pdf, PdfOptions};
use contracts::shared::export::{export_file_name, ExportFormat, Exportable};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::shared::date_utils::today;

/// Собирает документ из `items` (в том порядке, в котором их видит
/// пользователь) и скачивает как `<resource>-export-<date>.<ext>`.
/// Возвращает имя файла.
pub fn export_items<T: Exportable>(
    items: &[T],
    resource: &str,
    title: &str,
    format: ExportFormat,
) -> Result<String, String> {
    let date = today();
    let filename = export_file_name(resource, format, date);

    let bytes = match format {
        ExportFormat::Csv => to_csv(items).map_err(|e| e.to_string())?.into_bytes(),
        ExportFormat::Pdf => to_pdf(items, &PdfOptions::new(title, date)),
    };

    let blob = create_blob(&bytes, format.mime_type())?;
    download_blob(&blob, &filename)?;
    log::info!("exported {} rows to {}", items.len(), filename);
    Ok(filename)
}

/// Создает Blob из байтов документа
fn create_blob(bytes: &[u8], mime_type: &str) -> Result<Blob, String> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));

    let properties = BlobPropertyBag::new();
    properties.set_type(mime_type);

    Blob::new_with_u8_array_sequence_and_options(&parts, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

/// Инициирует скачивание Blob через временную ссылку
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;
    let body = document.body().ok_or("No body element")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .set_attribute("style", "display: none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}
