//! Standalone documents for download and printing.

use chrono::{Local, NaiveDate};

/// A rendered file ready to be served as an attachment.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// `Content-Disposition` value carrying the UTF-8 filename (RFC 5987).
    pub fn content_disposition(&self) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(self.filename.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("attachment; filename*=UTF-8''{}", encoded)
    }
}

fn wrap_document(title: &str, html: &str, body_extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{}</title>
</head>
<body>
{}
{}</body>
</html>
"#,
        ammonia::clean_text(title),
        html,
        body_extra
    )
}

/// Build the download for today's date.
pub fn download_document(shop_name: &str, html: &str) -> ExportedFile {
    download_document_on(shop_name, html, Local::now().date_naive())
}

/// Build the download as of `date`.
pub fn download_document_on(shop_name: &str, html: &str, date: NaiveDate) -> ExportedFile {
    let title = format!("{} - 数据周报", shop_name);
    ExportedFile {
        filename: format!("{}_周报_{}.html", shop_name, date.format("%Y-%m-%d")),
        bytes: wrap_document(&title, html, "").into_bytes(),
    }
}

/// Document that opens the print dialog once loaded.
pub fn print_document(html: &str) -> String {
    wrap_document(
        "数据周报",
        html,
        "<script>window.onload = function () { window.print(); };</script>\n",
    )
}
