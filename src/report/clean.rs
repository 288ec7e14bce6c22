//! Normalisation of model output into an HTML fragment.
//!
//! The model is told to answer with a bare fragment but frequently wraps it in
//! markdown fences, returns a whole document, or answers in plain text.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    open_html_fence: Regex,
    open_fence: Regex,
    close_fence: Regex,
    any_tag: Regex,
    doctype: Regex,
    style_block: Regex,
    body: Regex,
    container: Regex,
    html_open: Regex,
    html_close: Regex,
    head_block: Regex,
    body_open: Regex,
    body_close: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid report pattern");
        Patterns {
            open_html_fence: re(r"(?i)^```html\s*"),
            open_fence: re(r"^```\s*"),
            close_fence: re(r"\s*```\s*$"),
            any_tag: re(r"<[^>]+>"),
            doctype: re(r"(?i)<!DOCTYPE html>"),
            style_block: re(r"(?is)<style[^>]*>.*?</style>"),
            body: re(r"(?is)<body[^>]*>(.*?)</body>"),
            container: re(r"(?is)<div[^>]*class[^>]*report-container[^>]*>(.*?)(?:</html>|$)"),
            html_open: re(r"(?i)<html[^>]*>"),
            html_close: re(r"(?i)</html>"),
            head_block: re(r"(?is)<head[^>]*>.*?</head>"),
            body_open: re(r"(?i)<body[^>]*>"),
            body_close: re(r"(?i)</body>"),
        }
    })
}

/// Remove a leading ```` ```html ```` or ```` ``` ```` fence and a trailing fence.
pub fn strip_code_fences(raw: &str) -> String {
    let p = patterns();
    let content = p.open_html_fence.replace(raw, "");
    let content = p.open_fence.replace(&content, "");
    let content = p.close_fence.replace(&content, "");
    content.trim().to_string()
}

pub fn contains_html(content: &str) -> bool {
    patterns().any_tag.is_match(content)
}

/// Reduce a full HTML document to its style blocks followed by the body content.
pub fn extract_document_body(document: &str) -> String {
    let p = patterns();

    let styles = p
        .style_block
        .find_iter(document)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let body = if let Some(caps) = p.body.captures(document) {
        caps[1].to_string()
    } else if let Some(caps) = p.container.captures(document) {
        format!("<div class=\"report-container\">{}</div>", &caps[1])
    } else {
        let stripped = p.doctype.replace(document, "");
        let stripped = p.html_open.replace(&stripped, "");
        let stripped = p.html_close.replace(&stripped, "");
        let stripped = p.head_block.replace(&stripped, "");
        let stripped = p.body_open.replace(&stripped, "");
        let stripped = p.body_close.replace(&stripped, "");
        stripped.trim().to_string()
    };

    format!("{}\n{}", styles, body)
}

/// Wrap plain text in report markup. Paragraphs are separated by blank lines.
pub fn text_to_html(text: &str) -> String {
    let paragraphs = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let escaped = ammonia::clean_text(p);
            if p.contains("报告") || p.contains("数据总览") || p.contains("分析") {
                format!(
                    "<h2 style=\"color: #2c3e50; margin: 25px 0 15px 0; font-size: 20px;\">{}</h2>",
                    escaped
                )
            } else {
                format!("<p style=\"margin: 15px 0; line-height: 1.6;\">{}</p>", escaped)
            }
        })
        .collect::<String>();

    format!(
        r#"<style>
.report-container {{ font-family: 'Arial', 'Microsoft YaHei', sans-serif; max-width: 1200px; margin: 0 auto; padding: 30px; background: #f8f9fa; }}
.trend-up {{ color: #27ae60; font-weight: bold; }}
.trend-down {{ color: #e74c3c; font-weight: bold; }}
</style>
<div class="report-container">{}</div>"#,
        paragraphs
    )
}

/// Turn raw model output into an unsanitized HTML fragment.
pub fn normalize_report(raw: &str) -> String {
    let content = strip_code_fences(raw);

    if !contains_html(&content) {
        tracing::debug!("Model returned plain text, converting to HTML");
        return text_to_html(&content);
    }

    if patterns().doctype.is_match(&content) {
        tracing::debug!("Model returned a full document, extracting body");
        return extract_document_body(&content);
    }

    content
}
