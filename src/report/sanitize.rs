//! Allow-list sanitizer for generated report HTML.

use std::collections::HashSet;

const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "div", "span", "table", "thead", "tbody", "tr",
    "th", "td", "ul", "ol", "li", "strong", "b", "em", "i", "u", "style",
];

const ALLOWED_ATTRIBUTES: &[&str] = &["class", "style", "id"];

/// Strip everything outside the report allow-list.
///
/// Disallowed tags are unwrapped, keeping their text, except `<script>` whose
/// content is dropped along with the tag.
pub fn sanitize_report_html(html: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS.iter().copied().collect();
    let attributes: HashSet<&str> = ALLOWED_ATTRIBUTES.iter().copied().collect();
    let clean_content: HashSet<&str> = ["script"].into_iter().collect();

    ammonia::Builder::empty()
        .tags(tags)
        .generic_attributes(attributes)
        .clean_content_tags(clean_content)
        .strip_comments(true)
        .clean(html)
        .to_string()
}
