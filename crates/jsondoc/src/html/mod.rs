//! HTML page assembly
//!
//! The expanded template is markdown with raw HTML sections. It is converted
//! with comrak and wrapped in a standalone page: a header carrying the title
//! and a navigation sidebar built from the document's headings, then a
//! static footer.

use crate::diagnostics::{JsonDocError, JsonDocResult};
use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

const HEADER_TEMPLATE: &str = include_str!("templates/header.hbs");

const FOOTER: &str = "</main>\n</body>\n</html>\n";

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"(?s)<h([1-3])(\s[^>]*)?>(.*?)</h[1-3]>").unwrap();
    static ref ID_ATTR: Regex = Regex::new(r#"\sid="([^"]*)""#).unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Escape text for HTML element content
pub fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// One entry of the navigation sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Heading level (1-3)
    pub level: u8,
    /// Target id
    pub id: String,
    /// Heading text, already escaped
    pub text: String,
}

#[derive(Serialize)]
struct HeaderData<'a> {
    title: &'a str,
    generator: &'a str,
    nav: &'a [NavEntry],
}

/// Builds the final HTML document
pub struct PageAssembler {
    registry: Handlebars<'static>,
}

impl PageAssembler {
    /// Create an assembler with the built-in page header
    pub fn new() -> JsonDocResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string("header", HEADER_TEMPLATE)
            .map_err(|e| JsonDocError::Template(e.to_string()))?;
        Ok(Self { registry })
    }

    /// Convert markdown to an HTML fragment.
    ///
    /// Raw HTML is passed through and markdown headings get ids.
    pub fn markdown_to_html(&self, markdown: &str) -> String {
        let mut options = comrak::Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.header_ids = Some(String::new());
        options.render.unsafe_ = true;
        comrak::markdown_to_html(markdown, &options)
    }

    /// Produce the complete page for an expanded template
    pub fn assemble(&self, title: &str, markdown: &str) -> JsonDocResult<String> {
        let body = self.markdown_to_html(markdown);
        let nav = navigation(&body);
        tracing::debug!(title = %title, headings = nav.len(), "assembling page");

        let header = self
            .registry
            .render(
                "header",
                &HeaderData {
                    title,
                    generator: concat!("jsondoc ", env!("CARGO_PKG_VERSION")),
                    nav: &nav,
                },
            )
            .map_err(|e| JsonDocError::Template(e.to_string()))?;

        let mut page = String::with_capacity(header.len() + body.len() + FOOTER.len());
        page.push_str(&header);
        page.push_str(&body);
        page.push_str(FOOTER);
        Ok(page)
    }
}

/// Headings of levels 1-3 that carry an id, in document order
pub fn navigation(html: &str) -> Vec<NavEntry> {
    HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            let level = caps[1].parse().ok()?;
            let whole = caps.get(0)?.as_str();
            let id = ID_ATTR.captures(whole)?[1].to_string();
            let text = TAG.replace_all(&caps[3], "").trim().to_string();
            if id.is_empty() || text.is_empty() {
                return None;
            }
            Some(NavEntry { level, id, text })
        })
        .collect()
}
