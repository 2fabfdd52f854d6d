//! Standalone HTML document shell wrapped around each rendered fragment.

use crate::config::RenderSettings;

const BASE_STYLESHEET: &str = include_str!("../../../../assets/document.css");
const THEME_STYLESHEET: &str = include_str!(env!("SYNTAX_THEME_CSS_FILE"));

/// Page geometry and colour palette applied to every rendered document.
///
/// Lengths are CSS lengths and are copied verbatim into the stylesheet; the
/// typesetting engine is what turns `page_height` into a physical page break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStyle {
    pub page_width: String,
    pub page_height: String,
    pub margin: String,
    pub accent: String,
    pub text: String,
    pub text_dimmed: String,
    pub page_background: String,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            page_width: Self::DEFAULT_PAGE_WIDTH.to_string(),
            page_height: Self::DEFAULT_PAGE_HEIGHT.to_string(),
            margin: Self::DEFAULT_PAGE_MARGIN.to_string(),
            accent: Self::DEFAULT_ACCENT.to_string(),
            text: Self::DEFAULT_TEXT.to_string(),
            text_dimmed: Self::DEFAULT_TEXT_DIMMED.to_string(),
            page_background: Self::DEFAULT_PAGE_BACKGROUND.to_string(),
        }
    }
}

impl From<&RenderSettings> for DocumentStyle {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            page_width: settings.page_width.clone(),
            page_height: settings.page_height.clone(),
            margin: settings.margin.clone(),
            accent: settings.accent.clone(),
            text: settings.text.clone(),
            text_dimmed: settings.text_dimmed.clone(),
            page_background: settings.page_background.clone(),
        }
    }
}

impl DocumentStyle {
    /// A4 portrait.
    pub const DEFAULT_PAGE_WIDTH: &'static str = "210mm";
    pub const DEFAULT_PAGE_HEIGHT: &'static str = "297mm";
    pub const DEFAULT_PAGE_MARGIN: &'static str = "10mm";
    pub const DEFAULT_ACCENT: &'static str = "#0969da";
    pub const DEFAULT_TEXT: &'static str = "#171515";
    pub const DEFAULT_TEXT_DIMMED: &'static str = "#24292f";
    pub const DEFAULT_PAGE_BACKGROUND: &'static str = "#ffffff";

    pub(crate) fn stylesheet(&self) -> String {
        let Self {
            page_width,
            page_height,
            margin,
            accent,
            text,
            text_dimmed,
            page_background,
        } = self;

        let mut css = String::with_capacity(BASE_STYLESHEET.len() + THEME_STYLESHEET.len() + 512);
        css.push_str(&format!(
            ":root {{\n  --accent: {accent};\n  --text: {text};\n  --text-dimmed: {text_dimmed};\n  --padding: {margin};\n  --page-background: {page_background};\n  --body-background: #f6f8fa;\n}}\n"
        ));
        css.push_str(&format!(
            "@page {{\n  size: {page_width} {page_height};\n  margin: {margin};\n  background-color: var(--page-background);\n}}\n"
        ));
        css.push_str(BASE_STYLESHEET.trim_end());
        css.push('\n');
        css.push_str(THEME_STYLESHEET.trim_end());
        css.push('\n');
        css
    }
}

/// Wrap an HTML fragment into a complete document with title and stylesheet.
pub(crate) fn wrap_document(body: &str, title: &str, stylesheet: &str) -> String {
    let mut html = String::with_capacity(body.len() + stylesheet.len() + 256);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>");
    html.push_str(&escape_text(title));
    html.push_str("</title>\n");
    html.push_str("<meta content=\"width=device-width, initial-scale=1\" name=\"viewport\">\n");
    html.push_str("<style>\n");
    html.push_str(stylesheet);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_fixes_page_size() {
        let style = DocumentStyle {
            page_height: "148mm".to_string(),
            ..DocumentStyle::default()
        };
        let css = style.stylesheet();
        assert!(css.contains("size: 210mm 148mm;"), "page size missing: {css}");
        assert!(css.contains("--accent: #0969da;"));
        assert!(css.contains(".syntax-"), "theme css missing");
    }

    #[test]
    fn document_shell_escapes_title() {
        let html = wrap_document("<p>hi</p>", "Tom & <Jerry>", "body{}");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Tom &amp; &lt;Jerry&gt;</title>"));
        assert!(html.contains("<body>\n<p>hi</p>\n</body>"));
    }
}
