mod config;
mod document;
mod highlight;
mod rewrite;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use tracing::debug;

use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService,
};

pub use document::DocumentStyle;

use config::default_options;
use document::wrap_document;
use highlight::{CodeHighlighter, load_syntax_set};
use rewrite::{RewriteOutcome, rewrite_ast};

/// Default Comrak-based rendering pipeline with Syntect highlighting and a
/// print stylesheet sized for the configured page.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    highlighter: CodeHighlighter,
    stylesheet: String,
}

impl ComrakRenderService {
    /// Construct a renderer with all markdown extensions enabled and syntax
    /// highlighting configured to emit `syntax-` prefixed CSS classes.
    pub fn new(style: DocumentStyle) -> Result<Self, RenderError> {
        Ok(Self {
            options: default_options(),
            highlighter: CodeHighlighter::new(load_syntax_set()?),
            stylesheet: style.stylesheet(),
        })
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        let rewrite_outcome = rewrite_stage(root, &self.highlighter)?;
        let body = render_html_stage(root, &self.options)?;
        let html = wrap_document(&body, &request.title, &self.stylesheet);

        debug!(
            target = "application::render",
            markdown_bytes = request.markdown.len(),
            html_bytes = html.len(),
            code_blocks = rewrite_outcome.code_blocks,
            "Markdown rendered"
        );

        Ok(RenderOutput {
            html,
            contains_code: rewrite_outcome.contains_code,
        })
    }
}

fn rewrite_stage<'a>(
    root: &'a AstNode<'a>,
    highlighter: &CodeHighlighter,
) -> Result<RewriteOutcome, RenderError> {
    rewrite_ast(root, highlighter)
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}
