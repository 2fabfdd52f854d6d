use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};

use crate::application::render::types::RenderError;

use super::highlight::{CodeHighlighter, FencedCode};

#[derive(Debug, Default)]
pub(crate) struct RewriteOutcome {
    pub(crate) contains_code: bool,
    pub(crate) code_blocks: usize,
}

/// Replace every fenced or indented code block with pre-highlighted HTML.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    highlighter: &CodeHighlighter,
) -> Result<RewriteOutcome, RenderError> {
    let mut outcome = RewriteOutcome::default();
    visit_nodes(root, highlighter, &mut outcome)?;
    Ok(outcome)
}

fn visit_nodes(
    node: &AstNode<'_>,
    highlighter: &CodeHighlighter,
    outcome: &mut RewriteOutcome,
) -> Result<(), RenderError> {
    if let Some((info, literal)) = extract_code_block(node) {
        let code = FencedCode::from_info(&info, &literal);
        let html = highlighter.highlight(&code)?;

        outcome.contains_code = true;
        outcome.code_blocks += 1;

        let mut data = node.data.borrow_mut();
        data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: html,
        });
    }

    let mut child = node.first_child();
    while let Some(next) = child {
        visit_nodes(next, highlighter, outcome)?;
        child = next.next_sibling();
    }

    Ok(())
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}
