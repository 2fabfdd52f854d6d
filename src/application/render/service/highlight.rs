use syntect::{
    dumps::from_uncompressed_data,
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::RenderError;

/// Fenced code block as found in the markdown AST.
pub(crate) struct FencedCode<'a> {
    pub(crate) language: Option<&'a str>,
    pub(crate) meta: Option<&'a str>,
    pub(crate) literal: &'a str,
}

impl<'a> FencedCode<'a> {
    /// Split a fence info string (`rust title="main.rs"`) into language and meta.
    pub(crate) fn from_info(info: &'a str, literal: &'a str) -> Self {
        let info = info.trim();
        let (language, meta) = match info.split_once(char::is_whitespace) {
            Some((language, meta)) => (language, meta.trim()),
            None => (info, ""),
        };

        Self {
            language: (!language.is_empty()).then_some(language),
            meta: (!meta.is_empty()).then_some(meta),
            literal,
        }
    }
}

/// Load the syntax definitions packed by the build script.
pub(crate) fn load_syntax_set() -> Result<SyntaxSet, RenderError> {
    let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
    from_uncompressed_data(syntax_bytes).map_err(|err| RenderError::Document {
        message: format!("syntax pack is invalid: {err}"),
    })
}

/// Classed syntect highlighting; colours come from the build-time theme stylesheet.
pub(crate) struct CodeHighlighter {
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

impl CodeHighlighter {
    pub(crate) fn new(syntax_set: SyntaxSet) -> Self {
        Self {
            syntax_set,
            class_style: ClassStyle::SpacedPrefixed { prefix: "syntax-" },
        }
    }

    pub(crate) fn highlight(&self, code: &FencedCode<'_>) -> Result<String, RenderError> {
        let lang_token = code.language.unwrap_or("text").to_ascii_lowercase();
        let syntax = self
            .find_syntax(&lang_token)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, self.class_style);

        let mut source = code.literal.to_string();
        if !source.ends_with('\n') {
            source.push('\n');
        }

        for line in LinesWithEndings::from(source.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlighting {
                    language: lang_token.clone(),
                    message: err.to_string(),
                })?;
        }

        let meta_attr = code
            .meta
            .map(|meta| format!(" data-meta=\"{}\"", ammonia::clean_text(meta)))
            .unwrap_or_default();

        Ok(format!(
            "<pre class=\"syntax-highlight syntax-lang-{lang}\" data-language=\"{lang}\"><code class=\"language-{lang} syntax-code\" data-language=\"{lang}\"{meta_attr}>{body}</code></pre>",
            lang = ammonia::clean_text(&lang_token),
            body = generator.finalize(),
        ))
    }

    fn find_syntax(&self, token: &str) -> Option<&SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}
