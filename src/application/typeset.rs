//! Typesetting capability: HTML to PDF, page counting and PDF concatenation.

use std::{io, path::Path, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesetError {
    #[error("{tool} is unavailable: {source}")]
    NotFound {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("{tool} failed (exit {exit_code:?}): {stderr}")]
    Tool {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("could not determine page count: {message}")]
    PageCount { message: String },
    #[error("{tool} did not produce {}", path.display())]
    MissingOutput { tool: String, path: PathBuf },
}

/// External engines the pagination and assembly stages rely on.
///
/// Implementations block until the underlying work is finished.
pub trait Typesetter {
    /// Typeset an HTML document into a PDF file, overwriting `pdf`.
    fn html_to_pdf(&self, html: &Path, pdf: &Path) -> Result<(), TypesetError>;

    /// Number of pages in a PDF; always at least one.
    fn page_count(&self, pdf: &Path) -> Result<u32, TypesetError>;

    /// Concatenate PDFs in the given order into `output`.
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), TypesetError>;
}

/// Extract the page count from `pdfinfo` output.
pub fn parse_page_count(report: &str) -> Result<u32, TypesetError> {
    let value = report
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("Pages:"))
        .ok_or_else(|| TypesetError::PageCount {
            message: "no `Pages:` line in report".to_string(),
        })?
        .trim();

    let pages = value.parse::<u32>().map_err(|err| TypesetError::PageCount {
        message: format!("invalid page count `{value}`: {err}"),
    })?;

    if pages == 0 {
        return Err(TypesetError::PageCount {
            message: "document has no pages".to_string(),
        });
    }

    Ok(pages)
}
