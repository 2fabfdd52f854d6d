use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::debug;

use crate::application::render::{RenderRequest, RenderService};
use crate::application::typeset::Typesetter;
use crate::domain::units::Span;

use super::PaginationError;

const PROBE_HTML: &str = "probe.html";
const PROBE_PDF: &str = "probe.pdf";

/// Typeset result of a single span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub pages: u32,
    /// Scratch PDF; overwritten by the next probe unless kept.
    pub artifact: PathBuf,
}

/// Page-count oracle the pagination controller probes spans with.
pub trait PageMeasurer {
    /// Typeset `span` and report how many pages it occupies.
    fn measure(&mut self, span: &Span<'_>) -> Result<Probe, PaginationError>;

    /// Store `probe` as the candidate artifact for the span opened at
    /// `commit_index`, replacing any earlier candidate for that index.
    fn keep(&mut self, probe: Probe, commit_index: usize) -> Result<PathBuf, PaginationError>;
}

/// Measures spans by rendering them to HTML and typesetting the result
/// inside a per-run workspace directory.
pub struct TypesetMeasurer<'a> {
    renderer: &'a dyn RenderService,
    typesetter: &'a dyn Typesetter,
    workspace: &'a Path,
    title: String,
}

impl<'a> TypesetMeasurer<'a> {
    pub fn new(
        renderer: &'a dyn RenderService,
        typesetter: &'a dyn Typesetter,
        workspace: &'a Path,
    ) -> Self {
        Self {
            renderer,
            typesetter,
            workspace,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl PageMeasurer for TypesetMeasurer<'_> {
    fn measure(&mut self, span: &Span<'_>) -> Result<Probe, PaginationError> {
        let started_at = Instant::now();
        let request = RenderRequest::new(span.text()).with_title(self.title.as_str());
        let output = self.renderer.render(&request)?;

        let html_path = self.workspace.join(PROBE_HTML);
        fs::write(&html_path, output.html.as_bytes()).map_err(|source| PaginationError::Io {
            path: html_path.clone(),
            source,
        })?;

        let pdf_path = self.workspace.join(PROBE_PDF);
        self.typesetter.html_to_pdf(&html_path, &pdf_path)?;
        let pages = self.typesetter.page_count(&pdf_path)?;

        let range = span.range();
        debug!(
            target = "application::pagination::measurer",
            op = "measure",
            start = range.start,
            end = range.end,
            pages,
            html_bytes = output.html.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Span measured"
        );

        Ok(Probe {
            pages,
            artifact: pdf_path,
        })
    }

    fn keep(&mut self, probe: Probe, commit_index: usize) -> Result<PathBuf, PaginationError> {
        let target = self.workspace.join(artifact_file_name(commit_index));
        fs::rename(&probe.artifact, &target).map_err(|source| PaginationError::Io {
            path: target.clone(),
            source,
        })?;
        Ok(target)
    }
}

/// `output.00042.pdf` for the span opened at unit 42.
pub(crate) fn artifact_file_name(commit_index: usize) -> String {
    format!("output.{commit_index:05}.pdf")
}
