use std::{ops::Range, path::PathBuf};

use tracing::{debug, info};

use crate::domain::units::{Span, Unit};

use super::{PageMeasurer, PaginationError};

/// A committed span and the PDF that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Unit indices the artifact covers, end exclusive.
    pub units: Range<usize>,
    /// Page count measured when the artifact was produced.
    pub pages: u32,
    pub path: PathBuf,
}

/// Last probe of the open span that fit on a single page.
#[derive(Debug)]
struct Candidate {
    end: usize,
    pages: u32,
    path: PathBuf,
}

/// Sequential pagination state: the open span, its best candidate and the
/// artifacts committed so far.
pub struct PaginationController<'a, M: ?Sized> {
    units: &'a [Unit],
    measurer: &'a mut M,
    commit: usize,
    candidate: Option<Candidate>,
    artifacts: Vec<OutputArtifact>,
}

impl<'a, M> PaginationController<'a, M>
where
    M: PageMeasurer + ?Sized,
{
    /// Split `units` into page-aligned artifacts, in document order.
    ///
    /// Every unit ends up in exactly one artifact. An artifact holds more than
    /// one page only when a single unit overflows on its own or when it is
    /// the final span of the document. Any measurer error aborts the run.
    pub fn paginate(
        units: &'a [Unit],
        measurer: &'a mut M,
    ) -> Result<Vec<OutputArtifact>, PaginationError> {
        let mut controller = Self {
            units,
            measurer,
            commit: 0,
            candidate: None,
            artifacts: Vec::new(),
        };

        for chunk in 0..units.len() {
            controller.probe(chunk)?;
        }

        controller.finish()
    }

    fn probe(&mut self, chunk: usize) -> Result<(), PaginationError> {
        let span = Span::new(self.units, self.commit, chunk + 1);
        let probe = self.measurer.measure(&span)?;
        let first_line = self.units[chunk].first_line();

        info!(
            target = "application::pagination",
            chunk,
            commit = self.commit,
            pages = probe.pages,
            first_line,
            "Chunk {}:{}:{}: {}",
            chunk,
            self.commit,
            probe.pages,
            first_line
        );

        if probe.pages <= 1 {
            let pages = probe.pages;
            let path = self.measurer.keep(probe, self.commit)?;
            self.candidate = Some(Candidate {
                end: chunk + 1,
                pages,
                path,
            });
            return Ok(());
        }

        match self.candidate.take() {
            Some(candidate) => {
                self.push(self.commit..candidate.end, candidate.pages, candidate.path);
                self.commit = chunk;
            }
            None if chunk == self.commit => {
                // A lone unit taller than a page is kept whole.
                let pages = probe.pages;
                let path = self.measurer.keep(probe, self.commit)?;
                self.push(chunk..chunk + 1, pages, path);
                self.commit = chunk + 1;
            }
            None => {
                // The open span started at the unit that overflowed last time
                // and was never measured alone; commit it before moving on.
                self.commit_unmeasured(chunk)?;
                self.commit = chunk;
            }
        }

        Ok(())
    }

    fn finish(mut self) -> Result<Vec<OutputArtifact>, PaginationError> {
        let end = self.units.len();
        if self.commit < end {
            match self.candidate.take() {
                Some(candidate) if candidate.end == end => {
                    self.push(self.commit..end, candidate.pages, candidate.path);
                }
                _ => self.commit_unmeasured(end)?,
            }
            self.commit = end;
        }

        Ok(self.artifacts)
    }

    /// Render `[commit, end)` once more and commit it whatever its page count.
    ///
    /// This is the only oracle call not tied to a probe index, so a run may
    /// measure more than once per unit.
    fn commit_unmeasured(&mut self, end: usize) -> Result<(), PaginationError> {
        let span = Span::new(self.units, self.commit, end);
        let probe = self.measurer.measure(&span)?;
        let pages = probe.pages;

        debug!(
            target = "application::pagination",
            commit = self.commit,
            end,
            pages,
            first_line = span.first_line(),
            "Committing span without further probing"
        );

        let path = self.measurer.keep(probe, self.commit)?;
        self.push(self.commit..end, pages, path);
        Ok(())
    }

    fn push(&mut self, units: Range<usize>, pages: u32, path: PathBuf) {
        debug!(
            target = "application::pagination",
            start = units.start,
            end = units.end,
            pages,
            path = %path.display(),
            "Span committed"
        );
        self.artifacts.push(OutputArtifact { units, pages, path });
    }
}
