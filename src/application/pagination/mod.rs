//! Greedy, heading-aligned pagination.
//!
//! The controller grows a span one unit at a time and asks a [`PageMeasurer`]
//! how many pages it typesets to. The last span that still fit on one page is
//! committed as soon as the next unit pushes it over, and probing restarts
//! from the overflowing unit. Commit points only move forward.

mod controller;
mod measurer;

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::application::render::RenderError;
use crate::application::typeset::TypesetError;

pub use controller::{OutputArtifact, PaginationController};
pub use measurer::{PageMeasurer, Probe, TypesetMeasurer};

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("rendering a span failed: {0}")]
    Render(#[from] RenderError),
    #[error("typesetting a span failed: {0}")]
    Typeset(#[from] TypesetError),
    #[error("workspace file {} could not be written: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
