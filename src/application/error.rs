use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

use crate::{
    application::{
        assemble::AssemblyError, pagination::PaginationError, render::RenderError,
    },
    config::LoadError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("pagination aborted: {0}")]
    Pagination(#[from] PaginationError),
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    /// Short machine-friendly label for the failing stage.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Infra(InfraError::Telemetry(_)) => "telemetry",
            AppError::Infra(_) => "workspace",
            AppError::Render(_) => "render",
            AppError::Pagination(_) => "pagination",
            AppError::Assembly(_) => "assembly",
            AppError::Input { .. } => "input",
            AppError::Output { .. } => "output",
        }
    }
}

/// Messages of `error` and every error in its source chain, outermost first.
pub fn error_chain(error: &dyn StdError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    messages
}
