//! Markdown to HTML rendering.
//!
//! The pipeline is pure: it accepts markdown input and produces a complete,
//! deterministic HTML document sized for the configured page. Typesetting the
//! document and counting its pages happen elsewhere.

mod service;
mod types;

pub use service::{ComrakRenderService, DocumentStyle};
pub use types::{RenderError, RenderOutput, RenderRequest, RenderService};
