//! mdfolio turns a long Markdown document into a PDF whose pages always
//! begin at a heading boundary.
//!
//! The document is split into heading-aligned units, spans of units are
//! probed against a typesetting engine until they overflow a page, and the
//! committed spans are concatenated into the final file.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
