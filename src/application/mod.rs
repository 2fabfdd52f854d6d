//! Application services: rendering, pagination, assembly and the pipelines
//! that tie them together.

pub mod assemble;
pub mod convert;
pub mod error;
pub mod pagination;
pub mod render;
pub mod typeset;
