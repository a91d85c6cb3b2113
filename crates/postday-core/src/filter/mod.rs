//! Order-preserving category and search filtering.

mod pipeline;

pub use pipeline::{PostFilter, apply};
