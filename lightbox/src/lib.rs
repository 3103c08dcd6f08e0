//! Expose the lightbox CLI internals for integration tests and the xtask
//! helper. The annotation engine itself lives in `lightbox-core`.
pub mod cli;
pub mod utils;
