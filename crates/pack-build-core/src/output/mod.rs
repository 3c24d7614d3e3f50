//! Bundle output handling.

pub mod writer;

pub use writer::{OutputFile, write_bundle, write_files};
