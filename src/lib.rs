//! clearnlp-convert: Penn Treebank to dependency conversion via ClearNLP
//!
//! A thin adapter around the ClearNLP `C2DConvert` command-line converter.
//! Trees go out as a request file, the converter runs as a Java subprocess,
//! and its `.dep` output comes back as text or as typed dependency trees.
//! Rust API with optional Python bindings.

pub mod config; // Converter settings and bundled resource defaults
pub mod converter; // Conversion pipeline
pub mod depfile; // Converter output parsing
pub mod error;
pub mod failure; // Exit code / stderr classification
pub mod process; // Invocation building and process runners
pub mod ptb; // Bracketed tree validation
pub mod scratch; // Per-call request files
pub mod tree; // Dependency tree data structures

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use config::{ConverterConfig, default_resource_dir};
pub use converter::{Conversion, Converter, validate_trees};
pub use depfile::{DepParseError, DepReader, parse_block, parse_output, split_blocks};
pub use error::ConvertError;
pub use failure::{FailureKind, classify, classify_failure};
pub use process::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
pub use tree::{DepNode, DepTree, NodeId};
