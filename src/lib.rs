//! protoc-gen-template library
//!
//! This crate provides the semantic resolution core for template-driven
//! code generation from Protocol Buffer definitions: wire-format tags,
//! cross-file type name resolution, map-entry and oneof classification,
//! and the model objects handed to an external template renderer.
//!
//! Schema parsing and template interpolation are external collaborators.
//! The parser side produces the descriptor graph (see [`graph`] and the
//! [`descriptor`] bridge); the rendering side implements the
//! [`model::Renderer`] trait and consumes the models this crate builds.

#![deny(warnings)]
#![deny(missing_docs)]

pub mod descriptor;
pub mod graph;
pub mod indent;
pub mod model;
pub mod options;
pub mod resolve;

use thiserror::Error;

pub use model::{CodeFile, Generator, Renderer};

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Invalid plugin configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A field number outside the valid positive range
    #[error("Invalid field number {0}: field numbers must be positive")]
    InvalidFieldNumber(i32),

    /// The descriptor graph violates a structural invariant
    #[error("Malformed descriptor graph: {0}")]
    MalformedGraph(String),

    /// Encountered an unknown or unsupported field type
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    /// The external renderer failed while producing output
    #[error("Rendering {unit} (from {file}) failed: {message}")]
    Render {
        /// Source file the failing unit belongs to
        file: String,
        /// Identity of the unit being rendered (file, type, or enum)
        unit: String,
        /// Error text reported by the renderer
        message: String,
    },

    /// Failed to decode a serialized descriptor set
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// Run a full generation pass over a descriptor graph
///
/// This is the main entry point: it renders one output per qualifying file
/// plus one per configured global template. Any failure aborts the whole
/// pass; partial output is never returned.
pub fn generate(
    set: &graph::FileSet,
    renderer: &dyn Renderer,
    config: &options::Config,
) -> Result<Vec<CodeFile>, GeneratorError> {
    Generator::new(set, renderer, config).run()
}
