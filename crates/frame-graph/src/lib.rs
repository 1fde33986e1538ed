//! Frame graph compiler
//!
//! This crate lets a client describe a rendering pipeline as named passes that read
//! and write named off-screen images, and compiles that description into an execution
//! order plus a minimal-ish set of physical images. Backends consume the compiled
//! graph through the [`executor`] contract; the compiler itself never touches a GPU.

mod error;

pub mod executor;
pub mod format;
pub mod graph;
pub mod manifest;
pub mod presets;

pub use error::{FrameGraphError, Result};
pub use format::{FormatClass, ImageFormat};
pub use graph::{CompiledGraph, FrameGraph, ImageDefinition, Node, PassId};
pub use manifest::GraphManifest;

/// Compiles a YAML or JSON manifest file into a [`CompiledGraph`]
///
/// The file extension selects the parser: `.json` is read as JSON, anything else as
/// YAML.
///
/// # Arguments
/// * `path` - Path to the manifest file
pub fn compile_manifest_file<P: AsRef<std::path::Path>>(path: P) -> Result<CompiledGraph> {
    GraphManifest::from_file(path)?.compile()
}
