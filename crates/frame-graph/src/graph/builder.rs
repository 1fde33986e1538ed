//! Frame graph builder
//!
//! Passes are declared with [`FrameGraph::create_pass`], which hands out a [`PassId`]
//! key. Inputs, outputs and extents are attached through methods that take that key,
//! so no reference into the pass table outlives a call.

use super::{Extent, PassNode, ResourceRef, compiled::GraphCompiler};
use crate::{CompiledGraph, FrameGraphError, ImageFormat, Result};
use std::collections::HashMap;

/// Key of a pass declared on a [`FrameGraph`]
///
/// Only valid for the graph that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(usize);

/// Declarative description of a rendering pipeline
///
/// # Example
/// ```
/// use frame_graph::{FrameGraph, ImageFormat};
///
/// let mut graph = FrameGraph::new();
/// let geometry = graph.create_pass("geometryPass")?;
/// graph.output(geometry, "C1", ImageFormat::R8G8B8A8Unorm).output(geometry, "D1", ImageFormat::D32Sfloat);
///
/// let last = graph.create_pass("Final")?;
/// graph.input(last, "C1").input(last, "D1");
///
/// let compiled = graph.compile()?;
/// assert_eq!(compiled.execution_order(), ["geometryPass", "Final"]);
/// # Ok::<(), frame_graph::FrameGraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameGraph {
    /// Passes in declaration order
    passes: Vec<PassNode>,
    /// Pass name to its position in `passes`
    index: HashMap<String, PassId>,
}

impl FrameGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pass
    ///
    /// # Errors
    /// [`FrameGraphError::DuplicateNode`] if a pass with this name already exists
    pub fn create_pass(&mut self, name: impl Into<String>) -> Result<PassId> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(FrameGraphError::DuplicateNode(name));
        }

        let id = PassId(self.passes.len());
        self.passes.push(PassNode::new(name.clone()));
        self.index.insert(name, id);
        Ok(id)
    }

    /// Declares that the pass samples `resource`
    pub fn input(&mut self, pass: PassId, resource: impl Into<String>) -> &mut Self {
        self.passes[pass.0].inputs.push(ResourceRef {
            name: resource.into(),
            format: ImageFormat::Undefined,
        });
        self
    }

    /// Declares that the pass renders into `resource` with the given format
    pub fn output(&mut self, pass: PassId, resource: impl Into<String>, format: ImageFormat) -> &mut Self {
        self.passes[pass.0].outputs.push(ResourceRef { name: resource.into(), format });
        self
    }

    /// Fixes the render extent of the pass; 0×0 inherits the output surface size
    ///
    /// A single zero dimension is treated as 0×0.
    pub fn set_extent(&mut self, pass: PassId, width: u32, height: u32) -> &mut Self {
        self.passes[pass.0].extent = Extent::new(width, height);
        self
    }

    /// Returns the pass behind a key
    pub fn pass(&self, pass: PassId) -> &PassNode {
        &self.passes[pass.0]
    }

    /// Looks up the key of a pass by name
    pub fn pass_id(&self, name: &str) -> Option<PassId> {
        self.index.get(name).copied()
    }

    /// Iterates over the declared passes in declaration order
    pub fn passes(&self) -> impl Iterator<Item = &PassNode> {
        self.passes.iter()
    }

    /// Number of declared passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Compiles the declared passes
    ///
    /// Derives the resource nodes, resolves the execution order and assigns physical
    /// images. The builder itself is left untouched, so compiling again after further
    /// declarations rebuilds everything from scratch.
    ///
    /// # Errors
    /// Fails on dangling inputs, outputs written by more than one pass, output names
    /// colliding with pass names, and dependency cycles.
    pub fn compile(&self) -> Result<CompiledGraph> {
        GraphCompiler::new(self).compile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_pass_rejects_duplicates() {
        let mut graph = FrameGraph::new();
        graph.create_pass("geometryPass").unwrap();

        let err = graph.create_pass("geometryPass").unwrap_err();
        assert!(matches!(err, FrameGraphError::DuplicateNode(name) if name == "geometryPass"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_chained_declarations() {
        let mut graph = FrameGraph::new();
        let blur = graph.create_pass("HBlur1").unwrap();
        graph.set_extent(blur, 256, 256).input(blur, "C1").output(blur, "B1h", ImageFormat::R8G8B8A8Unorm);

        let pass = graph.pass(blur);
        assert_eq!(pass.name, "HBlur1");
        assert_eq!(pass.extent, Extent::new(256, 256));
        assert_eq!(pass.inputs.len(), 1);
        assert_eq!(pass.inputs[0].name, "C1");
        assert_eq!(pass.inputs[0].format, ImageFormat::Undefined);
        assert_eq!(pass.outputs[0].format, ImageFormat::R8G8B8A8Unorm);
        assert_eq!(graph.pass_id("HBlur1"), Some(blur));
        assert_eq!(graph.pass_id("VBlur1"), None);
    }

    #[test]
    fn test_partially_zero_extent_follows_the_surface() {
        let mut graph = FrameGraph::new();
        let pass = graph.create_pass("HBlur1").unwrap();
        graph.set_extent(pass, 256, 0);
        assert_eq!(graph.pass(pass).extent, Extent::default());
        assert!(graph.pass(pass).extent.is_surface_sized());
    }

    #[test]
    fn test_handles_survive_table_growth() {
        let mut graph = FrameGraph::new();
        let first = graph.create_pass("first").unwrap();
        for i in 0..64 {
            graph.create_pass(format!("pass{i}")).unwrap();
        }
        graph.output(first, "out", ImageFormat::R16Sfloat);
        assert_eq!(graph.pass(first).outputs[0].name, "out");
        assert_eq!(graph.passes().count(), 65);
    }
}
