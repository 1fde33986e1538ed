//! Compiled frame graph
//!
//! [`CompiledGraph`] is the read-only product of [`FrameGraph::compile`]: the node
//! table (passes and synthesized resources), the physical image table and the pass
//! execution order. Executors query it every frame; it never changes afterwards.

use super::{
    AllocationEvent, FrameGraph, ImageDefinition, Node, PassNode, ResourceNode,
    order::resolve_execution_order,
    physical_image::{Allocation, assign_physical_images},
    synthesize::synthesize_resources,
};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// A fully compiled frame graph ready for execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledGraph {
    /// Passes and resources by name
    nodes: BTreeMap<String, Node>,
    /// Physical images by name
    images: BTreeMap<String, ImageDefinition>,
    /// Pass names in execution order
    execution_order: Vec<String>,
    /// Allocator decisions in the order they were taken
    allocation_events: Vec<AllocationEvent>,
}

impl CompiledGraph {
    /// Physical images keyed by name
    pub fn images(&self) -> &BTreeMap<String, ImageDefinition> {
        &self.images
    }

    /// Pass and resource nodes keyed by name
    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// Pass names in dependency-respecting order
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Aliasing decisions taken during compilation
    pub fn allocation_events(&self) -> &[AllocationEvent] {
        &self.allocation_events
    }

    /// Looks up any node by name
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Looks up a pass node by name
    pub fn pass(&self, name: &str) -> Option<&PassNode> {
        self.nodes.get(name).and_then(Node::as_pass)
    }

    /// Looks up a resource node by name
    pub fn resource(&self, name: &str) -> Option<&ResourceNode> {
        self.nodes.get(name).and_then(Node::as_resource)
    }

    /// Iterates over the passes in execution order
    pub fn ordered_passes(&self) -> impl Iterator<Item = &PassNode> {
        self.execution_order.iter().filter_map(|name| self.pass(name))
    }

    /// Iterates over the synthesized resource nodes in name order
    pub fn resources(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values().filter_map(Node::as_resource)
    }

    /// Returns the physical image backing a logical resource
    pub fn image_of(&self, resource: &str) -> Option<&ImageDefinition> {
        self.resource(resource).and_then(|r| r.image.as_deref()).and_then(|image| self.images.get(image))
    }

    /// Physical image names a pass renders into, in declaration order
    ///
    /// Presentation passes yield an empty list.
    pub fn output_images(&self, pass: &str) -> Option<Vec<&str>> {
        let pass = self.pass(pass)?;
        pass.outputs.iter().map(|output| self.image_name(&output.name)).collect()
    }

    /// Physical image names a pass samples, in declaration order
    pub fn input_images(&self, pass: &str) -> Option<Vec<&str>> {
        let pass = self.pass(pass)?;
        pass.inputs.iter().map(|input| self.image_name(&input.name)).collect()
    }

    fn image_name(&self, resource: &str) -> Option<&str> {
        self.resource(resource).and_then(|r| r.image.as_deref())
    }
}

/// Runs the compilation stages over a builder's passes
pub(crate) struct GraphCompiler<'a> {
    graph: &'a FrameGraph,
}

impl<'a> GraphCompiler<'a> {
    pub(crate) fn new(graph: &'a FrameGraph) -> Self {
        Self { graph }
    }

    /// Synthesizes resources, resolves the order and assigns images
    pub(crate) fn compile(self) -> Result<CompiledGraph> {
        let passes: BTreeMap<String, PassNode> = self.graph.passes().map(|pass| (pass.name.clone(), pass.clone())).collect();

        let mut resources = synthesize_resources(&passes)?;
        let execution_order = resolve_execution_order(&passes, &resources)?;
        let Allocation { images, assignments, events } = assign_physical_images(&execution_order, &passes, &resources);

        for (name, image) in assignments {
            if let Some(resource) = resources.get_mut(&name) {
                resource.image = Some(image);
            }
        }

        let nodes = passes
            .into_iter()
            .map(|(name, pass)| (name, Node::Pass(pass)))
            .chain(resources.into_iter().map(|(name, resource)| (name, Node::Resource(resource))))
            .collect();

        Ok(CompiledGraph {
            nodes,
            images,
            execution_order,
            allocation_events: events,
        })
    }
}
