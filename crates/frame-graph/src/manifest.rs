//! Frame graph manifest parser
//!
//! Graphs can be described in YAML (or JSON) instead of builder calls. A manifest lists
//! the passes with their sampled inputs, their outputs and formats, and an optional
//! fixed extent:
//!
//! ```yaml
//! id: blur_chain
//! name: Blur Chain
//! passes:
//!   - name: geometryPass
//!     outputs:
//!       - { name: C1, format: R8G8B8A8_UNORM }
//!       - { name: D1, format: D32_SFLOAT }
//!   - name: HBlur1
//!     extent: [256, 256]
//!     inputs: [C1]
//!     outputs:
//!       - { name: B1h, format: R8G8B8A8_UNORM }
//!   - name: Final
//!     inputs: [B1h, C1]
//! ```

use crate::{CompiledGraph, FrameGraph, ImageFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An output declaration in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputSpec {
    /// Logical resource name
    pub name: String,
    /// Format of the render target (defaults to `UNDEFINED`)
    #[serde(default)]
    pub format: ImageFormat,
}

/// A single pass in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PassSpec {
    /// Unique pass name
    pub name: String,
    /// Names of the sampled resources
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Render targets written by the pass; empty for presentation passes
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    /// Fixed `[width, height]`; omitted to follow the output surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<[u32; 2]>,
}

/// Raw frame graph manifest as parsed from YAML or JSON
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphManifest {
    /// Unique manifest identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared passes
    pub passes: Vec<PassSpec>,
}

impl GraphManifest {
    /// Parses a manifest from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml_content)?)
    }

    /// Parses a manifest from JSON content
    pub fn from_json(json_content: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_content)?)
    }

    /// Reads and parses a manifest file
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json { Self::from_json(&content) } else { Self::from_yaml(&content) }
    }

    /// Builds a [`FrameGraph`] with the declared passes
    ///
    /// # Errors
    /// [`crate::FrameGraphError::DuplicateNode`] if two passes share a name
    pub fn to_graph(&self) -> Result<FrameGraph> {
        let mut graph = FrameGraph::new();
        for declared in &self.passes {
            let pass = graph.create_pass(declared.name.as_str())?;
            for input in &declared.inputs {
                graph.input(pass, input.as_str());
            }
            for output in &declared.outputs {
                graph.output(pass, output.name.as_str(), output.format);
            }
            if let Some([width, height]) = declared.extent {
                graph.set_extent(pass, width, height);
            }
        }
        Ok(graph)
    }

    /// Builds and compiles the declared graph
    pub fn compile(&self) -> Result<CompiledGraph> {
        let graph = self.to_graph()?;
        tracing::info!("Compiling manifest '{}' ({} passes)", self.id, graph.len());
        graph.compile()
    }

    /// Describes an existing graph as a manifest
    pub fn from_graph(id: impl Into<String>, name: impl Into<String>, graph: &FrameGraph) -> Self {
        let passes = graph
            .passes()
            .map(|pass| PassSpec {
                name: pass.name.clone(),
                inputs: pass.inputs.iter().map(|input| input.name.clone()).collect(),
                outputs: pass
                    .outputs
                    .iter()
                    .map(|output| OutputSpec {
                        name: output.name.clone(),
                        format: output.format,
                    })
                    .collect(),
                extent: (!pass.extent.is_surface_sized()).then_some([pass.extent.width, pass.extent.height]),
            })
            .collect();

        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            passes,
        }
    }
}
