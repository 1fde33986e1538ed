//! Predefined frame graphs
//!
//! Small pipelines that exercise the compiler end to end and serve as starting points
//! for real renderers.

use crate::{FrameGraph, ImageFormat, Result};

/// Predefined pipeline layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Geometry pass, separable 256×256 blur and a composite to the surface
    BlurChain,
    /// Geometry pass whose color and depth are sampled by a presentation pass
    GeometryFinal,
    /// A single pass drawing straight to the surface
    PresentOnly,
}

impl Preset {
    /// Returns every preset
    pub fn all() -> &'static [Preset] {
        &[Preset::BlurChain, Preset::GeometryFinal, Preset::PresentOnly]
    }

    /// Returns the identifier of this preset
    pub fn name(&self) -> &'static str {
        match self {
            Preset::BlurChain => "blur_chain",
            Preset::GeometryFinal => "geometry_final",
            Preset::PresentOnly => "present_only",
        }
    }

    /// Declares the passes of this preset on a fresh graph
    pub fn build(&self) -> Result<FrameGraph> {
        let mut graph = FrameGraph::new();
        match self {
            Preset::BlurChain => {
                let geometry = graph.create_pass("geometryPass")?;
                graph.output(geometry, "C1", ImageFormat::R8G8B8A8Unorm).output(geometry, "D1", ImageFormat::D32Sfloat);

                let horizontal = graph.create_pass("HBlur1")?;
                graph.set_extent(horizontal, 256, 256).input(horizontal, "C1").output(horizontal, "B1h", ImageFormat::R8G8B8A8Unorm);

                let vertical = graph.create_pass("VBlur1")?;
                graph.set_extent(vertical, 256, 256).input(vertical, "B1h").output(vertical, "B1v", ImageFormat::R8G8B8A8Unorm);

                let last = graph.create_pass("Final")?;
                graph.input(last, "B1v").input(last, "C1");
            }
            Preset::GeometryFinal => {
                let geometry = graph.create_pass("geometryPass")?;
                graph.output(geometry, "C1", ImageFormat::R8G8B8A8Unorm).output(geometry, "D1", ImageFormat::D32Sfloat);

                let last = graph.create_pass("Final")?;
                graph.input(last, "C1").input(last, "D1");
            }
            Preset::PresentOnly => {
                graph.create_pass("geometryPass")?;
            }
        }
        Ok(graph)
    }
}

impl std::str::FromStr for Preset {
    type Err = crate::FrameGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::all()
            .iter()
            .copied()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::FrameGraphError::UnknownPreset(s.to_string()))
    }
}
