//! Node and image definitions shared by the builder, the compiler passes and the
//! compiled graph

use crate::format::ImageFormat;
use serde::Serialize;

/// Width and height of a render target in pixels
///
/// A 0×0 extent means "track the output surface size". [`Extent::new`] folds a
/// single zero dimension into 0×0, since half a surface size cannot be resolved.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    /// Creates a new extent, normalizing a partially zero size to 0×0
    pub fn new(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 { Self::default() } else { Self { width, height } }
    }

    /// Returns true when the extent follows the output surface size
    pub fn is_surface_sized(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Resolves the extent against the live surface size
    pub fn resolve(&self, surface: Extent) -> Extent {
        if self.is_surface_sized() { surface } else { *self }
    }
}

/// A named reference to a logical resource, as declared on a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    /// Logical resource name
    pub name: String,
    /// Declared format; inputs carry `Undefined`
    pub format: ImageFormat,
}

/// A declared unit of rendering work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassNode {
    /// Unique pass name
    pub name: String,
    /// Resources sampled by this pass, in declaration order
    pub inputs: Vec<ResourceRef>,
    /// Resources rendered into by this pass, in declaration order
    pub outputs: Vec<ResourceRef>,
    /// Fixed extent, or 0×0 to inherit the output surface size
    pub extent: Extent,
}

impl PassNode {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            extent: Extent::default(),
        }
    }

    /// A pass without outputs renders to an external target such as the swapchain
    pub fn is_presentation(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// A logical resource derived from pass declarations during compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    /// Resource name, equal to the output name it was derived from
    pub name: String,
    /// The single pass producing this resource
    pub writer: String,
    /// Passes sampling this resource, in pass-name order
    pub readers: Vec<String>,
    /// Format declared by the writer
    pub format: ImageFormat,
    /// Extent of the writing pass
    pub extent: Extent,
    /// Physical image backing this resource, assigned by the allocator
    pub image: Option<String>,
}

/// Discriminant of [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Pass,
    Resource,
}

/// An entry of the compiled node table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    Pass(PassNode),
    Resource(ResourceNode),
}

impl Node {
    /// Returns the node name
    pub fn name(&self) -> &str {
        match self {
            Node::Pass(pass) => &pass.name,
            Node::Resource(resource) => &resource.name,
        }
    }

    /// Returns which kind of node this is
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Pass(_) => NodeKind::Pass,
            Node::Resource(_) => NodeKind::Resource,
        }
    }

    pub fn as_pass(&self) -> Option<&PassNode> {
        match self {
            Node::Pass(pass) => Some(pass),
            Node::Resource(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceNode> {
        match self {
            Node::Pass(_) => None,
            Node::Resource(resource) => Some(resource),
        }
    }
}

/// A physical image that one or more logical resources are rendered into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDefinition {
    /// Pool key, `<first resource>_img`
    pub name: String,
    /// Pixel format
    pub format: ImageFormat,
    /// Width in pixels, 0 when tracking the surface
    pub width: u32,
    /// Height in pixels, 0 when tracking the surface
    pub height: u32,
    /// True when the image follows the output surface size
    pub resizable: bool,
}

impl ImageDefinition {
    /// Returns the declared extent
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}
