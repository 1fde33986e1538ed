//! Frame graph model and compiler
//!
//! This module turns a declarative set of passes into a [`CompiledGraph`]: resource
//! nodes are derived from pass outputs, passes are ordered so writers precede readers,
//! and logical resources are mapped onto as few physical images as the greedy
//! lifetime-based allocator can manage.

mod builder;
mod compiled;
mod node;
mod order;
mod physical_image;
mod synthesize;

pub use builder::{FrameGraph, PassId};
pub use compiled::CompiledGraph;
pub use node::*;
pub use physical_image::AllocationEvent;

#[cfg(test)]
pub(crate) use compiled::tests::assert_compiled_invariants;
