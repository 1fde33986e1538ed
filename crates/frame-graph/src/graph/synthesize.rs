//! Resource node synthesis
//!
//! Turns the per-pass output and input declarations into one [`ResourceNode`] per
//! output, recording its writer and readers. The result is rebuilt from the declared
//! passes on every compilation.

use super::{PassNode, ResourceNode};
use crate::{FrameGraphError, Result};
use std::collections::BTreeMap;

/// Derives the resource nodes from the declared passes
///
/// Passes are visited in name order, so reader lists are in pass-name order.
///
/// # Errors
/// * [`FrameGraphError::DuplicateNode`] when an output shares its name with a pass
/// * [`FrameGraphError::MultipleWriters`] when two outputs share a name
/// * [`FrameGraphError::DanglingInput`] when an input names a resource nobody writes
pub(crate) fn synthesize_resources(passes: &BTreeMap<String, PassNode>) -> Result<BTreeMap<String, ResourceNode>> {
    let mut resources: BTreeMap<String, ResourceNode> = BTreeMap::new();

    for (pass_name, pass) in passes {
        for output in &pass.outputs {
            if passes.contains_key(&output.name) {
                return Err(FrameGraphError::DuplicateNode(output.name.clone()));
            }

            if let Some(existing) = resources.get(&output.name) {
                return Err(FrameGraphError::MultipleWriters {
                    resource: output.name.clone(),
                    first: existing.writer.clone(),
                    second: pass_name.clone(),
                });
            }

            resources.insert(
                output.name.clone(),
                ResourceNode {
                    name: output.name.clone(),
                    writer: pass_name.clone(),
                    readers: Vec::new(),
                    format: output.format,
                    extent: pass.extent,
                    image: None,
                },
            );
        }
    }

    for (pass_name, pass) in passes {
        for input in &pass.inputs {
            let resource = resources.get_mut(&input.name).ok_or_else(|| FrameGraphError::DanglingInput {
                pass: pass_name.clone(),
                resource: input.name.clone(),
            })?;
            resource.readers.push(pass_name.clone());
        }
    }

    Ok(resources)
}
