//! Physical image allocation and lifetime-based aliasing
//!
//! Walks the execution order keeping a reference count per logical resource (one for
//! its write plus one per read). When a pass needs a new render target, the first
//! fully retired resource (count zero) whose image has the same format and extent
//! lends its image instead of a fresh one being allocated.

use super::{ImageDefinition, PassNode, ResourceNode};
use serde::Serialize;
use std::collections::BTreeMap;

/// A single decision taken by the allocator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AllocationEvent {
    /// A new physical image was created for `resource`
    Fresh {
        /// Pass producing the resource
        pass: String,
        /// Logical resource
        resource: String,
        /// Name of the new image
        image: String,
    },
    /// `resource` reuses the image of the retired resource `retired`
    Aliased {
        /// Pass producing the resource
        pass: String,
        /// Logical resource
        resource: String,
        /// Name of the reused image
        image: String,
        /// Retired resource that previously owned the image
        retired: String,
    },
}

impl AllocationEvent {
    /// Logical resource this event assigned
    pub fn resource(&self) -> &str {
        match self {
            AllocationEvent::Fresh { resource, .. } | AllocationEvent::Aliased { resource, .. } => resource,
        }
    }

    /// Physical image this event assigned
    pub fn image(&self) -> &str {
        match self {
            AllocationEvent::Fresh { image, .. } | AllocationEvent::Aliased { image, .. } => image,
        }
    }

    pub fn is_aliased(&self) -> bool {
        matches!(self, AllocationEvent::Aliased { .. })
    }
}

/// Result of physical image assignment
#[derive(Debug, Clone, Default)]
pub(crate) struct Allocation {
    /// Physical images by name
    pub images: BTreeMap<String, ImageDefinition>,
    /// Logical resource name to physical image name
    pub assignments: BTreeMap<String, String>,
    /// Decisions in the order they were taken
    pub events: Vec<AllocationEvent>,
}

/// Counts every write and read of each resource over the whole execution order
fn count_references<'a>(order: &[String], passes: &'a BTreeMap<String, PassNode>) -> BTreeMap<&'a str, u32> {
    let mut ref_counts = BTreeMap::new();
    for pass in order.iter().filter_map(|name| passes.get(name)) {
        for resource in pass.outputs.iter().chain(&pass.inputs) {
            *ref_counts.entry(resource.name.as_str()).or_insert(0) += 1;
        }
    }
    ref_counts
}

/// Assigns a physical image to every output resource, aliasing retired images
///
/// The candidate search is a first-fit scan in resource-name order. A resource whose
/// image gets reused has its count bumped by one, which is never discharged: from then
/// on the image is tracked through its new owner.
///
/// # Arguments
/// * `order` - Pass names in execution order
/// * `passes` - Declared passes by name
/// * `resources` - Synthesized resource nodes by name
pub(crate) fn assign_physical_images(order: &[String], passes: &BTreeMap<String, PassNode>, resources: &BTreeMap<String, ResourceNode>) -> Allocation {
    let mut allocation = Allocation::default();
    let mut ref_counts = count_references(order, passes);

    for pass in order.iter().filter_map(|name| passes.get(name)) {
        tracing::debug!("Pass: {}", pass.name);

        for output in &pass.outputs {
            let retired = ref_counts
                .iter()
                .filter(|(_, count)| **count == 0)
                .map(|(name, _)| *name)
                .find(|name| {
                    allocation
                        .assignments
                        .get(*name)
                        .and_then(|image| allocation.images.get(image))
                        .is_some_and(|image| image.format == output.format && image.extent() == pass.extent)
                });

            let event = match retired {
                Some(retired) => {
                    let image = allocation.assignments[retired].clone();
                    if let Some(count) = ref_counts.get_mut(retired) {
                        *count += 1;
                    }
                    tracing::debug!("{} aliases {} (retired {})", output.name, image, retired);
                    AllocationEvent::Aliased {
                        pass: pass.name.clone(),
                        resource: output.name.clone(),
                        image,
                        retired: retired.to_string(),
                    }
                }
                None => {
                    let image = format!("{}_img", output.name);
                    allocation.images.insert(
                        image.clone(),
                        ImageDefinition {
                            name: image.clone(),
                            format: output.format,
                            width: pass.extent.width,
                            height: pass.extent.height,
                            resizable: pass.extent.is_surface_sized(),
                        },
                    );
                    tracing::debug!("{} gets new image {}", output.name, image);
                    AllocationEvent::Fresh {
                        pass: pass.name.clone(),
                        resource: output.name.clone(),
                        image,
                    }
                }
            };

            allocation.assignments.insert(output.name.clone(), event.image().to_string());
            allocation.events.push(event);
        }

        for resource in pass.outputs.iter().chain(&pass.inputs) {
            if let Some(count) = ref_counts.get_mut(resource.name.as_str()) {
                *count = count.saturating_sub(1);
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (name, count) in &ref_counts {
                let image = allocation.assignments.get(*name).map(String::as_str).unwrap_or("-");
                tracing::debug!("{} : {}   {}", name, count, image);
            }
        }
    }

    debug_assert!(resources.keys().all(|name| allocation.assignments.contains_key(name)));
    tracing::info!("Allocated {} physical images for {} resources", allocation.images.len(), allocation.assignments.len());
    allocation
}
