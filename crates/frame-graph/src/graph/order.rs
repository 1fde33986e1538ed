//! Execution order resolution
//!
//! Walks backward from every sink (a resource nobody reads, or a pass with no outputs)
//! along "consumes" edges and emits passes in depth-first post-order, so every pass
//! lands after the writers of all its inputs.
//! https://en.wikipedia.org/wiki/Topological_sorting#Depth-first_search

use super::{PassNode, ResourceNode};
use crate::{FrameGraphError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// On the current depth-first path
    Visiting,
    /// Fully visited, already emitted if it is a pass
    Done,
}

struct OrderWalk<'a> {
    passes: &'a BTreeMap<String, PassNode>,
    resources: &'a BTreeMap<String, ResourceNode>,
    states: HashMap<&'a str, VisitState>,
    order: Vec<String>,
}

impl<'a> OrderWalk<'a> {
    /// Returns the `index`-th dependency of a node: a pass depends on its inputs, a
    /// resource on its writer
    fn dependency(&self, name: &str, index: usize) -> Option<&'a str> {
        if let Some(pass) = self.passes.get(name) {
            pass.inputs.get(index).map(|input| input.name.as_str())
        } else if let Some(resource) = self.resources.get(name) {
            (index == 0).then_some(resource.writer.as_str())
        } else {
            None
        }
    }

    /// Depth-first walk from `root` with an explicit stack, so graph depth never
    /// grows the call stack
    fn visit(&mut self, root: &'a str) -> Result<()> {
        if self.states.contains_key(root) {
            return Ok(());
        }

        self.states.insert(root, VisitState::Visiting);
        let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];

        while let Some((name, next)) = stack.last_mut() {
            let name = *name;
            let dependency = self.dependency(name, *next);
            *next += 1;

            match dependency {
                Some(dependency) => match self.states.get(dependency) {
                    Some(VisitState::Done) => {}
                    Some(VisitState::Visiting) => {
                        let start = stack.iter().position(|(n, _)| *n == dependency).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                        cycle.push(dependency.to_string());
                        tracing::trace!("cycle through {:?}", cycle);
                        return Err(FrameGraphError::Cycle { path: cycle });
                    }
                    None => {
                        self.states.insert(dependency, VisitState::Visiting);
                        stack.push((dependency, 0));
                    }
                },
                None => {
                    stack.pop();
                    self.states.insert(name, VisitState::Done);
                    if self.passes.contains_key(name) {
                        self.order.push(name.to_string());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Finds the nodes nothing depends on, in name order
fn find_sinks<'a>(passes: &'a BTreeMap<String, PassNode>, resources: &'a BTreeMap<String, ResourceNode>) -> BTreeSet<&'a str> {
    let unread = resources.values().filter(|r| r.readers.is_empty()).map(|r| r.name.as_str());
    let presentation = passes.values().filter(|p| p.is_presentation()).map(|p| p.name.as_str());
    unread.chain(presentation).collect()
}

/// Computes the pass execution order
///
/// The result holds every pass exactly once, each after the writers of all its
/// inputs, and is the same for an unchanged graph.
///
/// # Errors
/// [`FrameGraphError::Cycle`] if a pass transitively consumes its own output
pub(crate) fn resolve_execution_order(passes: &BTreeMap<String, PassNode>, resources: &BTreeMap<String, ResourceNode>) -> Result<Vec<String>> {
    let mut walk = OrderWalk {
        passes,
        resources,
        states: HashMap::new(),
        order: Vec::with_capacity(passes.len()),
    };

    for sink in find_sinks(passes, resources) {
        walk.visit(sink)?;
    }

    // Only passes stuck on a cycle are unreachable from a sink
    for name in passes.keys() {
        walk.visit(name)?;
    }

    tracing::info!("Execution order: {}", walk.order.join(","));
    Ok(walk.order)
}
