//! Error types for graph construction, compilation and execution
//!
//! Every variant describes a misdeclared graph or a failing collaborator. None of them
//! can be recovered in place: the caller fixes the declaration and compiles again.

use thiserror::Error;

/// Errors raised while building, compiling or driving a frame graph
#[derive(Debug, Error)]
pub enum FrameGraphError {
    /// A pass or resource was declared with a name that is already registered
    #[error("node '{0}' is already registered")]
    DuplicateNode(String),

    /// A pass samples a resource that no pass ever writes
    #[error("pass '{pass}' reads '{resource}', which no pass writes")]
    DanglingInput {
        /// Name of the reading pass
        pass: String,
        /// Name of the missing resource
        resource: String,
    },

    /// Two passes declare the same output name
    #[error("resource '{resource}' is written by both '{first}' and '{second}'")]
    MultipleWriters {
        /// Name of the resource
        resource: String,
        /// Pass that declared the output first (in name order)
        first: String,
        /// Pass that declared it again
        second: String,
    },

    /// The pass graph contains a dependency cycle
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    Cycle {
        /// Node names on the cycle; the first name is repeated at the end
        path: Vec<String>,
    },

    /// A lookup referenced a node that does not exist in the compiled graph
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// A preset name did not match any predefined graph
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// A pass in the execution order has no renderer attached
    #[error("no renderer registered for pass '{0}'")]
    MissingRenderer(String),

    /// Frames were requested before the output surface size was known
    #[error("frame graph has not been resized yet")]
    NotResized,

    /// Reading a manifest failed
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML manifest could not be parsed
    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A JSON manifest could not be parsed or a graph could not be serialized
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The executor backend reported an error
    #[error("executor failed: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FrameGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let error = FrameGraphError::Cycle {
            path: vec!["A".to_string(), "x".to_string(), "B".to_string(), "y".to_string(), "A".to_string()],
        };
        assert_eq!(error.to_string(), "dependency cycle detected: A -> x -> B -> y -> A");
    }

    #[test]
    fn test_dangling_input_message() {
        let error = FrameGraphError::DanglingInput {
            pass: "Final".to_string(),
            resource: "C9".to_string(),
        };
        assert_eq!(error.to_string(), "pass 'Final' reads 'C9', which no pass writes");
    }
}
