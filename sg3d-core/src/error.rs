//! Error types for scene editing.

use thiserror::Error;

use crate::scene::NodeId;

/// Errors raised by the scene graph and the editor session.
///
/// Structural variants are contract violations by the caller: the graph is
/// left unchanged when one of them is returned.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Handle does not name a live node (never created or already removed)
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The designated root cannot be given a parent
    #[error("the scene root cannot be attached to another node")]
    RootAttachment,

    /// The designated root cannot be deleted
    #[error("the scene root cannot be removed")]
    RootRemoval,

    /// Attaching would make a node its own ancestor
    #[error("attaching {node:?} under {parent:?} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },

    /// Grouping nodes have no transform to edit
    #[error("node {0:?} has no transform")]
    MissingTransform(NodeId),

    #[error("an object named '{0}' already exists")]
    DuplicateName(String),

    #[error("no object named '{0}'")]
    UnknownName(String),

    #[error("no object is selected")]
    NoSelection,

    /// Editor configuration could not be parsed or serialized
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the scene's error type.
pub type Result<T> = std::result::Result<T, SceneError>;
