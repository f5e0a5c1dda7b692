//! SG3D Core Library - Scene graph and editing session for placed 3D objects
//!
//! This library provides the transform hierarchy behind the scene editor:
//! TRS transforms, the node tree and its per-frame world-matrix propagation,
//! the camera, and the object placement session driven by the host UI.

pub mod camera;
pub mod config;
pub mod editor;
pub mod error;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use config::{CameraConfig, EditorConfig, MaterialConfig};
pub use editor::{DrawItem, SceneEditor, Shape};
pub use error::{Result, SceneError};
pub use scene::{DepthFirst, NodeId, NodeState, SceneGraph, SceneNode};
pub use transform::Transform;
