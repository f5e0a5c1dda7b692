//! Editor configuration loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Initial camera placement and projection parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [4.0, 3.5, 10.0],
            target: [0.0, 3.5, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_degrees: 60.0,
            near: 1.0,
            far: 200.0,
        }
    }
}

/// Color uniforms attached to every draw item: `color * mult + offset`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    pub color_mult: [f32; 4],
    pub color_offset: [f32; 4],
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color_mult: [0.4, 0.4, 0.4, 1.0],
            color_offset: [0.0, 0.0, 0.6, 0.0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub camera: CameraConfig,
    pub material: MaterialConfig,
}

impl EditorConfig {
    /// Parse a config; missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            EditorConfig::from_json(r#"{ "camera": { "fov_degrees": 45.0, "far": 500.0 } }"#)
                .unwrap();
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.far, 500.0);
        assert_eq!(config.camera.position, [4.0, 3.5, 10.0]);
        assert_eq!(config.material, MaterialConfig::default());
    }

    #[test]
    fn test_to_json_parses_back() {
        let mut config = EditorConfig::default();
        config.material.color_offset = [0.5, 0.0, 0.0, 0.0];
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let err = EditorConfig::from_json("{ camera: ").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EditorConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
