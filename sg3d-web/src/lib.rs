//! SG3D Web - WASM facade over the scene editor
//!
//! The browser host keeps the WebGL context, shaders, primitive buffers and
//! the editing controls. It forwards user edits here and, once per animation
//! frame, reads back one model-view-projection matrix per object to draw.

use sg3d_core::{EditorConfig, SceneEditor, SceneError, Shape};
use wasm_bindgen::prelude::*;

fn to_js(err: SceneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebEditor {
    editor: SceneEditor,
    // Draw list of the last frame, in the same order as `frame()` output
    last_frame: Vec<(Shape, String)>,
}

#[wasm_bindgen]
impl WebEditor {
    /// Create an editor, optionally configured from a JSON string
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebEditor, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(to_js)?,
            None => EditorConfig::default(),
        };
        log::info!("Scene editor ready");

        Ok(WebEditor {
            editor: SceneEditor::new(&config),
            last_frame: Vec::new(),
        })
    }

    /// Place an object under the selection (or the root) and return its name
    pub fn create_object(
        &mut self,
        shape_index: u32,
        name: Option<String>,
        under_selection: bool,
    ) -> Result<String, JsValue> {
        let shape = Shape::from_index(shape_index)
            .ok_or_else(|| JsValue::from_str(&format!("unknown shape index {shape_index}")))?;
        let parent = if under_selection {
            self.editor.selected()
        } else {
            None
        };

        let id = self
            .editor
            .create_object(shape, name.as_deref(), parent)
            .map_err(to_js)?;
        Ok(self.editor.name_of(id).unwrap_or_default().to_string())
    }

    pub fn create_group(&mut self, name: &str) -> Result<(), JsValue> {
        self.editor.create_group(name, None).map_err(to_js)?;
        Ok(())
    }

    pub fn select(&mut self, name: &str) -> Result<(), JsValue> {
        self.editor.select(name).map_err(to_js)?;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), JsValue> {
        self.editor.remove_object(name).map_err(to_js)?;
        Ok(())
    }

    /// Move `name` under `parent`, or back under the root when `parent` is absent
    pub fn reparent(&mut self, name: &str, parent: Option<String>) -> Result<(), JsValue> {
        self.editor
            .reparent(name, parent.as_deref())
            .map_err(to_js)
    }

    pub fn set_translation(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        self.editor
            .set_selected_translation(x, y, z)
            .map_err(to_js)
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        self.editor.set_selected_rotation(x, y, z).map_err(to_js)
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        self.editor.set_selected_scale(x, y, z).map_err(to_js)
    }

    /// Translation, rotation and scale of the selection as 9 floats
    pub fn selected_transform(&self) -> Result<Vec<f32>, JsValue> {
        let t = self.editor.selected_transform().map_err(to_js)?;
        Ok(t.translation
            .iter()
            .chain(t.rotation.iter())
            .chain(t.scale.iter())
            .copied()
            .collect())
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.editor.camera_mut().position = nalgebra::Point3::new(x, y, z);
    }

    pub fn set_camera_target(&mut self, x: f32, y: f32, z: f32) {
        self.editor.camera_mut().target = nalgebra::Point3::new(x, y, z);
    }

    /// Update the aspect ratio after the canvas was resized
    pub fn resize(&mut self, width: u32, height: u32) {
        self.editor.camera_mut().set_aspect(width, height);
    }

    /// Propagate the scene and return 16 column-major floats per draw item
    pub fn frame(&mut self) -> Vec<f32> {
        let items = self.editor.frame();

        self.last_frame = items
            .iter()
            .map(|item| {
                let name = self.editor.name_of(item.node).unwrap_or_default();
                (item.shape, name.to_string())
            })
            .collect();

        items
            .iter()
            .flat_map(|item| item.matrix.as_slice().to_vec())
            .collect()
    }

    /// Shape index of each item of the last frame
    pub fn frame_shapes(&self) -> Vec<u32> {
        self.last_frame
            .iter()
            .map(|(shape, _)| shape.index() as u32)
            .collect()
    }

    /// Object name of each item of the last frame
    pub fn frame_names(&self) -> Vec<String> {
        self.last_frame.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Names for the object list, in tree order
    pub fn object_names(&self) -> Vec<String> {
        self.editor
            .object_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_emits_one_matrix_per_object() {
        let mut web = WebEditor::new(None).unwrap();
        web.create_object(0, None, false).unwrap();
        web.create_group("group").unwrap();
        web.select("group").unwrap();
        let ball = web.create_object(1, Some("ball".into()), true).unwrap();
        assert_eq!(ball, "ball");

        let matrices = web.frame();
        assert_eq!(matrices.len(), 2 * 16);
        assert_eq!(web.frame_shapes(), vec![0, 1]);
        assert_eq!(web.frame_names(), vec!["unnamedCube_0", "ball"]);
        assert_eq!(web.object_names(), vec!["unnamedCube_0", "group", "ball"]);
    }

    #[test]
    fn test_remove_reparent_and_camera_update_frame() {
        let mut web = WebEditor::new(None).unwrap();
        web.create_object(0, None, false).unwrap();
        web.create_object(1, Some("ball".into()), false).unwrap();
        web.create_group("group").unwrap();
        web.select("group").unwrap();
        web.create_object(2, Some("cone".into()), true).unwrap();

        web.remove("ball").unwrap();
        web.reparent("unnamedCube_0", Some("group".into())).unwrap();

        web.set_camera_position(0.0, 0.0, 10.0);
        web.set_camera_target(0.0, 0.0, 0.0);
        web.resize(1024, 1024);

        let matrices = web.frame();
        assert_eq!(matrices.len(), 2 * 16);
        assert_eq!(web.frame_names(), vec!["cone", "unnamedCube_0"]);
        assert_eq!(web.frame_shapes(), vec![2, 0]);
        assert_eq!(web.object_names(), vec!["group", "cone", "unnamedCube_0"]);

        // The cone sits at the world origin, straight ahead of the camera
        let clip = &matrices[12..16];
        assert!(clip[0].abs() < 1e-5);
        assert!(clip[1].abs() < 1e-5);
        assert!((clip[3] - 10.0).abs() < 1e-4);

        web.reparent("unnamedCube_0", None).unwrap();
        web.remove("group").unwrap();
        web.frame();
        assert_eq!(web.frame_names(), vec!["unnamedCube_0"]);
    }

    #[test]
    fn test_selected_transform_layout() {
        let mut web = WebEditor::new(None).unwrap();
        web.create_object(2, Some("cone".into()), false).unwrap();
        web.select("cone").unwrap();
        web.set_translation(1.0, 2.0, 3.0).unwrap();
        web.set_rotation(0.1, 0.2, 0.3).unwrap();
        web.set_scale(4.0, 5.0, 6.0).unwrap();

        assert_eq!(
            web.selected_transform().unwrap(),
            vec![1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 4.0, 5.0, 6.0]
        );
    }
}
