//! Interactive object placement on top of the scene graph.
//!
//! A [`SceneEditor`] owns one [`SceneGraph`] whose root holds every placed
//! object, directly or through groups. Objects are addressed by unique
//! names, the way the object list in the browser host shows them. Each call
//! to [`SceneEditor::frame`] runs one propagation pass and returns the draw
//! list for the renderer.

use std::collections::HashMap;

use log::{debug, info};
use nalgebra::Matrix4;
use slotmap::SecondaryMap;

use crate::camera::Camera;
use crate::config::{EditorConfig, MaterialConfig};
use crate::error::{Result, SceneError};
use crate::scene::{NodeId, SceneGraph};
use crate::transform::{mvp_matrix, Transform};

/// Primitive drawn for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    Sphere,
    Cone,
    /// User-supplied model geometry
    Model,
}

impl Shape {
    pub const COUNT: usize = 4;
    pub const ALL: [Shape; Shape::COUNT] =
        [Shape::Cube, Shape::Sphere, Shape::Cone, Shape::Model];

    /// Map the host's shape selector value to a shape.
    pub fn from_index(index: u32) -> Option<Shape> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Prefix used to name objects created without a name
    pub fn name_prefix(self) -> &'static str {
        match self {
            Shape::Cube => "unnamedCube_",
            Shape::Sphere => "unnamedSphere_",
            Shape::Cone => "unnamedCone_",
            Shape::Model => "unnamedModel_",
        }
    }
}

/// One draw call worth of data.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub shape: Shape,
    /// View-projection times the node's world matrix
    pub matrix: Matrix4<f32>,
    pub color_mult: [f32; 4],
    pub color_offset: [f32; 4],
}

pub struct SceneEditor {
    graph: SceneGraph,
    camera: Camera,
    material: MaterialConfig,
    names: HashMap<String, NodeId>,
    shapes: SecondaryMap<NodeId, Shape>,
    counters: [u32; Shape::COUNT],
    selected: Option<NodeId>,
}

impl SceneEditor {
    pub fn new(config: &EditorConfig) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let root_name = graph
            .get(root)
            .and_then(|node| node.name())
            .unwrap_or("root")
            .to_string();

        let mut names = HashMap::new();
        names.insert(root_name, root);

        Self {
            graph,
            camera: Camera::from_config(&config.camera),
            material: config.material.clone(),
            names,
            shapes: SecondaryMap::new(),
            counters: [0; Shape::COUNT],
            selected: None,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    /// Place a new object with a default transform.
    ///
    /// The object goes under `parent`, or under the root when `parent` is
    /// `None`. An empty or missing name is replaced by the shape's prefix and
    /// a per-shape counter; the counter advances on every creation.
    pub fn create_object(
        &mut self,
        shape: Shape,
        name: Option<&str>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let name = match name.filter(|name| !name.is_empty()) {
            Some(name) => {
                self.ensure_free(name)?;
                name.to_string()
            }
            None => self.generate_name(shape),
        };

        let parent = parent.unwrap_or(self.graph.root());
        let id = self.graph.spawn(parent, Some(Transform::new()))?;
        self.graph.set_name(id, name.as_str())?;
        self.counters[shape.index()] += 1;
        self.shapes.insert(id, shape);
        self.names.insert(name.clone(), id);

        info!("Created {:?} '{}'", shape, name);
        Ok(id)
    }

    /// Add a transform-less grouping node.
    pub fn create_group(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId> {
        self.ensure_free(name)?;
        let parent = parent.unwrap_or(self.graph.root());
        let id = self.graph.spawn(parent, None)?;
        self.graph.set_name(id, name)?;
        self.names.insert(name.to_string(), id);

        debug!("Created group '{}'", name);
        Ok(id)
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(SceneError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn generate_name(&self, shape: Shape) -> String {
        let mut counter = self.counters[shape.index()];
        loop {
            let name = format!("{}{}", shape.name_prefix(), counter);
            if !self.names.contains_key(&name) {
                return name;
            }
            counter += 1;
        }
    }

    pub fn find(&self, name: &str) -> Result<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownName(name.to_string()))
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.graph.get(id).and_then(|node| node.name())
    }

    pub fn shape_of(&self, id: NodeId) -> Option<Shape> {
        self.shapes.get(id).copied()
    }

    /// Object and group names reachable from the root, in draw order.
    pub fn object_names(&self) -> Vec<&str> {
        let root = self.graph.root();
        self.graph
            .iter_depth_first()
            .filter(|&id| id != root)
            .filter_map(|id| self.name_of(id))
            .collect()
    }

    pub fn select(&mut self, name: &str) -> Result<NodeId> {
        let id = self.find(name)?;
        self.selected = Some(id);
        debug!("Selected '{}'", name);
        Ok(id)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Current transform of the selection, for syncing editing controls.
    pub fn selected_transform(&self) -> Result<Transform> {
        let id = self.selected.ok_or(SceneError::NoSelection)?;
        self.graph
            .get(id)
            .and_then(|node| node.transform())
            .copied()
            .ok_or(SceneError::MissingTransform(id))
    }

    /// Apply an edit to the selected object's transform.
    pub fn edit_selected<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Transform),
    {
        let id = self.selected.ok_or(SceneError::NoSelection)?;
        edit(self.graph.transform_mut(id)?);
        Ok(())
    }

    pub fn set_selected_translation(&mut self, x: f32, y: f32, z: f32) -> Result<()> {
        self.edit_selected(|t| t.set_translation(x, y, z))
    }

    pub fn set_selected_rotation(&mut self, x: f32, y: f32, z: f32) -> Result<()> {
        self.edit_selected(|t| t.set_rotation(x, y, z))
    }

    pub fn set_selected_scale(&mut self, x: f32, y: f32, z: f32) -> Result<()> {
        self.edit_selected(|t| t.set_scale(x, y, z))
    }

    pub fn transform_mut(&mut self, name: &str) -> Result<&mut Transform> {
        let id = self.find(name)?;
        self.graph.transform_mut(id)
    }

    /// Move an object under another one; `None` moves it back under the root.
    pub fn reparent(&mut self, name: &str, new_parent: Option<&str>) -> Result<()> {
        let id = self.find(name)?;
        let parent = match new_parent {
            Some(parent) => self.find(parent)?,
            None => self.graph.root(),
        };
        self.graph.attach(id, Some(parent))
    }

    /// Delete an object and everything grouped under it.
    pub fn remove_object(&mut self, name: &str) -> Result<Vec<NodeId>> {
        let id = self.find(name)?;
        let removed = self.graph.remove(id)?;

        for &id in &removed {
            self.shapes.remove(id);
        }
        self.names.retain(|_, id| !removed.contains(id));
        if self.selected.is_some_and(|id| removed.contains(&id)) {
            self.selected = None;
        }

        info!("Removed '{}' ({} nodes)", name, removed.len());
        Ok(removed)
    }

    /// Run one propagation pass and build the frame's draw list.
    ///
    /// Items follow the depth-first order of the tree; grouping nodes are
    /// not drawn.
    pub fn frame(&mut self) -> Vec<DrawItem> {
        self.graph.update_world_matrices();

        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();

        self.graph
            .iter_depth_first()
            .filter_map(|id| {
                let shape = *self.shapes.get(id)?;
                let world = self.graph.get(id)?.world_matrix();
                Some(DrawItem {
                    node: id,
                    shape,
                    matrix: mvp_matrix(world, &view, &projection),
                    color_mult: self.material.color_mult,
                    color_offset: self.material.color_offset,
                })
            })
            .collect()
    }
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
