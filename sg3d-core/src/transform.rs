//! Translation/rotation/scale transforms and the matrices built from them
use nalgebra::{Matrix4, Vector3};

/// Local transform of a scene node.
///
/// Rotation is stored as Euler angles in radians and applied about X, then Y,
/// then Z. The derived matrix is always `T * Rx * Ry * Rz * S`: scale is baked
/// in first, translation is outermost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_translation(x, y, z);
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_rotation(x, y, z);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_scale(x, y, z);
        self
    }

    pub fn set_translation(&mut self, x: f32, y: f32, z: f32) {
        self.translation = Vector3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(x, y, z);
    }

    /// Zero components are accepted and collapse the geometry along that axis.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vector3::new(x, y, z);
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vector3::new(dx, dy, dz);
    }

    /// Compute the local matrix from the current field values.
    pub fn local_matrix(&self) -> Matrix4<f32> {
        let t = &self.translation;
        let s = &self.scale;
        translation_matrix(t.x, t.y, t.z)
            * rotation_matrix(&self.rotation)
            * scale_matrix(s.x, s.y, s.z)
    }

    /// Write the local matrix into `dst`, leaving the transform untouched.
    pub fn write_local_matrix(&self, dst: &mut Matrix4<f32>) {
        *dst = self.local_matrix();
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Create a rotation matrix from Euler angles, applied in order X, Y, Z
pub fn rotation_matrix(rotation: &Vector3<f32>) -> Matrix4<f32> {
    let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
    let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
    let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

    rx * ry * rz
}

/// Create a translation matrix
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Create a scale matrix
pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.translation, Vector3::zeros());
        assert_eq!(t.rotation, Vector3::zeros());
        assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(t.local_matrix(), Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_setters_overwrite_fields() {
        let mut t = Transform::new();
        t.set_translation(1.0, 2.0, 3.0);
        t.set_rotation(0.1, 0.2, 0.3);
        t.set_scale(4.0, 5.0, 6.0);

        assert_eq!(t.translation, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(t.scale, Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_rotate_accumulates() {
        let mut t = Transform::new();
        t.rotate(0.1, 0.2, 0.3);
        t.rotate(0.1, 0.0, -0.3);
        assert!((t.rotation.x - 0.2).abs() < 1e-6);
        assert!((t.rotation.y - 0.2).abs() < 1e-6);
        assert!(t.rotation.z.abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = rotation_matrix(&Vector3::zeros());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_scale_applied_before_rotation() {
        let t = Transform::new()
            .with_scale(2.0, 1.0, 1.0)
            .with_rotation(0.0, 0.0, FRAC_PI_2);

        let p = t.local_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_translation_is_outermost() {
        // Rotation and scale must not move the translated origin
        let t = Transform::new()
            .with_translation(1.0, 2.0, 3.0)
            .with_rotation(0.4, -1.2, 2.0)
            .with_scale(3.0, 3.0, 3.0);

        let p = t.local_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        let r = Vector3::new(FRAC_PI_2, FRAC_PI_2, 0.0);
        let xyz = rotation_matrix(&r);
        let zyx = Matrix4::new_rotation(Vector3::new(0.0, FRAC_PI_2, 0.0))
            * Matrix4::new_rotation(Vector3::new(FRAC_PI_2, 0.0, 0.0));

        // Rx * Ry maps +Z onto +X; the reversed order does not
        let p = xyz.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert!((xyz - zyx).norm() > 1e-3);
    }

    #[test]
    fn test_write_local_matrix_matches() {
        let t = Transform::new()
            .with_translation(-1.0, 0.5, 2.0)
            .with_rotation(0.3, 0.6, 0.9);
        let mut dst = Matrix4::zeros();
        t.write_local_matrix(&mut dst);
        assert_eq!(dst, t.local_matrix());
    }

    #[test]
    fn test_mvp_order() {
        let model = translation_matrix(1.0, 0.0, 0.0);
        let view = translation_matrix(0.0, 0.0, -5.0);
        let projection = scale_matrix(2.0, 2.0, 1.0);
        let p = mvp_matrix(&model, &view, &projection).transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(2.0, 0.0, -5.0), epsilon = 1e-6);
    }
}
