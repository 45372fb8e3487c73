use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::mesh::MeshData;
use crate::scene::SceneObject;

/// Moves the vertices of an object's mesh for a given frame. Deformers may
/// not add or remove vertices.
pub trait Deformer {
    fn deform(&self, frame: i32, object: &SceneObject, mesh: &mut MeshData);
}

impl<F> Deformer for F
where
    F: Fn(i32, &mut MeshData),
{
    fn deform(&self, frame: i32, _object: &SceneObject, mesh: &mut MeshData) {
        self(frame, mesh)
    }
}

/// Radial sine wave along local Z.
pub struct Wave {
    pub amplitude: f32,
    pub wavelength: f32,
    /// Wavelengths travelled per frame.
    pub speed: f32,
}
impl Deformer for Wave {
    fn deform(&self, frame: i32, _object: &SceneObject, mesh: &mut MeshData) {
        let phase = frame as f32 * self.speed;
        for position in mesh.positions.iter_mut() {
            let dist = position.truncate().length();
            position.z += self.amplitude * (TAU * (dist / self.wavelength - phase)).sin();
        }
    }
}

/// Rigid motion of one vertex group: rotation about `pivot` plus a
/// translation, both accumulating linearly with the frame number.
pub struct GroupMotion {
    pub group: String,
    pub translation_per_frame: Vec3,
    pub axis: Vec3,
    pub angle_per_frame: f32,
    pub pivot: Vec3,
}
impl Deformer for GroupMotion {
    fn deform(&self, frame: i32, object: &SceneObject, mesh: &mut MeshData) {
        let Some(group) = object.vertex_groups.iter().position(|g| g.name == self.group) else {
            return;
        };
        let rotation = Quat::from_axis_angle(self.axis.normalize_or(Vec3::Z), self.angle_per_frame * frame as f32);
        let translation = self.translation_per_frame * frame as f32;
        for (v, position) in mesh.positions.iter_mut().enumerate() {
            if object.groups_of_vertex(v).contains(&group) {
                *position = self.pivot + rotation * (*position - self.pivot) + translation;
            }
        }
    }
}
