use std::collections::HashMap;

use glam::Mat4;

use crate::deform::Deformer;
use crate::error::BakeError;
use crate::mesh::MeshData;
use crate::scene::{ObjectId, Scene};

/// Deformed geometry of one object in local space, with the world matrix
/// that places it at the evaluated frame.
pub struct EvaluatedObject {
    pub mesh: MeshData,
    pub matrix_world: Mat4,
}

/// The scene evaluation engine. `set_current_frame` moves the shared
/// time cursor, which is the only side effect the bake has on the host;
/// callers restore it themselves if they care.
pub trait FrameEvaluator {
    fn set_current_frame(&mut self, frame: i32);
    fn evaluate(&mut self, scene: &Scene, object: ObjectId) -> Result<EvaluatedObject, BakeError>;
}

#[derive(Default)]
struct DeformStack {
    deformers: Vec<Box<dyn Deformer>>,
    motion: Option<Box<dyn Fn(i32) -> Mat4>>,
}

/// Built-in engine: each object's base mesh run through its deformer stack,
/// optionally placed by a per-frame world matrix track.
#[derive(Default)]
pub struct DeformEvaluator {
    frame: i32,
    stacks: HashMap<ObjectId, DeformStack>,
}

impl DeformEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_frame(&self) -> i32 {
        self.frame
    }

    pub fn add_deformer(&mut self, object: ObjectId, deformer: impl Deformer + 'static) {
        self.stacks.entry(object).or_default().deformers.push(Box::new(deformer));
    }

    pub fn set_motion(&mut self, object: ObjectId, motion: impl Fn(i32) -> Mat4 + 'static) {
        self.stacks.entry(object).or_default().motion = Some(Box::new(motion));
    }
}

impl FrameEvaluator for DeformEvaluator {
    fn set_current_frame(&mut self, frame: i32) {
        self.frame = frame;
    }

    fn evaluate(&mut self, scene: &Scene, id: ObjectId) -> Result<EvaluatedObject, BakeError> {
        let object = scene.object(id)?;
        let mesh_id = object
            .mesh
            .ok_or_else(|| BakeError::Evaluation(format!("object \"{}\" has no mesh data", object.name)))?;
        let mut mesh = scene.meshes.get(mesh_id)?.clone();
        let mut matrix_world = object.matrix_world;

        if let Some(stack) = self.stacks.get(&id) {
            let vertex_count = mesh.vertex_count();
            for deformer in &stack.deformers {
                deformer.deform(self.frame, object, &mut mesh);
            }
            if mesh.vertex_count() != vertex_count {
                return Err(BakeError::Evaluation(format!(
                    "deformers changed the vertex count of \"{}\"",
                    object.name
                )));
            }
            if let Some(motion) = &stack.motion {
                matrix_world = motion(self.frame);
            }
        }

        Ok(EvaluatedObject { mesh, matrix_world })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn evaluates_deformers_at_current_frame() {
        let mut scene = Scene::new();
        let plane = scene.add_mesh_object("Plane", MeshData::grid("Plane", 2, 2, 1.0), Mat4::IDENTITY);
        let mut evaluator = DeformEvaluator::new();
        evaluator.add_deformer(plane, |frame: i32, mesh: &mut MeshData| {
            mesh.positions.iter_mut().for_each(|p| p.x += frame as f32);
        });
        evaluator.set_motion(plane, |frame| Mat4::from_translation(Vec3::new(0.0, frame as f32, 0.0)));

        evaluator.set_current_frame(4);
        let evaluated = evaluator.evaluate(&scene, plane).unwrap();
        let base = scene.meshes.get(scene.object(plane).unwrap().mesh.unwrap()).unwrap();
        assert_eq!(evaluated.mesh.positions[0].x, base.positions[0].x + 4.0);
        assert_eq!(evaluated.matrix_world.w_axis.y, 4.0);
    }

    #[test]
    fn unknown_objects_use_base_mesh_and_world_matrix() {
        let mut scene = Scene::new();
        let matrix = Mat4::from_translation(Vec3::X);
        let plane = scene.add_mesh_object("Plane", MeshData::grid("Plane", 2, 2, 1.0), matrix);
        let mut evaluator = DeformEvaluator::new();
        let evaluated = evaluator.evaluate(&scene, plane).unwrap();
        assert_eq!(evaluated.matrix_world, matrix);
        assert_eq!(evaluated.mesh.vertex_count(), 4);
    }
}
