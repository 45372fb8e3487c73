use crate::error::BakeError;
use crate::evaluator::FrameEvaluator;
use crate::mesh::MeshData;
use crate::scene::{MeshId, ObjectId, Scene};
use crate::validate::BakePlan;

pub struct SampledFrames {
    /// One combined snapshot per sampled frame in sampling order, without
    /// the last sampled frame.
    pub snapshots: Vec<MeshId>,
    /// Frame number of each entry in `snapshots`.
    pub frames: Vec<i32>,
    /// Copy of the snapshot taken at the reference frame. Survives the
    /// dropped last frame.
    pub reference: MeshId,
}

/// Evaluates every object at `frame` and merges them, in `objects` order,
/// into one world space, triangulated mesh with fresh normals.
pub fn combine_frame(
    scene: &Scene,
    evaluator: &mut impl FrameEvaluator,
    objects: &[ObjectId],
    frame: i32,
) -> Result<MeshData, BakeError> {
    evaluator.set_current_frame(frame);
    let mut combined = MeshData::new("mesh");
    for &id in objects {
        let evaluated = evaluator.evaluate(scene, id)?;
        let mut mesh = evaluated.mesh;
        mesh.transform(&evaluated.matrix_world);
        combined.append(&mesh);
    }
    combined.triangulate();
    combined.calc_normals();
    Ok(combined)
}

pub fn sample_frames(
    scene: &mut Scene,
    evaluator: &mut impl FrameEvaluator,
    plan: &BakePlan,
) -> Result<SampledFrames, BakeError> {
    let mut snapshots = Vec::with_capacity(plan.frames.len());
    let mut frames = Vec::with_capacity(plan.frames.len());
    let mut reference = None;

    if let Err(err) = sample_into(scene, evaluator, plan, &mut snapshots, &mut frames, &mut reference) {
        for id in snapshots.into_iter().chain(reference) {
            let _ = scene.meshes.remove(id);
        }
        return Err(err);
    }

    let reference = match reference {
        Some(reference) => reference,
        None => {
            for id in snapshots {
                let _ = scene.meshes.remove(id);
            }
            return Err(BakeError::Evaluation(format!(
                "reference frame {} was never sampled",
                plan.reference_frame
            )));
        }
    };

    // the last sampled frame never makes it into the textures
    if let Some(last) = snapshots.pop() {
        frames.pop();
        scene.meshes.remove(last)?;
    }

    log::debug!("sampled {} frames, kept {}", plan.frames.len(), snapshots.len());
    Ok(SampledFrames { snapshots, frames, reference })
}

fn sample_into(
    scene: &mut Scene,
    evaluator: &mut impl FrameEvaluator,
    plan: &BakePlan,
    snapshots: &mut Vec<MeshId>,
    frames: &mut Vec<i32>,
    reference: &mut Option<MeshId>,
) -> Result<(), BakeError> {
    for frame in plan.frames.iter() {
        let mesh = combine_frame(scene, evaluator, &plan.objects, frame)?;
        if mesh.vertex_count() != plan.vertex_count {
            return Err(BakeError::TopologyChanged {
                frame,
                expected: plan.vertex_count,
                actual: mesh.vertex_count(),
            });
        }
        log::debug!("frame {}: {} vertices", frame, mesh.vertex_count());

        let id = scene.meshes.add(mesh);
        snapshots.push(id);
        frames.push(frame);
        if frame == plan.reference_frame {
            *reference = Some(scene.meshes.copy(id)?);
        }
    }
    Ok(())
}
