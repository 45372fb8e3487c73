use serde::{Deserialize, Serialize};

use crate::encode::{bake_vertex_data, BakedTextures};
use crate::error::BakeError;
use crate::evaluator::FrameEvaluator;
use crate::export::create_export_mesh_object;
use crate::extract::get_vertex_data;
use crate::sampler::sample_frames;
use crate::scene::{ObjectId, Scene};
use crate::settings::BakeSettings;
use crate::topology::build_column_map;
use crate::validate::validate;

#[derive(Debug, Clone, PartialEq)]
pub struct BakeOutput {
    pub export_object: ObjectId,
    pub textures: BakedTextures,
    pub columns: usize,
    pub rows: usize,
    pub reference_frame: i32,
    /// Rigid group per column, empty unless rigid mode was on.
    pub rigid_groups: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BakeSummary {
    pub export_object: String,
    pub offsets_image: String,
    pub normals_image: Option<String>,
    pub columns: usize,
    pub rows: usize,
    pub reference_frame: i32,
    pub rigid_groups: Vec<String>,
}

impl BakeOutput {
    pub fn summary(&self, scene: &Scene) -> Result<BakeSummary, BakeError> {
        let image_name = |id| {
            scene
                .images
                .get(id)
                .map(|image| image.name.clone())
                .ok_or_else(|| BakeError::MissingObject(format!("image {:?}", id)))
        };
        Ok(BakeSummary {
            export_object: scene.object(self.export_object)?.name.clone(),
            offsets_image: image_name(self.textures.offsets)?,
            normals_image: self.textures.normals.map(image_name).transpose()?,
            columns: self.columns,
            rows: self.rows,
            reference_frame: self.reference_frame,
            rigid_groups: self.rigid_groups.clone(),
        })
    }
}

/// Bakes the selected mesh objects into an offsets texture, a normals
/// texture (not in rigid mode) and an export mesh carrying the column UVs.
///
/// Nothing is created unless every step succeeds.
pub fn bake(
    scene: &mut Scene,
    evaluator: &mut impl FrameEvaluator,
    settings: &BakeSettings,
) -> Result<BakeOutput, BakeError> {
    let objects = scene.selected_mesh_objects();
    let plan = validate(scene, &objects, settings)?;
    let columns = build_column_map(scene, &plan)?;
    log::info!(
        "baking {} objects: {} columns, frames {}..={} step {}, reference frame {}",
        plan.objects.len(),
        columns.columns(),
        plan.frames.start,
        plan.frames.end,
        plan.frames.step,
        plan.reference_frame
    );

    let sampled = sample_frames(scene, evaluator, &plan)?;
    let reference = sampled.reference;

    let buffer = match get_vertex_data(&mut scene.meshes, sampled, &columns) {
        Ok(buffer) => buffer,
        Err(err) => {
            let _ = scene.meshes.remove(reference);
            return Err(err);
        }
    };

    let export_object = match create_export_mesh_object(scene, reference, &columns, &settings.output.export_object) {
        Ok(id) => id,
        Err(err) => {
            let _ = scene.meshes.remove(reference);
            return Err(err);
        }
    };

    let textures = match bake_vertex_data(&mut scene.images, &buffer, &settings.output) {
        Ok(textures) => textures,
        Err(err) => {
            scene.remove_object(export_object);
            let _ = scene.meshes.remove(reference);
            return Err(err);
        }
    };

    log::info!("baked {}x{} vertex animation", buffer.columns, buffer.rows);
    Ok(BakeOutput {
        export_object,
        textures,
        columns: buffer.columns,
        rows: buffer.rows,
        reference_frame: plan.reference_frame,
        rigid_groups: columns.groups().iter().map(|g| g.name.clone()).collect(),
    })
}
