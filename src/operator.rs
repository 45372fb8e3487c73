use crate::bake::{bake, BakeOutput};
use crate::error::BakeError;
use crate::evaluator::FrameEvaluator;
use crate::scene::{ObjectKind, ObjectMode, Scene};
use crate::settings::BakeSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

#[derive(Debug)]
pub enum OperatorResult {
    Finished(BakeOutput),
    Cancelled(Report),
}

/// Store combined per frame vertex offsets and normals for all selected
/// mesh objects into separate image textures.
pub struct ProcessAnimMeshes;

impl ProcessAnimMeshes {
    pub const IDNAME: &'static str = "object.process_anim_meshes";
    pub const LABEL: &'static str = "Process Anim Meshes";

    /// Needs an active mesh object in object mode.
    pub fn poll(scene: &Scene) -> bool {
        scene
            .active_object()
            .is_some_and(|o| o.kind == ObjectKind::Mesh && o.mode == ObjectMode::Object)
    }

    pub fn execute(
        scene: &mut Scene,
        evaluator: &mut impl FrameEvaluator,
        settings: &BakeSettings,
    ) -> OperatorResult {
        let result = if Self::poll(scene) {
            bake(scene, evaluator, settings)
        } else {
            Err(BakeError::NoActiveMeshObject)
        };
        match result {
            Ok(output) => OperatorResult::Finished(output),
            Err(err) => {
                log::error!("{}: {}", Self::LABEL, err);
                OperatorResult::Cancelled(Report {
                    level: ReportLevel::Error,
                    message: err.to_string(),
                })
            }
        }
    }
}
