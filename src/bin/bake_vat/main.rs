use std::env;

use glam::{Mat4, Vec3};
use vat_baker::deform::{GroupMotion, Wave};
use vat_baker::mesh::MeshData;
use vat_baker::modifier::ModifierKind;
use vat_baker::{BakeError, BakeSettings, DeformEvaluator, OperatorResult, ProcessAnimMeshes, Scene};

/// A waving flag and, in rigid mode, a spinning propeller split into two
/// `RGD` groups.
fn build_demo_scene(settings: &BakeSettings) -> Result<(Scene, DeformEvaluator), BakeError> {
    let mut scene = Scene::new();
    let mut evaluator = DeformEvaluator::new();

    let flag = scene.add_mesh_object("Flag", MeshData::grid("Flag", 16, 8, 2.0), Mat4::IDENTITY);
    scene.object_mut(flag)?.add_modifier("Wave", ModifierKind::Wave);
    evaluator.add_deformer(flag, Wave { amplitude: 0.1, wavelength: 0.75, speed: 0.05 });
    scene.set_active(flag);

    if settings.detect_rigid {
        let propeller = scene.add_mesh_object(
            "Propeller",
            MeshData::grid("Propeller", 4, 2, 0.5),
            Mat4::from_translation(Vec3::new(0.0, 0.0, 1.5)),
        );
        let object = scene.object_mut(propeller)?;
        let left = object.add_vertex_group("RGD_blade_left");
        let right = object.add_vertex_group("RGD_blade_right");
        object.assign_vertices(left, &[0, 1, 4, 5]);
        object.assign_vertices(right, &[2, 3, 6, 7]);
        for (group, angle) in [("RGD_blade_left", 0.1), ("RGD_blade_right", -0.1)] {
            evaluator.add_deformer(
                propeller,
                GroupMotion {
                    group: group.to_string(),
                    translation_per_frame: Vec3::ZERO,
                    axis: Vec3::Z,
                    angle_per_frame: angle,
                    pivot: Vec3::ZERO,
                },
            );
        }
        scene.select(propeller);
    }

    Ok((scene, evaluator))
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let settings = match args.get(1) {
        Some(json) => BakeSettings::from_json(json)?,
        None => BakeSettings { frame_start: 1, frame_end: 48, ..Default::default() },
    };

    let (mut scene, mut evaluator) = build_demo_scene(&settings)?;
    match ProcessAnimMeshes::execute(&mut scene, &mut evaluator, &settings) {
        OperatorResult::Finished(output) => {
            let summary = output.summary(&scene)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        OperatorResult::Cancelled(report) => Err(report.message.into()),
    }
}
