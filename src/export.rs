use glam::Vec2;

use crate::error::BakeError;
use crate::mesh::MeshData;
use crate::scene::{MeshId, ObjectId, ObjectKind, Scene, SceneObject};
use crate::settings::{UV_LAYER_NAME, UV_ROW_ANCHOR};
use crate::topology::ColumnMap;

/// Writes each loop's texture column into the second UV channel, renamed
/// to `vertex_anim`: `u = (column + 0.5) / columns`, `v = 128 / 255`.
/// Loops whose vertex has no column keep their previous UV.
pub fn assign_column_uvs(mesh: &mut MeshData, columns: &ColumnMap) {
    mesh.ensure_uv_layers(2);
    let count = columns.columns() as f32;
    let layer = &mut mesh.uv_layers[1];
    layer.name = UV_LAYER_NAME.to_string();
    layer.data.resize(mesh.loops.len(), Vec2::ZERO);

    for (l, &v) in mesh.loops.iter().enumerate() {
        if let Some(column) = columns.column_of_vertex(v as usize) {
            layer.data[l] = Vec2::new((column as f32 + 0.5) / count, UV_ROW_ANCHOR);
        }
    }
}

/// Turns the reference snapshot into the exported mesh and links it to the
/// scene as a new object.
pub fn create_export_mesh_object(
    scene: &mut Scene,
    reference: MeshId,
    columns: &ColumnMap,
    name: &str,
) -> Result<ObjectId, BakeError> {
    assign_column_uvs(scene.meshes.get_mut(reference)?, columns);

    let mut object = SceneObject::new(name, ObjectKind::Mesh);
    object.mesh = Some(reference);
    let id = scene.link_object(object);
    log::debug!("linked export object \"{}\"", scene.object(id)?.name);
    Ok(id)
}
