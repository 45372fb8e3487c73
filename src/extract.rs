use glam::{Vec3, Vec4};

use crate::error::BakeError;
use crate::mesh::MeshData;
use crate::sampler::SampledFrames;
use crate::scene::{MeshId, MeshStore};
use crate::settings::OFFSET_SCALE;
use crate::topology::ColumnMap;

/// Per-column offsets and normals for every kept frame, addressed
/// `row * columns + column`. Row 0 is the last kept frame; rows run
/// backwards in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexAnimationBuffer {
    pub columns: usize,
    pub rows: usize,
    pub offsets: Vec<[f32; 4]>,
    /// Empty in rigid mode.
    pub normals: Vec<[f32; 4]>,
}

impl VertexAnimationBuffer {
    pub fn offset(&self, row: usize, column: usize) -> [f32; 4] {
        self.offsets[row * self.columns + column]
    }

    pub fn normal(&self, row: usize, column: usize) -> Option<[f32; 4]> {
        self.normals.get(row * self.columns + column).copied()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }
}

/// Displacement from the reference position, scaled to texture units with Y
/// flipped: `(x, -y, z, 1)`.
pub fn encode_offset(displacement: Vec3) -> [f32; 4] {
    let d = displacement * OFFSET_SCALE;
    [d.x, -d.y, d.z, 1.0]
}

pub fn decode_offset(pixel: [f32; 4]) -> Vec3 {
    Vec3::new(pixel[0], -pixel[1], pixel[2]) / OFFSET_SCALE
}

/// Unit normal remapped from [-1, 1] to [0, 1] with Y flipped.
pub fn encode_normal(normal: Vec3) -> [f32; 4] {
    [(normal.x + 1.0) * 0.5, (-normal.y + 1.0) * 0.5, (normal.z + 1.0) * 0.5, 1.0]
}

pub fn decode_normal(pixel: [f32; 4]) -> Vec3 {
    let v = Vec4::from(pixel).truncate() * 2.0 - Vec3::ONE;
    Vec3::new(v.x, -v.y, v.z)
}

fn extract_row(
    mesh: &MeshData,
    frame: i32,
    reference: &[Vec3],
    representatives: &[usize],
    with_normals: bool,
    buffer: &mut VertexAnimationBuffer,
) -> Result<(), BakeError> {
    if mesh.vertex_count() != reference.len() {
        return Err(BakeError::TopologyChanged {
            frame,
            expected: reference.len(),
            actual: mesh.vertex_count(),
        });
    }
    for &v in representatives {
        buffer.offsets.push(encode_offset(mesh.positions[v] - reference[v]));
        if with_normals {
            buffer.normals.push(encode_normal(mesh.normals[v]));
        }
    }
    buffer.rows += 1;
    Ok(())
}

fn release(meshes: &mut MeshStore, id: MeshId) {
    if meshes.users(id) == 0 {
        let _ = meshes.remove(id);
    }
}

/// Walks the sampled snapshots newest first, appending one row per
/// snapshot. Every snapshot is removed from `meshes` once read, or on
/// failure, unless something else links it. The reference mesh is left
/// to the caller.
pub fn get_vertex_data(
    meshes: &mut MeshStore,
    sampled: SampledFrames,
    columns: &ColumnMap,
) -> Result<VertexAnimationBuffer, BakeError> {
    let SampledFrames { snapshots, frames, reference } = sampled;
    let rows = snapshots.len();
    let mut pending = frames.into_iter().zip(snapshots).rev();

    let result = read_rows(meshes, &mut pending, rows, reference, columns);
    for (_, id) in pending {
        release(meshes, id);
    }
    result
}

fn read_rows(
    meshes: &mut MeshStore,
    pending: &mut impl Iterator<Item = (i32, MeshId)>,
    rows: usize,
    reference: MeshId,
    columns: &ColumnMap,
) -> Result<VertexAnimationBuffer, BakeError> {
    let reference = meshes.get(reference)?.positions.clone();
    let representatives = columns.representatives()?;
    if let Some(&vertex) = representatives.iter().find(|&&v| v >= reference.len()) {
        return Err(BakeError::ColumnOutOfRange { vertex, vertex_count: reference.len() });
    }
    let with_normals = !columns.is_rigid();

    let mut buffer = VertexAnimationBuffer {
        columns: columns.columns(),
        rows: 0,
        offsets: Vec::with_capacity(representatives.len() * rows),
        normals: Vec::with_capacity(if with_normals { representatives.len() * rows } else { 0 }),
    };

    for (frame, id) in pending {
        let result = meshes
            .get(id)
            .and_then(|mesh| extract_row(mesh, frame, &reference, &representatives, with_normals, &mut buffer));
        release(meshes, id);
        result?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RigidGroup;

    fn snapshot(store: &mut MeshStore, positions: Vec<Vec3>) -> MeshId {
        let mut mesh = MeshData::from_polygons("snap", positions, &[]);
        mesh.normals = vec![Vec3::Z; mesh.vertex_count()];
        store.add(mesh)
    }

    /// Snapshots taken at frames 1, 2, ..
    fn sampled(snapshots: Vec<MeshId>, reference: MeshId) -> SampledFrames {
        let frames = (1..=snapshots.len() as i32).collect();
        SampledFrames { snapshots, frames, reference }
    }

    #[test]
    fn offsets_are_scaled_and_y_flipped() {
        assert_eq!(encode_offset(Vec3::new(0.01, 0.02, -0.03)).map(|c| (c * 1000.0).round()), [1000.0, -2000.0, -3000.0, 1000.0]);
    }

    #[test]
    fn offset_round_trip() {
        let displacement = Vec3::new(0.125, -2.5, 3.75);
        assert!(decode_offset(encode_offset(displacement)).abs_diff_eq(displacement, 1e-5));
    }

    #[test]
    fn normal_round_trip_on_unit_vectors() {
        for n in [Vec3::X, Vec3::NEG_Y, Vec3::Z, Vec3::new(1.0, -2.0, 3.0).normalize(), Vec3::new(-0.3, 0.9, -0.1).normalize()] {
            let encoded = encode_normal(n);
            assert!(encoded[..3].iter().all(|c| (0.0..=1.0).contains(c)));
            assert!(decode_normal(encoded).abs_diff_eq(n, 1e-5));
        }
        assert_eq!(encode_normal(Vec3::Y), [0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn rows_run_newest_first() {
        let mut store = MeshStore::default();
        let reference = snapshot(&mut store, vec![Vec3::ZERO, Vec3::ZERO]);
        let first = snapshot(&mut store, vec![Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO]);
        let second = snapshot(&mut store, vec![Vec3::new(0.02, 0.0, 0.0), Vec3::ZERO]);

        let buffer = get_vertex_data(&mut store, sampled(vec![first, second], reference), &ColumnMap::Vertices { count: 2 }).unwrap();
        assert_eq!((buffer.columns, buffer.rows), (2, 2));
        assert!((buffer.offset(0, 0)[0] - 2.0).abs() < 1e-5);
        assert!((buffer.offset(1, 0)[0] - 1.0).abs() < 1e-5);
        assert_eq!(buffer.offset(1, 1), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(buffer.normal(0, 1), Some([0.5, 0.5, 1.0, 1.0]));
        // snapshots released, reference kept
        assert_eq!(store.len(), 1);
        assert!(store.contains(reference));
    }

    #[test]
    fn linked_snapshots_are_kept() {
        let mut store = MeshStore::default();
        let reference = snapshot(&mut store, vec![Vec3::ZERO]);
        let kept = snapshot(&mut store, vec![Vec3::X]);
        store.link(kept);
        get_vertex_data(&mut store, sampled(vec![kept], reference), &ColumnMap::Vertices { count: 1 }).unwrap();
        assert!(store.contains(kept));
    }

    #[test]
    fn topology_change_names_the_frame_and_releases_snapshots() {
        let mut store = MeshStore::default();
        let reference = snapshot(&mut store, vec![Vec3::ZERO, Vec3::ZERO]);
        let first = snapshot(&mut store, vec![Vec3::X, Vec3::X]);
        let broken = snapshot(&mut store, vec![Vec3::X, Vec3::X, Vec3::X]);
        let third = snapshot(&mut store, vec![Vec3::Y, Vec3::Y]);
        let snapshots = SampledFrames { snapshots: vec![first, broken, third], frames: vec![10, 20, 30], reference };

        let err = get_vertex_data(&mut store, snapshots, &ColumnMap::Vertices { count: 2 }).unwrap_err();
        assert_eq!(err, BakeError::TopologyChanged { frame: 20, expected: 2, actual: 3 });
        assert_eq!(err.to_string(), "Vertex count changed at frame 20: expected 2, got 3");
        assert_eq!(store.len(), 1);
        assert!(store.contains(reference));
    }

    #[test]
    fn columns_past_the_reference_are_rejected_and_released() {
        let mut store = MeshStore::default();
        let reference = snapshot(&mut store, vec![Vec3::ZERO, Vec3::ZERO]);
        let first = snapshot(&mut store, vec![Vec3::X, Vec3::X]);
        let second = snapshot(&mut store, vec![Vec3::Y, Vec3::Y]);

        let err = get_vertex_data(&mut store, sampled(vec![first, second], reference), &ColumnMap::Vertices { count: 3 })
            .unwrap_err();
        assert_eq!(err, BakeError::ColumnOutOfRange { vertex: 2, vertex_count: 2 });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_rigid_groups_fail_without_leaking() {
        let mut store = MeshStore::default();
        let reference = snapshot(&mut store, vec![Vec3::ZERO]);
        let first = snapshot(&mut store, vec![Vec3::X]);
        let columns = ColumnMap::Groups {
            groups: vec![RigidGroup { name: "RGD_empty".into(), vertices: vec![] }],
            owners: vec![None],
        };

        let err = get_vertex_data(&mut store, sampled(vec![first], reference), &columns).unwrap_err();
        assert_eq!(err, BakeError::EmptyRigidGroup("RGD_empty".into()));
        assert_eq!(store.len(), 1);
    }
}
