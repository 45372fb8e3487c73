use crate::error::BakeError;
use crate::scene::{ObjectId, Scene};
use crate::validate::BakePlan;

/// Vertices that share one rigid transform. Indices are into the combined
/// mesh of all baked objects.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidGroup {
    pub name: String,
    pub vertices: Vec<usize>,
}
impl RigidGroup {
    /// The vertex sampled on behalf of the whole group.
    pub fn representative(&self) -> Option<usize> {
        self.vertices.first().copied()
    }
}

/// Which vertex or rigid group each texture column holds. Built once and
/// shared by UV assignment and data extraction so both address the same
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnMap {
    /// Column `i` is combined vertex `i`.
    Vertices { count: usize },
    /// Column `i` is `groups[i]`; `owners[v]` is the column owning vertex `v`.
    Groups { groups: Vec<RigidGroup>, owners: Vec<Option<usize>> },
}

impl ColumnMap {
    pub fn columns(&self) -> usize {
        match self {
            Self::Vertices { count } => *count,
            Self::Groups { groups, .. } => groups.len(),
        }
    }

    pub fn is_rigid(&self) -> bool {
        matches!(self, Self::Groups { .. })
    }

    pub fn column_of_vertex(&self, vertex: usize) -> Option<usize> {
        match self {
            Self::Vertices { count } => (vertex < *count).then_some(vertex),
            Self::Groups { owners, .. } => owners.get(vertex).copied().flatten(),
        }
    }

    /// Vertex sampled for each column, in column order.
    pub fn representatives(&self) -> Result<Vec<usize>, BakeError> {
        match self {
            Self::Vertices { count } => Ok((0..*count).collect()),
            Self::Groups { groups, .. } => groups
                .iter()
                .map(|g| g.representative().ok_or_else(|| BakeError::EmptyRigidGroup(g.name.clone())))
                .collect(),
        }
    }

    pub fn groups(&self) -> &[RigidGroup] {
        match self {
            Self::Vertices { .. } => &[],
            Self::Groups { groups, .. } => groups,
        }
    }
}

pub fn build_column_map(scene: &Scene, plan: &BakePlan) -> Result<ColumnMap, BakeError> {
    let Some(names) = &plan.rigid_groups else {
        return Ok(ColumnMap::Vertices { count: plan.vertex_count });
    };

    let groups = collect_rigid_groups(scene, &plan.objects, names)?;
    let mut owners = vec![None; plan.vertex_count];
    for (column, group) in groups.iter().enumerate() {
        for &v in &group.vertices {
            owners[v] = Some(column);
        }
    }
    log::debug!("collapsed {} vertices into {} rigid groups", plan.vertex_count, groups.len());
    Ok(ColumnMap::Groups { groups, owners })
}

/// Walks every object's vertices in combined order and files each under
/// the first of its groups listed in `names`. Groups come out in `names`
/// order; groups that end up with no vertices are dropped.
pub fn collect_rigid_groups(scene: &Scene, objects: &[ObjectId], names: &[String]) -> Result<Vec<RigidGroup>, BakeError> {
    let mut groups: Vec<RigidGroup> = names
        .iter()
        .map(|name| RigidGroup { name: name.clone(), vertices: vec![] })
        .collect();

    let mut vertex_offset = 0;
    for &id in objects {
        let object = scene.object(id)?;
        let vertex_count = scene.object_vertex_count(id)?;
        // object group index -> rigid group slot
        let lookup: Vec<Option<usize>> = object
            .vertex_groups
            .iter()
            .map(|g| names.iter().position(|n| *n == g.name))
            .collect();

        for v in 0..vertex_count {
            let first_match = object
                .groups_of_vertex(v)
                .iter()
                .find_map(|&g| lookup.get(g).copied().flatten());
            if let Some(slot) = first_match {
                groups[slot].vertices.push(vertex_offset + v);
            }
        }
        vertex_offset += vertex_count;
    }

    groups.retain(|group| {
        if group.vertices.is_empty() {
            log::warn!("rigid group \"{}\" has no vertices, skipping", group.name);
        }
        !group.vertices.is_empty()
    });
    if groups.is_empty() {
        return Err(BakeError::NoRigidGroups);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::mesh::MeshData;
    use crate::settings::BakeSettings;
    use crate::validate::validate;

    fn rigid_settings() -> BakeSettings {
        BakeSettings { frame_start: 1, frame_end: 4, detect_rigid: true, ..Default::default() }
    }

    #[test]
    fn first_matching_group_wins() {
        let mut scene = Scene::new();
        let id = scene.add_mesh_object("Body", MeshData::grid("Body", 4, 2, 1.0), Mat4::IDENTITY);
        let object = scene.object_mut(id).unwrap();
        let misc = object.add_vertex_group("misc");
        let arm = object.add_vertex_group("RGD_arm");
        let leg = object.add_vertex_group("RGD_leg");
        object.assign_vertices(misc, &[0, 1, 2]);
        object.assign_vertices(arm, &[0, 1, 2, 3]);
        object.assign_vertices(leg, &[3, 4, 5]);

        let plan = validate(&scene, &[id], &rigid_settings()).unwrap();
        let map = build_column_map(&scene, &plan).unwrap();

        assert_eq!(map.columns(), 2);
        assert_eq!(map.groups()[0].vertices, vec![0, 1, 2, 3]);
        assert_eq!(map.groups()[1].vertices, vec![4, 5]);
        assert_eq!(map.representatives().unwrap(), vec![0, 4]);
        assert_eq!(map.column_of_vertex(3), Some(0));
        assert_eq!(map.column_of_vertex(5), Some(1));
        assert_eq!(map.column_of_vertex(7), None);
    }

    #[test]
    fn indices_are_offset_by_earlier_objects() {
        let mut scene = Scene::new();
        let a = scene.add_mesh_object("A", MeshData::grid("A", 3, 1, 1.0), Mat4::IDENTITY);
        let b = scene.add_mesh_object("B", MeshData::grid("B", 2, 1, 1.0), Mat4::IDENTITY);
        let object = scene.object_mut(b).unwrap();
        let g = object.add_vertex_group("RGD_b");
        object.assign_vertices(g, &[1]);

        let groups = collect_rigid_groups(&scene, &[a, b], &["RGD_b".to_string()]).unwrap();
        assert_eq!(groups[0].vertices, vec![4]);
    }

    #[test]
    fn empty_groups_are_dropped() {
        let mut scene = Scene::new();
        let id = scene.add_mesh_object("Body", MeshData::grid("Body", 2, 2, 1.0), Mat4::IDENTITY);
        let object = scene.object_mut(id).unwrap();
        object.add_vertex_group("RGD_empty");
        let full = object.add_vertex_group("RGD_full");
        object.assign_vertices(full, &[2]);

        let plan = validate(&scene, &[id], &rigid_settings()).unwrap();
        assert_eq!(plan.columns, 2);
        let map = build_column_map(&scene, &plan).unwrap();
        assert_eq!(map.columns(), 1);
        assert_eq!(map.groups()[0].name, "RGD_full");
    }

    #[test]
    fn only_empty_groups_is_an_error() {
        let mut scene = Scene::new();
        let id = scene.add_mesh_object("Body", MeshData::grid("Body", 2, 2, 1.0), Mat4::IDENTITY);
        scene.object_mut(id).unwrap().add_vertex_group("RGD_empty");
        let plan = validate(&scene, &[id], &rigid_settings()).unwrap();
        assert_eq!(build_column_map(&scene, &plan).unwrap_err(), BakeError::NoRigidGroups);
    }

    #[test]
    fn hand_built_empty_group_has_no_representative() {
        let map = ColumnMap::Groups {
            groups: vec![
                RigidGroup { name: "RGD_full".into(), vertices: vec![1] },
                RigidGroup { name: "RGD_empty".into(), vertices: vec![] },
            ],
            owners: vec![None, Some(0)],
        };
        assert_eq!(map.groups()[1].representative(), None);
        assert_eq!(map.representatives().unwrap_err(), BakeError::EmptyRigidGroup("RGD_empty".into()));
    }

    #[test]
    fn vertex_mode_maps_identity() {
        let map = ColumnMap::Vertices { count: 3 };
        assert_eq!(map.representatives().unwrap(), vec![0, 1, 2]);
        assert_eq!(map.column_of_vertex(2), Some(2));
        assert_eq!(map.column_of_vertex(3), None);
        assert!(map.groups().is_empty());
    }
}
