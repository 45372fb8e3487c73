use generational_arena::{Arena, Index};
use glam::Mat4;

use crate::error::BakeError;
use crate::image_store::ImageStore;
use crate::mesh::MeshData;
use crate::modifier::{Modifier, ModifierKind};

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct ObjectId(pub Index);
impl Into<Index> for ObjectId {
    fn into(self) -> Index {
        self.0
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct MeshId(pub Index);
impl Into<Index> for MeshId {
    fn into(self) -> Index {
        self.0
    }
}

/// `base`, or `base.001`, `base.002`, .. whichever is free first.
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}.{:03}", base, i))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

struct MeshEntry {
    mesh: MeshData,
    users: u32,
}

/// Mesh datablocks with user counts. A mesh can only be removed once
/// nothing links it.
#[derive(Default)]
pub struct MeshStore {
    meshes: Arena<MeshEntry>,
}
impl MeshStore {
    pub fn add(&mut self, mut mesh: MeshData) -> MeshId {
        mesh.name = unique_name(&mesh.name, |n| self.find(n).is_some());
        MeshId(self.meshes.insert(MeshEntry { mesh, users: 0 }))
    }

    /// Duplicates a mesh into a new, unlinked datablock.
    pub fn copy(&mut self, id: MeshId) -> Result<MeshId, BakeError> {
        let mesh = self.get(id)?.clone();
        Ok(self.add(mesh))
    }

    pub fn get(&self, id: MeshId) -> Result<&MeshData, BakeError> {
        self.meshes
            .get(id.into())
            .map(|entry| &entry.mesh)
            .ok_or_else(|| BakeError::MissingMesh(format!("{:?}", id)))
    }

    pub fn get_mut(&mut self, id: MeshId) -> Result<&mut MeshData, BakeError> {
        self.meshes
            .get_mut(id.into())
            .map(|entry| &mut entry.mesh)
            .ok_or_else(|| BakeError::MissingMesh(format!("{:?}", id)))
    }

    pub fn users(&self, id: MeshId) -> u32 {
        self.meshes.get(id.into()).map_or(0, |entry| entry.users)
    }

    pub fn link(&mut self, id: MeshId) {
        if let Some(entry) = self.meshes.get_mut(id.into()) {
            entry.users += 1;
        }
    }

    pub fn unlink(&mut self, id: MeshId) {
        if let Some(entry) = self.meshes.get_mut(id.into()) {
            entry.users = entry.users.saturating_sub(1);
        }
    }

    pub fn remove(&mut self, id: MeshId) -> Result<MeshData, BakeError> {
        let entry = self
            .meshes
            .get(id.into())
            .ok_or_else(|| BakeError::MissingMesh(format!("{:?}", id)))?;
        if entry.users > 0 {
            return Err(BakeError::MeshInUse { name: entry.mesh.name.clone(), users: entry.users });
        }
        self.meshes
            .remove(id.into())
            .map(|entry| entry.mesh)
            .ok_or_else(|| BakeError::MissingMesh(format!("{:?}", id)))
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.meshes.contains(id.into())
    }

    pub fn find(&self, name: &str) -> Option<MeshId> {
        self.meshes
            .iter()
            .find(|(_, entry)| entry.mesh.name == name)
            .map(|(index, _)| MeshId(index))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    Armature,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectMode {
    Object,
    Edit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VertexGroup {
    pub name: String,
}

pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub mode: ObjectMode,
    pub matrix_world: Mat4,
    pub mesh: Option<MeshId>,
    pub modifiers: Vec<Modifier>,
    pub vertex_groups: Vec<VertexGroup>,
    /// Per vertex, the indices into `vertex_groups` it belongs to, in
    /// assignment order.
    pub vertex_group_assignments: Vec<Vec<usize>>,
}
impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            mode: ObjectMode::Object,
            matrix_world: Mat4::IDENTITY,
            mesh: None,
            modifiers: vec![],
            vertex_groups: vec![],
            vertex_group_assignments: vec![],
        }
    }

    pub fn add_modifier(&mut self, name: impl Into<String>, kind: ModifierKind) {
        self.modifiers.push(Modifier::new(name, kind));
    }

    /// Returns the group index, reusing an existing group of the same name.
    pub fn add_vertex_group(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(idx) = self.vertex_groups.iter().position(|g| g.name == name) {
            return idx;
        }
        self.vertex_groups.push(VertexGroup { name });
        self.vertex_groups.len() - 1
    }

    pub fn assign_vertices(&mut self, group: usize, vertices: &[usize]) {
        for &v in vertices {
            if v >= self.vertex_group_assignments.len() {
                self.vertex_group_assignments.resize(v + 1, vec![]);
            }
            if !self.vertex_group_assignments[v].contains(&group) {
                self.vertex_group_assignments[v].push(group);
            }
        }
    }

    pub fn groups_of_vertex(&self, vertex: usize) -> &[usize] {
        self.vertex_group_assignments
            .get(vertex)
            .map_or(&[], |groups| groups.as_slice())
    }
}

/// Objects, their mesh datablocks and images. `collection` keeps link order,
/// `selection` keeps selection order.
#[derive(Default)]
pub struct Scene {
    pub objects: Arena<SceneObject>,
    pub meshes: MeshStore,
    pub images: ImageStore,
    pub collection: Vec<ObjectId>,
    pub selection: Vec<ObjectId>,
    pub active: Option<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds and links an object. The object takes a user of its mesh.
    pub fn link_object(&mut self, mut object: SceneObject) -> ObjectId {
        object.name = unique_name(&object.name, |n| self.find_object(n).is_some());
        if let Some(mesh) = object.mesh {
            self.meshes.link(mesh);
        }
        let id = ObjectId(self.objects.insert(object));
        self.collection.push(id);
        id
    }

    pub fn add_mesh_object(&mut self, name: impl Into<String>, mesh: MeshData, matrix_world: Mat4) -> ObjectId {
        let mesh = self.meshes.add(mesh);
        let mut object = SceneObject::new(name, ObjectKind::Mesh);
        object.mesh = Some(mesh);
        object.matrix_world = matrix_world;
        self.link_object(object)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(id.into())?;
        if let Some(mesh) = object.mesh {
            self.meshes.unlink(mesh);
        }
        self.collection.retain(|&o| o != id);
        self.selection.retain(|&o| o != id);
        if self.active == Some(id) {
            self.active = None;
        }
        Some(object)
    }

    pub fn object(&self, id: ObjectId) -> Result<&SceneObject, BakeError> {
        self.objects
            .get(id.into())
            .ok_or_else(|| BakeError::MissingObject(format!("{:?}", id)))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, BakeError> {
        self.objects
            .get_mut(id.into())
            .ok_or_else(|| BakeError::MissingObject(format!("{:?}", id)))
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(index, _)| ObjectId(index))
    }

    pub fn select(&mut self, id: ObjectId) {
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn set_active(&mut self, id: ObjectId) {
        self.select(id);
        self.active = Some(id);
    }

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.and_then(|id| self.objects.get(id.into()))
    }

    /// Selected objects of mesh type, in selection order.
    pub fn selected_mesh_objects(&self) -> Vec<ObjectId> {
        self.selection
            .iter()
            .copied()
            .filter(|&id| {
                self.objects
                    .get(id.into())
                    .is_some_and(|o| o.kind == ObjectKind::Mesh && o.mesh.is_some())
            })
            .collect()
    }

    /// Vertex count of an object's base mesh.
    pub fn object_vertex_count(&self, id: ObjectId) -> Result<usize, BakeError> {
        let object = self.object(id)?;
        match object.mesh {
            Some(mesh) => Ok(self.meshes.get(mesh)?.vertex_count()),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_users_block_removal() {
        let mut scene = Scene::new();
        let object = scene.add_mesh_object("Plane", MeshData::grid("Plane", 2, 2, 1.0), Mat4::IDENTITY);
        let mesh = scene.object(object).unwrap().mesh.unwrap();
        assert_eq!(scene.meshes.users(mesh), 1);
        assert!(matches!(scene.meshes.remove(mesh), Err(BakeError::MeshInUse { users: 1, .. })));

        scene.remove_object(object);
        assert_eq!(scene.meshes.users(mesh), 0);
        assert!(scene.meshes.remove(mesh).is_ok());
        assert!(!scene.meshes.contains(mesh));
    }

    #[test]
    fn copies_are_unlinked_and_renamed() {
        let mut store = MeshStore::default();
        let original = store.add(MeshData::new("mesh"));
        store.link(original);
        let copy = store.copy(original).unwrap();
        assert_eq!(store.users(copy), 0);
        assert_eq!(store.get(copy).unwrap().name, "mesh.001");
    }

    #[test]
    fn selected_mesh_objects_skip_other_kinds() {
        let mut scene = Scene::new();
        let plane = scene.add_mesh_object("Plane", MeshData::grid("Plane", 2, 2, 1.0), Mat4::IDENTITY);
        let rig = scene.link_object(SceneObject::new("Rig", ObjectKind::Armature));
        let cube = scene.add_mesh_object("Cube", MeshData::grid("Cube", 3, 3, 1.0), Mat4::IDENTITY);
        scene.select(cube);
        scene.select(rig);
        scene.select(plane);
        assert_eq!(scene.selected_mesh_objects(), vec![cube, plane]);
    }

    #[test]
    fn vertex_group_assignments_keep_order() {
        let mut object = SceneObject::new("Body", ObjectKind::Mesh);
        let misc = object.add_vertex_group("misc");
        let arm = object.add_vertex_group("RGD_arm");
        object.assign_vertices(misc, &[0, 1]);
        object.assign_vertices(arm, &[1, 3]);
        assert_eq!(object.groups_of_vertex(1), &[misc, arm]);
        assert_eq!(object.groups_of_vertex(2), &[] as &[usize]);
        assert_eq!(object.add_vertex_group("misc"), misc);
    }
}
