use glam::{Mat3, Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Polygon {
    pub loop_start: u32,
    pub loop_total: u32,
}

/// One UV channel, one coordinate per loop.
#[derive(Clone, Debug, PartialEq)]
pub struct UvLayer {
    pub name: String,
    pub data: Vec<Vec2>,
}

/// Vertex/loop/polygon mesh with per-vertex normals and per-loop UV
/// channels. `loops[i]` is the vertex index used by loop `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub loops: Vec<u32>,
    pub polygons: Vec<Polygon>,
    pub uv_layers: Vec<UvLayer>,
}

impl MeshData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_polygons(name: impl Into<String>, positions: Vec<Vec3>, faces: &[&[u32]]) -> Self {
        let mut mesh = Self::new(name);
        mesh.normals = vec![Vec3::Y; positions.len()];
        mesh.positions = positions;
        for face in faces {
            mesh.polygons.push(Polygon {
                loop_start: mesh.loops.len() as u32,
                loop_total: face.len() as u32,
            });
            mesh.loops.extend_from_slice(face);
        }
        mesh.calc_normals();
        mesh
    }

    /// Flat grid in the XY plane, `columns * rows` vertices laid out row by
    /// row, centered on the origin.
    pub fn grid(name: impl Into<String>, columns: u32, rows: u32, size: f32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let step_x = if columns > 1 { size / (columns - 1) as f32 } else { 0.0 };
        let step_y = if rows > 1 { size / (rows - 1) as f32 } else { 0.0 };
        let half = Vec3::new(step_x * (columns - 1) as f32, step_y * (rows - 1) as f32, 0.0) * 0.5;

        let mut positions = Vec::with_capacity((columns * rows) as usize);
        for y in 0..rows {
            for x in 0..columns {
                positions.push(Vec3::new(x as f32 * step_x, y as f32 * step_y, 0.0) - half);
            }
        }

        let mut quads: Vec<[u32; 4]> = vec![];
        for y in 0..rows.saturating_sub(1) {
            for x in 0..columns.saturating_sub(1) {
                let i = y * columns + x;
                quads.push([i, i + 1, i + columns + 1, i + columns]);
            }
        }
        let faces: Vec<&[u32]> = quads.iter().map(|q| q.as_slice()).collect();
        Self::from_polygons(name, positions, &faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn polygon_loops(&self, polygon: &Polygon) -> &[u32] {
        let start = polygon.loop_start as usize;
        &self.loops[start..start + polygon.loop_total as usize]
    }

    pub fn transform(&mut self, matrix: &Mat4) {
        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();
        for position in self.positions.iter_mut() {
            *position = matrix.transform_point3(*position);
        }
        for normal in self.normals.iter_mut() {
            *normal = (normal_matrix * *normal).normalize_or(Vec3::Y);
        }
    }

    /// Concatenates `other` after this mesh. Vertices are not welded across
    /// the seam. UV channels are matched by name; channels missing on one
    /// side are zero-filled.
    pub fn append(&mut self, other: &MeshData) {
        let vertex_offset = self.positions.len() as u32;
        let loop_offset = self.loops.len() as u32;
        let own_loops = self.loops.len();

        for layer in &other.uv_layers {
            if self.uv_layer(&layer.name).is_none() {
                self.uv_layers.push(UvLayer {
                    name: layer.name.clone(),
                    data: vec![Vec2::ZERO; own_loops],
                });
            }
        }

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.normals.resize(self.positions.len(), Vec3::Y);
        self.loops.extend(other.loops.iter().map(|v| v + vertex_offset));
        self.polygons.extend(other.polygons.iter().map(|p| Polygon {
            loop_start: p.loop_start + loop_offset,
            loop_total: p.loop_total,
        }));

        for layer in self.uv_layers.iter_mut() {
            match other.uv_layers.iter().find(|l| l.name == layer.name) {
                Some(src) => layer.data.extend_from_slice(&src.data),
                None => layer.data.resize(layer.data.len() + other.loops.len(), Vec2::ZERO),
            }
        }
    }

    /// Fan-triangulates every polygon with more than three corners. Vertex
    /// order and count are untouched; UV channels follow their loops.
    pub fn triangulate(&mut self) {
        if self.polygons.iter().all(|p| p.loop_total <= 3) {
            return;
        }

        let mut loops = Vec::with_capacity(self.loops.len());
        let mut polygons = Vec::with_capacity(self.polygons.len());
        // source loop index for every new loop
        let mut sources = Vec::with_capacity(self.loops.len());

        for polygon in &self.polygons {
            let start = polygon.loop_start as usize;
            let total = polygon.loop_total as usize;
            if total <= 3 {
                polygons.push(Polygon { loop_start: loops.len() as u32, loop_total: polygon.loop_total });
                for l in start..start + total {
                    loops.push(self.loops[l]);
                    sources.push(l);
                }
                continue;
            }
            for i in 1..total - 1 {
                polygons.push(Polygon { loop_start: loops.len() as u32, loop_total: 3 });
                for l in [start, start + i, start + i + 1] {
                    loops.push(self.loops[l]);
                    sources.push(l);
                }
            }
        }

        for layer in self.uv_layers.iter_mut() {
            layer.data = sources.iter().map(|&l| layer.data[l]).collect();
        }
        self.loops = loops;
        self.polygons = polygons;
    }

    /// Area weighted smooth vertex normals. Vertices without faces, or whose
    /// faces are degenerate, point along +Y.
    pub fn calc_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for polygon in &self.polygons {
            let corners = self.polygon_loops(polygon);
            // Newell's method, length is twice the polygon area
            let mut face_normal = Vec3::ZERO;
            for (i, &v) in corners.iter().enumerate() {
                let current = self.positions[v as usize];
                let next = self.positions[corners[(i + 1) % corners.len()] as usize];
                face_normal += current.cross(next);
            }
            for &v in corners {
                accum[v as usize] += face_normal;
            }
        }
        self.normals = accum
            .into_iter()
            .map(|n| {
                if n.length_squared() < f32::EPSILON {
                    Vec3::Y
                } else {
                    n.normalize()
                }
            })
            .collect();
    }

    pub fn uv_layer(&self, name: &str) -> Option<&UvLayer> {
        self.uv_layers.iter().find(|l| l.name == name)
    }

    /// Adds zero-filled UV channels until at least `count` exist.
    pub fn ensure_uv_layers(&mut self, count: usize) {
        while self.uv_layers.len() < count {
            let name = if self.uv_layers.is_empty() {
                "UVMap".to_string()
            } else {
                format!("UVMap.{:03}", self.uv_layers.len())
            };
            self.uv_layers.push(UvLayer {
                name,
                data: vec![Vec2::ZERO; self.loops.len()],
            });
        }
    }
}
