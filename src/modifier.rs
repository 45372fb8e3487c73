use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierKind {
    // deform
    Armature,
    Cast,
    Curve,
    Displace,
    Hook,
    LaplacianDeform,
    Lattice,
    MeshDeform,
    Shrinkwrap,
    SimpleDeform,
    Smooth,
    CorrectiveSmooth,
    LaplacianSmooth,
    SurfaceDeform,
    Warp,
    Wave,
    // physics
    Cloth,
    Collision,
    Softbody,
    ParticleSystem,
    // generate
    Array,
    Bevel,
    Boolean,
    Decimate,
    EdgeSplit,
    Mirror,
    Remesh,
    Screw,
    Skin,
    Solidify,
    Subsurf,
    Triangulate,
    Weld,
    Wireframe,
}

impl ModifierKind {
    /// Modifiers that only move existing vertices. Anything else can change
    /// the vertex set between frames, which breaks column addressing.
    pub const ALLOWED: [ModifierKind; 18] = [
        Self::Armature,
        Self::Cast,
        Self::Curve,
        Self::Displace,
        Self::Hook,
        Self::LaplacianDeform,
        Self::Lattice,
        Self::MeshDeform,
        Self::Shrinkwrap,
        Self::SimpleDeform,
        Self::Smooth,
        Self::CorrectiveSmooth,
        Self::LaplacianSmooth,
        Self::SurfaceDeform,
        Self::Warp,
        Self::Wave,
        Self::Cloth,
        Self::Collision,
    ];

    pub fn is_allowed(&self) -> bool {
        Self::ALLOWED.contains(self)
    }

    /// Host identifier, e.g. `MESH_DEFORM`.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Armature => "ARMATURE",
            Self::Cast => "CAST",
            Self::Curve => "CURVE",
            Self::Displace => "DISPLACE",
            Self::Hook => "HOOK",
            Self::LaplacianDeform => "LAPLACIANDEFORM",
            Self::Lattice => "LATTICE",
            Self::MeshDeform => "MESH_DEFORM",
            Self::Shrinkwrap => "SHRINKWRAP",
            Self::SimpleDeform => "SIMPLE_DEFORM",
            Self::Smooth => "SMOOTH",
            Self::CorrectiveSmooth => "CORRECTIVE_SMOOTH",
            Self::LaplacianSmooth => "LAPLACIANSMOOTH",
            Self::SurfaceDeform => "SURFACE_DEFORM",
            Self::Warp => "WARP",
            Self::Wave => "WAVE",
            Self::Cloth => "CLOTH",
            Self::Collision => "COLLISION",
            Self::Softbody => "SOFT_BODY",
            Self::ParticleSystem => "PARTICLE_SYSTEM",
            Self::Array => "ARRAY",
            Self::Bevel => "BEVEL",
            Self::Boolean => "BOOLEAN",
            Self::Decimate => "DECIMATE",
            Self::EdgeSplit => "EDGE_SPLIT",
            Self::Mirror => "MIRROR",
            Self::Remesh => "REMESH",
            Self::Screw => "SCREW",
            Self::Skin => "SKIN",
            Self::Solidify => "SOLIDIFY",
            Self::Subsurf => "SUBSURF",
            Self::Triangulate => "TRIANGULATE",
            Self::Weld => "WELD",
            Self::Wireframe => "WIREFRAME",
        }
    }
}

/// Title-cased identifier, `MESH_DEFORM` -> `Mesh_Deform`.
impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut word_start = true;
        for c in self.identifier().chars() {
            if c.is_ascii_alphabetic() {
                if word_start {
                    write!(f, "{}", c.to_ascii_uppercase())?;
                } else {
                    write!(f, "{}", c.to_ascii_lowercase())?;
                }
                word_start = false;
            } else {
                write!(f, "{}", c)?;
                word_start = true;
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Modifier {
    pub name: String,
    pub kind: ModifierKind,
}
impl Modifier {
    pub fn new(name: impl Into<String>, kind: ModifierKind) -> Self {
        Self { name: name.into(), kind }
    }
}
