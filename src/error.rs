use thiserror::Error;

use crate::settings::MAX_TEXTURE_SIZE;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BakeError {
    #[error("Objects with {modifier} modifiers are not allowed! (object \"{object}\")")]
    UnsupportedModifier { object: String, modifier: String },
    #[error("Vertex count of {}, exceeds limit of {}!", thousands(.count), thousands(MAX_TEXTURE_SIZE))]
    VertexLimitExceeded { count: usize },
    #[error("Frame count of {}, exceeds limit of {}!", thousands(.count), thousands(MAX_TEXTURE_SIZE))]
    FrameLimitExceeded { count: usize },
    #[error("No RGD vertex group detected!")]
    NoRigidGroups,
    #[error("Rigid group count of {}, exceeds limit of {}!", thousands(.count), thousands(MAX_TEXTURE_SIZE))]
    TooManyRigidGroups { count: usize },
    #[error("Invalid frame range {start}..={end} with step {step}")]
    InvalidFrameRange { start: i32, end: i32, step: i32 },
    #[error("Frame range {start}..={end} samples a single frame, nothing to bake")]
    EmptyFrameRange { start: i32, end: i32 },
    #[error("Selected objects have no vertices to bake")]
    NoVertices,
    #[error("An active mesh object in object mode is required")]
    NoActiveMeshObject,
    #[error("Object {0} no longer exists")]
    MissingObject(String),
    #[error("Mesh {0} no longer exists")]
    MissingMesh(String),
    #[error("Mesh \"{name}\" still has {users} users")]
    MeshInUse { name: String, users: u32 },
    #[error("Vertex count changed at frame {frame}: expected {expected}, got {actual}")]
    TopologyChanged { frame: i32, expected: usize, actual: usize },
    #[error("Rigid group \"{0}\" has no vertices")]
    EmptyRigidGroup(String),
    #[error("Column vertex {vertex} is outside the reference mesh of {vertex_count} vertices")]
    ColumnOutOfRange { vertex: usize, vertex_count: usize },
    #[error("Pixel buffer of {actual} values does not match image size of {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// `9000` -> `"9,000"`
pub fn thousands(n: impl ToString) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(8192), "8,192");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn limit_messages_name_the_count() {
        let err = BakeError::VertexLimitExceeded { count: 9000 };
        assert_eq!(err.to_string(), "Vertex count of 9,000, exceeds limit of 8,192!");
        let err = BakeError::UnsupportedModifier { object: "Cube".into(), modifier: "Subsurf".into() };
        assert!(err.to_string().contains("Subsurf"));
    }
}
