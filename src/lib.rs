//! Bakes per-frame vertex motion of deforming meshes into vertex animation
//! textures: a float offsets texture, a byte normals texture and an export
//! mesh whose `vertex_anim` UV channel addresses texture columns.

pub mod bake;
pub mod deform;
pub mod encode;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod extract;
pub mod image_store;
pub mod mesh;
pub mod modifier;
pub mod operator;
pub mod sampler;
pub mod scene;
pub mod settings;
pub mod topology;
pub mod validate;

pub use bake::{bake, BakeOutput, BakeSummary};
pub use error::BakeError;
pub use evaluator::{DeformEvaluator, EvaluatedObject, FrameEvaluator};
pub use operator::{OperatorResult, ProcessAnimMeshes, Report, ReportLevel};
pub use scene::{ObjectId, Scene};
pub use settings::BakeSettings;
