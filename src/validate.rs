use crate::error::BakeError;
use crate::scene::{ObjectId, Scene};
use crate::settings::{BakeSettings, FrameRange, MAX_TEXTURE_SIZE, RIGID_GROUP_PREFIX};

/// Everything the pipeline needs to know up front, checked before any
/// frame is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct BakePlan {
    pub objects: Vec<ObjectId>,
    pub frames: FrameRange,
    /// Reference frame after clamping into `frames`.
    pub reference_frame: i32,
    /// Combined vertex count of all objects.
    pub vertex_count: usize,
    /// Texture width: `vertex_count`, or the rigid group count in rigid mode.
    pub columns: usize,
    /// Texture height: sampled frames minus the dropped last one.
    pub frame_count: usize,
    /// Deduplicated `RGD*` group names in discovery order, rigid mode only.
    pub rigid_groups: Option<Vec<String>>,
}

impl BakePlan {
    pub fn is_rigid(&self) -> bool {
        self.rigid_groups.is_some()
    }
}

pub fn validate(scene: &Scene, objects: &[ObjectId], settings: &BakeSettings) -> Result<BakePlan, BakeError> {
    let frames = settings.frame_range();
    if !frames.is_valid() {
        return Err(BakeError::InvalidFrameRange {
            start: frames.start,
            end: frames.end,
            step: frames.step,
        });
    }

    let reference_frame = if frames.contains(settings.reference_frame) {
        settings.reference_frame
    } else {
        log::debug!(
            "reference frame {} is not sampled, using frame {}",
            settings.reference_frame,
            frames.first()
        );
        frames.first()
    };

    let mut vertex_count = 0;
    for &id in objects {
        let object = scene.object(id)?;
        if let Some(modifier) = object.modifiers.iter().find(|m| !m.kind.is_allowed()) {
            return Err(BakeError::UnsupportedModifier {
                object: object.name.clone(),
                modifier: modifier.kind.to_string(),
            });
        }
        vertex_count += scene.object_vertex_count(id)?;
    }
    if vertex_count == 0 {
        return Err(BakeError::NoVertices);
    }

    let rigid = settings.detect_rigid;
    if vertex_count > MAX_TEXTURE_SIZE && !rigid {
        return Err(BakeError::VertexLimitExceeded { count: vertex_count });
    }

    let frame_count = frames.len() - 1;
    if frame_count > MAX_TEXTURE_SIZE {
        return Err(BakeError::FrameLimitExceeded { count: frame_count });
    }
    if frame_count == 0 {
        return Err(BakeError::EmptyFrameRange { start: frames.start, end: frames.end });
    }

    let rigid_groups = if rigid {
        let names = rigid_group_names(scene, objects)?;
        if names.is_empty() {
            return Err(BakeError::NoRigidGroups);
        }
        if names.len() > MAX_TEXTURE_SIZE {
            return Err(BakeError::TooManyRigidGroups { count: names.len() });
        }
        Some(names)
    } else {
        None
    };
    let columns = rigid_groups.as_ref().map_or(vertex_count, |names| names.len());

    Ok(BakePlan {
        objects: objects.to_vec(),
        frames,
        reference_frame,
        vertex_count,
        columns,
        frame_count,
        rigid_groups,
    })
}

/// Names of `RGD*` vertex groups across `objects`, first occurrence wins.
pub fn rigid_group_names(scene: &Scene, objects: &[ObjectId]) -> Result<Vec<String>, BakeError> {
    let mut names: Vec<String> = vec![];
    for &id in objects {
        for group in &scene.object(id)?.vertex_groups {
            if group.name.starts_with(RIGID_GROUP_PREFIX) && !names.contains(&group.name) {
                names.push(group.name.clone());
            }
        }
    }
    Ok(names)
}
