use serde::{Deserialize, Serialize};

/// Largest texture edge the baked textures may have, in columns or rows.
pub const MAX_TEXTURE_SIZE: usize = 8192;
/// Vertex groups whose name starts with this are treated as rigid groups.
pub const RIGID_GROUP_PREFIX: &str = "RGD";
/// Name of the UV channel that addresses texture columns.
pub const UV_LAYER_NAME: &str = "vertex_anim";
/// Fixed V coordinate written into the addressing UV channel. The paired
/// shader expects exactly this value.
pub const UV_ROW_ANCHOR: f32 = 128.0 / 255.0;
/// Scene units to texture units.
pub const OFFSET_SCALE: f32 = 100.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputNames {
    pub export_object: String,
    pub offsets_image: String,
    pub normals_image: String,
}
impl Default for OutputNames {
    fn default() -> Self {
        Self {
            export_object: "export_mesh".to_string(),
            offsets_image: "offsets".to_string(),
            normals_image: "normals".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BakeSettings {
    pub frame_start: i32,
    pub frame_end: i32,
    pub frame_step: i32,
    /// Frame whose geometry is the zero-offset baseline. Falls back to
    /// `frame_start` when it is not one of the sampled frames.
    pub reference_frame: i32,
    /// Collapse `RGD*` vertex groups to one texture column each. Disables
    /// the normals texture.
    pub detect_rigid: bool,
    pub output: OutputNames,
}
impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            frame_start: 1,
            frame_end: 250,
            frame_step: 1,
            reference_frame: 0,
            detect_rigid: false,
            output: OutputNames::default(),
        }
    }
}
impl BakeSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: self.frame_start,
            end: self.frame_end,
            step: self.frame_step,
        }
    }
}

/// Inclusive, stepped range of frames: `start, start + step, ..` up to and
/// including `end` when it lands on a step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
    pub step: i32,
}
impl FrameRange {
    pub fn is_valid(&self) -> bool {
        self.step >= 1 && self.end >= self.start
    }

    /// Number of sampled frames, `floor((end - start) / step) + 1`.
    pub fn len(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        ((self.end as i64 - self.start as i64) / self.step as i64) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, frame: i32) -> bool {
        self.is_valid()
            && frame >= self.start
            && frame <= self.end
            && (frame as i64 - self.start as i64) % self.step as i64 == 0
    }

    pub fn first(&self) -> i32 {
        self.start
    }

    pub fn last(&self) -> Option<i32> {
        match self.len() {
            0 => None,
            n => Some((self.start as i64 + (n as i64 - 1) * self.step as i64) as i32),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        let (start, step) = (self.start, self.step);
        (0..self.len() as i64).map(move |i| (start as i64 + i * step as i64) as i32)
    }

    /// Position of `frame` in sampling order.
    pub fn index_of(&self, frame: i32) -> Option<usize> {
        self.contains(frame)
            .then(|| ((frame as i64 - self.start as i64) / self.step as i64) as usize)
    }
}
