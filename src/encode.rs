use crate::error::BakeError;
use crate::extract::VertexAnimationBuffer;
use crate::image_store::{ImageId, ImageStore};
use crate::settings::OutputNames;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakedTextures {
    pub offsets: ImageId,
    /// Absent in rigid mode.
    pub normals: Option<ImageId>,
}

/// Stores offsets in a float RGBA image and normals, when present, in a
/// byte RGBA image, both `columns` wide and `rows` high.
pub fn bake_vertex_data(
    images: &mut ImageStore,
    buffer: &VertexAnimationBuffer,
    names: &OutputNames,
) -> Result<BakedTextures, BakeError> {
    let width = buffer.columns as u32;
    let height = buffer.rows as u32;

    let offsets = images.create(&names.offsets_image, width, height, true, true);
    if let Err(err) = images.set_pixels(offsets, bytemuck::cast_slice(&buffer.offsets)) {
        images.remove(offsets);
        return Err(err);
    }

    let normals = if buffer.has_normals() {
        let normals = images.create(&names.normals_image, width, height, true, false);
        if let Err(err) = images.set_pixels(normals, bytemuck::cast_slice(&buffer.normals)) {
            images.remove(normals);
            images.remove(offsets);
            return Err(err);
        }
        Some(normals)
    } else {
        None
    };

    Ok(BakedTextures { offsets, normals })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(columns: usize, rows: usize, with_normals: bool) -> VertexAnimationBuffer {
        let offsets: Vec<[f32; 4]> = (0..columns * rows).map(|i| [i as f32, 0.0, 0.0, 1.0]).collect();
        let normals = if with_normals { vec![[0.5, 0.5, 1.0, 1.0]; columns * rows] } else { vec![] };
        VertexAnimationBuffer { columns, rows, offsets, normals }
    }

    #[test]
    fn pixels_are_row_major() {
        let mut images = ImageStore::new();
        let baked = bake_vertex_data(&mut images, &buffer(3, 2, true), &OutputNames::default()).unwrap();

        let offsets = images.get(baked.offsets).unwrap();
        assert_eq!((offsets.width, offsets.height), (3, 2));
        assert!(offsets.is_float());
        assert_eq!(offsets.pixel(1, 1)[0], 4.0);

        let normals = images.get(baked.normals.unwrap()).unwrap();
        assert!(!normals.is_float());
        assert_eq!(normals.name, "normals");
    }

    #[test]
    fn rigid_buffers_skip_normals() {
        let mut images = ImageStore::new();
        let baked = bake_vertex_data(&mut images, &buffer(2, 4, false), &OutputNames::default()).unwrap();
        assert!(baked.normals.is_none());
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn short_buffers_leave_no_images() {
        let mut images = ImageStore::new();
        let mut broken = buffer(2, 2, true);
        broken.offsets.pop();
        assert!(bake_vertex_data(&mut images, &broken, &OutputNames::default()).is_err());
        assert!(images.is_empty());
    }
}
