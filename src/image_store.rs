use generational_arena::{Arena, Index};
use image::{Rgba32FImage, RgbaImage};

use crate::error::BakeError;
use crate::scene::unique_name;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct ImageId(pub Index);
impl Into<Index> for ImageId {
    fn into(self) -> Index {
        self.0
    }
}

pub enum PixelBuffer {
    Float(Rgba32FImage),
    Byte(RgbaImage),
}

/// RGBA image. Pixel `(x, y)` lives at `(y * width + x) * 4` of the flat
/// buffer handed to [`ImageStore::set_pixels`].
pub struct BakedImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub pixels: PixelBuffer,
}
impl BakedImage {
    pub fn is_float(&self) -> bool {
        matches!(self.pixels, PixelBuffer::Float(_))
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        match &self.pixels {
            PixelBuffer::Float(buffer) => buffer.get_pixel(x, y).0,
            PixelBuffer::Byte(buffer) => buffer.get_pixel(x, y).0.map(|c| c as f32 / 255.0),
        }
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Default)]
pub struct ImageStore {
    images: Arena<BakedImage>,
}
impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// New image cleared to transparent black. The name is suffixed
    /// (`.001`, ..) if already taken.
    pub fn create(&mut self, name: &str, width: u32, height: u32, has_alpha: bool, is_float: bool) -> ImageId {
        let name = unique_name(name, |n| self.find(n).is_some());
        let pixels = if is_float {
            PixelBuffer::Float(Rgba32FImage::new(width, height))
        } else {
            PixelBuffer::Byte(RgbaImage::new(width, height))
        };
        log::debug!("created {}x{} {} image \"{}\"", width, height, if is_float { "float" } else { "byte" }, name);
        ImageId(self.images.insert(BakedImage { name, width, height, has_alpha, pixels }))
    }

    /// Replaces the image contents with `pixels`, which must hold exactly
    /// `width * height * 4` values.
    pub fn set_pixels(&mut self, id: ImageId, pixels: &[f32]) -> Result<(), BakeError> {
        let image = self
            .images
            .get_mut(id.into())
            .ok_or_else(|| BakeError::MissingObject(format!("image {:?}", id)))?;
        let expected = image.len();
        if pixels.len() != expected {
            return Err(BakeError::PixelCountMismatch { expected, actual: pixels.len() });
        }
        let (width, height, has_alpha) = (image.width, image.height, image.has_alpha);
        let mismatch = BakeError::PixelCountMismatch { expected, actual: pixels.len() };

        image.pixels = match image.pixels {
            PixelBuffer::Float(_) => {
                let mut data = pixels.to_vec();
                if !has_alpha {
                    data.chunks_exact_mut(4).for_each(|p| p[3] = 1.0);
                }
                PixelBuffer::Float(Rgba32FImage::from_raw(width, height, data).ok_or(mismatch)?)
            }
            PixelBuffer::Byte(_) => {
                let mut data: Vec<u8> = pixels.iter().map(|&v| unit_to_byte(v)).collect();
                if !has_alpha {
                    data.chunks_exact_mut(4).for_each(|p| p[3] = 255);
                }
                PixelBuffer::Byte(RgbaImage::from_raw(width, height, data).ok_or(mismatch)?)
            }
        };
        Ok(())
    }

    pub fn get(&self, id: ImageId) -> Option<&BakedImage> {
        self.images.get(id.into())
    }

    pub fn find(&self, name: &str) -> Option<ImageId> {
        self.images
            .iter()
            .find(|(_, image)| image.name == name)
            .map(|(index, _)| ImageId(index))
    }

    pub fn remove(&mut self, id: ImageId) -> Option<BakedImage> {
        self.images.remove(id.into())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
