use image::{imageops::FilterType, DynamicImage};

/// Bounding box of the slot previews (square)
pub const THUMBNAIL_SIZE: u32 = 240;

/// RGBA preview pixels, ready to hand to the UI toolkit
#[derive(Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Shrink an image to fit inside THUMBNAIL_SIZE, keeping its aspect ratio
///
/// Images that already fit are never enlarged.
pub fn make_thumbnail(img: &DynamicImage) -> Thumbnail {
    let fitted = if img.width() <= THUMBNAIL_SIZE && img.height() <= THUMBNAIL_SIZE {
        img.clone()
    } else {
        img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
    };

    let rgba = fitted.to_rgba8();
    let (width, height) = rgba.dimensions();
    Thumbnail {
        width,
        height,
        rgba: rgba.into_raw(),
    }
}
