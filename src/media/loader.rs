/// Image loader
///
/// Reads a file as raw bytes (any unicode path works, `std::fs` takes the
/// platform-native path as-is), detects the format from the content rather
/// than the extension, and decodes it into a packed BGR buffer, the channel
/// order face-verification backends expect. EXIF orientation is applied, so
/// portrait phone photos arrive upright.

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use super::thumbnail::{make_thumbnail, Thumbnail};
use crate::error::{Error, Result};
use crate::state::data::ImageHandle;

/// Decoded pixels, height × width × 3 bytes in blue-green-red order
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap packed BGR bytes, `None` unless `data.len() == width * height * 3`
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == packed_len(width, height)).then_some(Self { width, height, data })
    }

    /// Convert any decoded image, dropping alpha and swapping R and B
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut data = rgb.into_raw();
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGR bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Back to RGB order, for writing standard image files
    ///
    /// `None` if the byte count does not match the dimensions.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.data.len() != packed_len(self.width, self.height) {
            return None;
        }
        let data: Vec<u8> = self
            .as_bytes()
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect();
        RgbImage::from_raw(self.width, self.height, data)
    }
}

fn packed_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

// Pixel data is too large to be useful in debug output
impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A freshly loaded image: the slot handle plus its preview
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: ImageHandle,
    pub thumbnail: Thumbnail,
}

/// Load an image for a slot (blocking)
///
/// # Errors
/// * `Error::FileRead` - the path cannot be opened or read
/// * `Error::Decode` - the bytes are not a supported image
pub fn load_image(path: PathBuf) -> Result<LoadedImage> {
    let (img, format) = read_and_decode(&path)?;
    let pixels = PixelBuffer::from_image(&img);
    let thumbnail = make_thumbnail(&img);

    tracing::info!(
        "📷 Loaded {} ({}x{}, {:?})",
        path.display(),
        pixels.width(),
        pixels.height(),
        format
    );

    Ok(LoadedImage {
        handle: ImageHandle {
            path,
            pixels: Arc::new(pixels),
            format,
        },
        thumbnail,
    })
}

/// Load an image for a slot without blocking the UI
pub async fn load_image_async(path: PathBuf) -> Result<LoadedImage> {
    let task_path = path.clone();
    // Spawn blocking because decoding large photos is CPU-intensive
    task::spawn_blocking(move || load_image(task_path))
        .await
        .map_err(|e| Error::file_read(path, io::Error::other(format!("loader task failed: {}", e))))?
}

fn read_and_decode(path: &Path) -> Result<(DynamicImage, ImageFormat)> {
    let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
    let format = image::guess_format(&bytes).map_err(|e| Error::decode(path, e))?;

    let mut decoder = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_decoder()
        .map_err(|e| Error::decode(path, e))?;
    // Read before decoding, `from_decoder` consumes the decoder
    let orientation = decoder.orientation().map_err(|e| Error::decode(path, e))?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| Error::decode(path, e))?;
    img.apply_orientation(orientation);

    Ok((img, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(path: &Path) {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([255, 10, 0]));
        img.put_pixel(3, 1, Rgb([1, 2, 3]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_pixels_are_bgr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        write_png(&path);

        let pixels = load_image(path).unwrap().handle.pixels;
        assert_eq!((pixels.width(), pixels.height()), (4, 2));
        let bytes = pixels.as_bytes();
        assert_eq!(bytes.len(), 4 * 2 * 3);
        // first pixel of row 0, last pixel of row 1
        assert_eq!(&bytes[0..3], &[0, 10, 255]);
        assert_eq!(&bytes[21..24], &[3, 2, 1]);
    }

    #[test]
    fn test_unicode_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("測試圖片 ☺ é.png");
        write_png(&path);

        let loaded = load_image(path.clone()).unwrap();
        assert_eq!(loaded.handle.path, path);
        assert_eq!(loaded.handle.format, ImageFormat::Png);
    }

    #[test]
    fn test_format_detected_from_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually_png.jpg");
        write_png(&path);

        let loaded = load_image(path).unwrap();
        assert_eq!(loaded.handle.format, ImageFormat::Png);
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = load_image(PathBuf::from("/nonexistent/face.jpg")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_text_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        fs::write(&path, "this is not an image").unwrap();

        let err = load_image(path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    /// 40x20 JPEG tagged EXIF Orientation=6 (rotate 90° clockwise to view)
    fn write_rotated_jpeg(path: &Path) {
        let mut img = RgbImage::new(40, 20);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        // Big-endian TIFF header, one IFD entry: tag 0x0112, SHORT, count 1, value 6
        let mut tiff = b"MM\0*".to_vec();
        tiff.extend_from_slice(&8u32.to_be_bytes());
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0, 0, 0, 1, 0x00, 0x06, 0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut app1 = vec![0xFF, 0xE1];
        app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&tiff);

        // Right after SOI
        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&app1);
        bytes.extend_from_slice(&jpeg[2..]);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_exif_orientation_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.jpg");
        write_rotated_jpeg(&path);

        let loaded = load_image(path).unwrap();
        assert_eq!(loaded.handle.format, ImageFormat::Jpeg);
        let pixels = &loaded.handle.pixels;
        assert_eq!((pixels.width(), pixels.height()), (20, 40));
        assert_eq!(pixels.as_bytes().len(), 20 * 40 * 3);
        // The preview is upright too
        assert!(loaded.thumbnail.height > loaded.thumbnail.width);
    }

    #[test]
    fn test_rgb_round_trip() {
        let buffer = PixelBuffer::new(1, 1, vec![30, 20, 10]).unwrap();
        let rgb = buffer.to_rgb_image().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_mismatched_length_is_rejected() {
        assert!(PixelBuffer::new(2, 2, vec![0; 5]).is_none());
        assert!(PixelBuffer::new(0, 0, Vec::new()).is_some());

        // A buffer whose bytes do not match its dimensions never becomes a blank image
        let short = PixelBuffer {
            width: 2,
            height: 2,
            data: vec![0; 6],
        };
        assert!(short.to_rgb_image().is_none());
    }

    #[tokio::test]
    async fn test_load_image_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        write_png(&path);

        let loaded = load_image_async(path).await.unwrap();
        assert_eq!(loaded.handle.pixels.width(), 4);

        let result = load_image_async(PathBuf::from("/nonexistent/path.png")).await;
        assert!(result.is_err());
    }
}
