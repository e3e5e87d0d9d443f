// ── ICO normalization ──
//
// Downloaded favicons are often PNG or JPEG. Windows needs a real ICO
// container to embed, so anything that is not already one is decoded,
// fitted into square frames and re-encoded with several sizes.

use std::io::Cursor;

use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::CoreError;

/// First four bytes of every ICO file.
pub const ICO_MAGIC: [u8; 4] = [0x00, 0x00, 0x01, 0x00];

/// Frame sizes written into converted icons.
const FRAME_SIZES: [u32; 4] = [16, 32, 48, 256];

/// Whether `bytes` starts with the ICO header.
pub fn is_ico(bytes: &[u8]) -> bool {
    bytes.starts_with(&ICO_MAGIC)
}

/// Convert any decodable image into ICO bytes.
///
/// Frames larger than the source are skipped, except that a 16px frame is
/// always present. Non-square sources are centered on a transparent canvas.
pub fn to_ico(bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let source = image::load_from_memory(bytes)?;
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return Err(CoreError::IconConversion {
            message: "image has no pixels".into(),
        });
    }

    let largest = w.max(h);
    let mut dir = IconDir::new(ResourceType::Icon);
    for size in frame_sizes(largest) {
        let frame = square_frame(&source, size);
        let image = IconImage::from_rgba_data(size, size, frame.into_raw());
        let entry = IconDirEntry::encode(&image)?;
        dir.add_entry(entry);
    }

    let mut out = Cursor::new(Vec::new());
    dir.write(&mut out)?;
    Ok(out.into_inner())
}

fn frame_sizes(largest: u32) -> Vec<u32> {
    let sizes: Vec<u32> = FRAME_SIZES
        .iter()
        .copied()
        .filter(|&s| s <= largest)
        .collect();
    if sizes.is_empty() { vec![16] } else { sizes }
}

fn square_frame(source: &DynamicImage, size: u32) -> RgbaImage {
    let scaled = source.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(size, size);
    let x = i64::from((size - scaled.width()) / 2);
    let y = i64::from((size - scaled.height()) / 2);
    imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn sniffs_ico_header() {
        assert!(is_ico(&[0, 0, 1, 0, 9, 9]));
        assert!(!is_ico(b"\x89PNG\r\n"));
        assert!(!is_ico(&[0, 0]));
    }

    #[test]
    fn png_becomes_multi_frame_ico() {
        let ico_bytes = to_ico(&png(64, 64)).unwrap();
        assert!(is_ico(&ico_bytes));

        let dir = IconDir::read(Cursor::new(&ico_bytes)).unwrap();
        let widths: Vec<u32> = dir.entries().iter().map(IconDirEntry::width).collect();
        assert_eq!(widths, vec![16, 32, 48]);
    }

    #[test]
    fn tiny_or_wide_images_still_get_a_square_frame() {
        let ico_bytes = to_ico(&png(10, 4)).unwrap();
        let dir = IconDir::read(Cursor::new(&ico_bytes)).unwrap();
        let entry = &dir.entries()[0];
        assert_eq!((entry.width(), entry.height()), (16, 16));
    }

    #[test]
    fn garbage_is_a_conversion_error() {
        let err = to_ico(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, CoreError::IconConversion { .. }));
    }
}
