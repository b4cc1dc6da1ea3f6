use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::Path;

use crate::core::errors::OverlayError;

/// Asynchronously load an image from bytes using spawn_blocking.
///
/// Image decoding is CPU-intensive, especially for large images.
pub async fn load_image_from_memory_async(bytes: &[u8]) -> Result<DynamicImage> {
    let bytes = bytes.to_vec(); // Clone to move into blocking task
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).context("Failed to load image from memory")
    })
    .await
    .context("Failed to spawn blocking task for image loading")?
}

/// Asynchronously encode an image to PNG bytes using spawn_blocking.
pub async fn encode_png_async(img: DynamicImage) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut png_bytes = Vec::new();
        let mut cursor = Cursor::new(&mut png_bytes);
        img.write_to(&mut cursor, ImageFormat::Png)
            .context("Failed to encode image as PNG")?;
        Ok(png_bytes)
    })
    .await
    .context("Failed to spawn blocking task for PNG encoding")?
}

/// Mime type for an image file based on its extension (default png).
pub fn mime_for_image_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Color distance threshold for the background flood fill.
const MATTE_TOLERANCE: u32 = 40 * 40 * 3;

/// Remove a near-uniform background by flood-filling from the borders.
///
/// Pixels reachable from any border pixel whose color stays within tolerance
/// of that border's color become fully transparent. Interior regions of a
/// similar color are kept: only border-connected background is matted out.
pub fn remove_background(img: &RgbaImage) -> RgbaImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let mut out = img.clone();
    let mut visited = vec![false; (width * height) as usize];
    let mut queue: VecDeque<(u32, u32, Rgba<u8>)> = VecDeque::new();

    // Seed from every border pixel; each seed carries its own reference color
    // so gradients along the frame still matte cleanly.
    for x in 0..width {
        queue.push_back((x, 0, *img.get_pixel(x, 0)));
        queue.push_back((x, height - 1, *img.get_pixel(x, height - 1)));
    }
    for y in 0..height {
        queue.push_back((0, y, *img.get_pixel(0, y)));
        queue.push_back((width - 1, y, *img.get_pixel(width - 1, y)));
    }

    while let Some((x, y, reference)) = queue.pop_front() {
        let idx = (y * width + x) as usize;
        if visited[idx] {
            continue;
        }

        let pixel = *img.get_pixel(x, y);
        if color_distance_sq(&pixel, &reference) > MATTE_TOLERANCE {
            continue;
        }

        visited[idx] = true;
        out.put_pixel(x, y, Rgba([0, 0, 0, 0]));

        if x > 0 {
            queue.push_back((x - 1, y, pixel));
        }
        if x + 1 < width {
            queue.push_back((x + 1, y, pixel));
        }
        if y > 0 {
            queue.push_back((x, y - 1, pixel));
        }
        if y + 1 < height {
            queue.push_back((x, y + 1, pixel));
        }
    }

    out
}

fn color_distance_sq(a: &Rgba<u8>, b: &Rgba<u8>) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Re-open a saved overlay, matte out its background, and overwrite the file.
/// Used for the schematic lens only.
pub async fn matte_saved_overlay(path: &Path) -> Result<(), OverlayError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let img = image::open(&path)?.to_rgba8();
        let matted = remove_background(&img);
        DynamicImage::ImageRgba8(matted).save(&path)?;
        Ok::<(), OverlayError>(())
    })
    .await
    .map_err(|e| OverlayError::SaveFailed {
        path: "overlay matte task".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e),
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_image_path() {
        assert_eq!(mime_for_image_path(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_for_image_path(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_for_image_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_image_path(Path::new("noext")), "image/png");
    }

    #[test]
    fn test_remove_background_keeps_foreground() {
        // Black frame with a white square in the middle.
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        for y in 6..14 {
            for x in 6..14 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }

        let matted = remove_background(&img);
        assert_eq!(matted.get_pixel(0, 0)[3], 0);
        assert_eq!(matted.get_pixel(19, 19)[3], 0);
        assert_eq!(matted.get_pixel(10, 10)[3], 255);
        assert_eq!(matted.get_pixel(10, 10)[0], 255);
    }

    #[test]
    fn test_remove_background_does_not_leak_into_enclosed_regions() {
        // A white ring inside the black background protects its interior even
        // if the interior color matches the background.
        let mut img = RgbaImage::from_pixel(21, 21, Rgba([0, 0, 0, 255]));
        for y in 5..16 {
            for x in 5..16 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        for y in 8..13 {
            for x in 8..13 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }

        let matted = remove_background(&img);
        assert_eq!(matted.get_pixel(1, 1)[3], 0, "outer background removed");
        assert_eq!(matted.get_pixel(10, 10)[3], 255, "enclosed region kept");
    }

    #[tokio::test]
    async fn test_load_image_async_roundtrip() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        let png = encode_png_async(img).await.unwrap();
        let loaded = load_image_from_memory_async(&png).await.unwrap();
        assert_eq!(loaded.width(), 2);
        assert_eq!(loaded.height(), 2);
    }
}
