// Pixel drawing primitives for the camera demo overlays
// Box outlines, filled panels, arrows, and mask contours on RgbaImage frames.

use image::{GrayImage, Rgba, RgbaImage};

fn put_pixel_checked(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a rectangle outline with the given stroke thickness.
pub fn draw_rect(img: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: Rgba<u8>) {
    for t in 0..thickness {
        for x in x1..=x2 {
            put_pixel_checked(img, x, y1 + t, color);
            put_pixel_checked(img, x, y2 - t, color);
        }
        for y in y1..=y2 {
            put_pixel_checked(img, x1 + t, y, color);
            put_pixel_checked(img, x2 - t, y, color);
        }
    }
}

/// Fill a rectangle, alpha-blending `color` over the frame.
pub fn fill_rect(img: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba<u8>) {
    let alpha = color[3] as f32 / 255.0;
    let inv_alpha = 1.0 - alpha;
    for y in y1.max(0)..=y2.min(img.height() as i32 - 1) {
        for x in x1.max(0)..=x2.min(img.width() as i32 - 1) {
            let existing = *img.get_pixel(x as u32, y as u32);
            let blended = Rgba([
                (color[0] as f32 * alpha + existing[0] as f32 * inv_alpha) as u8,
                (color[1] as f32 * alpha + existing[1] as f32 * inv_alpha) as u8,
                (color[2] as f32 * alpha + existing[2] as f32 * inv_alpha) as u8,
                255,
            ]);
            img.put_pixel(x as u32, y as u32, blended);
        }
    }
}

/// Draw a straight line using Bresenham's algorithm.
pub fn draw_line(img: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba<u8>) {
    let dx = (x2 - x1).abs();
    let dy = -(y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        put_pixel_checked(img, x, y, color);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a line with a small arrowhead at the destination.
pub fn draw_arrow(img: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba<u8>) {
    draw_line(img, x1, y1, x2, y2, color);

    let angle = ((y2 - y1) as f32).atan2((x2 - x1) as f32);
    let head_len = 10.0f32;
    for spread in [-0.5f32, 0.5f32] {
        let tip_x = x2 as f32 - head_len * (angle + spread).cos();
        let tip_y = y2 as f32 - head_len * (angle + spread).sin();
        draw_line(img, x2, y2, tip_x as i32, tip_y as i32, color);
    }
}

/// Trace the outline of a binary mask onto the frame: a mask pixel is on the
/// contour when at least one 4-neighbor is outside the mask.
pub fn draw_mask_contour(
    img: &mut RgbaImage,
    mask: &GrayImage,
    offset_x: i32,
    offset_y: i32,
    color: Rgba<u8>,
) {
    let (mw, mh) = mask.dimensions();
    for y in 0..mh {
        for x in 0..mw {
            if mask.get_pixel(x, y)[0] == 0 {
                continue;
            }
            let on_edge = x == 0
                || y == 0
                || x + 1 == mw
                || y + 1 == mh
                || mask.get_pixel(x - 1, y)[0] == 0
                || mask.get_pixel(x + 1, y)[0] == 0
                || mask.get_pixel(x, y - 1)[0] == 0
                || mask.get_pixel(x, y + 1)[0] == 0;
            if on_edge {
                put_pixel_checked(img, offset_x + x as i32, offset_y + y as i32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_rect_marks_corners() {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);
        draw_rect(&mut img, 2, 2, 17, 17, 1, white);
        assert_eq!(*img.get_pixel(2, 2), white);
        assert_eq!(*img.get_pixel(17, 17), white);
        assert_eq!(*img.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_draw_rect_clips_out_of_bounds() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        draw_rect(&mut img, -5, -5, 14, 14, 2, Rgba([255, 0, 0, 255]));
        // No panic and in-bounds edges are drawn.
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut img = RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 255]));
        let green = Rgba([0, 255, 0, 255]);
        draw_line(&mut img, 1, 1, 25, 18, green);
        assert_eq!(*img.get_pixel(1, 1), green);
        assert_eq!(*img.get_pixel(25, 18), green);
    }

    #[test]
    fn test_mask_contour_only_edges() {
        let mut mask = GrayImage::from_pixel(10, 10, image::Luma([0]));
        for y in 2..8 {
            for x in 2..8 {
                mask.put_pixel(x, y, image::Luma([255]));
            }
        }

        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let cyan = Rgba([0, 255, 255, 255]);
        draw_mask_contour(&mut img, &mask, 0, 0, cyan);
        assert_eq!(*img.get_pixel(2, 2), cyan, "edge pixel traced");
        assert_eq!(
            *img.get_pixel(5, 5),
            Rgba([0, 0, 0, 255]),
            "interior untouched"
        );
    }
}
