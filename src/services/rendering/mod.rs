// Label renderer for the camera demo
// cosmic-text shaping + swash rasterization, blended straight onto the frame.

use cosmic_text::{Attrs, Buffer, Color as CosmicColor, FontSystem, Metrics, Shaping, SwashCache, Wrap};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Renders single labels and short info lines onto RGBA frames.
pub struct LabelRenderer {
    font_system: Mutex<FontSystem>,
    swash_cache: Mutex<SwashCache>,
}

impl LabelRenderer {
    pub fn new() -> Self {
        // Prefer bundled fonts when a fonts/ directory exists, otherwise fall
        // back to the system font database.
        let font_system = match std::fs::read_dir("fonts") {
            Ok(entries) => {
                let mut db = cosmic_text::fontdb::Database::new();
                let mut loaded = 0usize;
                for entry in entries.flatten() {
                    if let Ok(font_data) = std::fs::read(entry.path()) {
                        db.load_font_data(font_data);
                        loaded += 1;
                    }
                }
                debug!("Loaded {} bundled fonts", loaded);
                FontSystem::new_with_locale_and_db("en-US".to_string(), db)
            }
            Err(_) => FontSystem::new(),
        };

        info!("✓ Label renderer initialized");

        Self {
            font_system: Mutex::new(font_system),
            swash_cache: Mutex::new(SwashCache::new()),
        }
    }

    /// Draw one line of text at (x, y), word-wrapped if `max_width` is given.
    pub fn render_text(
        &self,
        img: &mut RgbaImage,
        text: &str,
        font_size: f32,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        max_width: Option<f32>,
    ) {
        let mut font_system = self.font_system.lock();
        let mut swash_cache = self.swash_cache.lock();

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        buffer.set_size(&mut font_system, max_width, None);
        buffer.set_wrap(&mut font_system, Wrap::Word);

        let attrs = Attrs::new();
        buffer.set_text(&mut font_system, text, &attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut font_system, false);

        let cosmic_color = CosmicColor::rgba(color[0], color[1], color[2], color[3]);

        buffer.draw(
            &mut font_system,
            &mut swash_cache,
            cosmic_color,
            |px_x, px_y, _w, _h, pixel_color| {
                let img_x = x + px_x;
                let img_y = y + px_y;
                if img_x < 0
                    || img_y < 0
                    || img_x >= img.width() as i32
                    || img_y >= img.height() as i32
                {
                    return;
                }

                let existing = *img.get_pixel(img_x as u32, img_y as u32);
                let alpha = pixel_color.a() as f32 / 255.0;
                let inv_alpha = 1.0 - alpha;
                let blended = Rgba([
                    (pixel_color.r() as f32 * alpha + existing[0] as f32 * inv_alpha) as u8,
                    (pixel_color.g() as f32 * alpha + existing[1] as f32 * inv_alpha) as u8,
                    (pixel_color.b() as f32 * alpha + existing[2] as f32 * inv_alpha) as u8,
                    existing[3].max(pixel_color.a()),
                ]);
                img.put_pixel(img_x as u32, img_y as u32, blended);
            },
        );
    }
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self::new()
    }
}
