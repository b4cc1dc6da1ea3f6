pub mod draw;
pub mod image_ops;
pub mod metrics;

// Re-export commonly used items
pub use image_ops::{
    encode_png_async, load_image_from_memory_async, matte_saved_overlay, mime_for_image_path,
    remove_background,
};
pub use metrics::Metrics;
