pub mod facts;
pub mod overlay;
pub mod rendering;
pub mod segmentation;

// Re-export commonly used services
pub use facts::FactsClient;
pub use overlay::OverlayClient;
pub use rendering::LabelRenderer;
pub use segmentation::YoloSegService;
