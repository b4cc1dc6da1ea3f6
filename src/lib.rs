// Library exports for the lens annotation backend

// Core modules
pub mod core;
pub mod lens;
pub mod orchestration;
pub mod sanitize;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used types and functions
pub use core::{
    config::Config,
    errors::{
        ConfigError, FactsError, OverlayError, PipelineError, PromptError, SegmentationError,
        StorageError,
    },
    types::{FactsRequest, FactsResult, ObjectRequest, ObjectResponse},
};

pub use lens::{build_prompt, BuiltPrompt, LensMode, OverlayStyle};

pub use orchestration::ObjectPipeline;

pub use services::{FactsClient, LabelRenderer, OverlayClient, YoloSegService};

pub use storage::Storage;

pub use utils::Metrics;
