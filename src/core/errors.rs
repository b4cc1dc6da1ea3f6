// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Context preservation
// - Type-safe error matching
// - Source error chaining

use thiserror::Error;

/// Facts service errors (hosted chat-completion call + JSON extraction)
#[derive(Debug, Error)]
pub enum FactsError {
    #[error("API request failed: {0}")]
    ApiRequestFailed(#[from] reqwest::Error),

    #[error("Facts API error: {status} - {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Facts API returned no choices")]
    EmptyChoices,

    #[error("Model did not return valid JSON.")]
    NoJsonObject,

    #[error("Failed to parse JSON from model output: {0}")]
    JsonParseFailed(#[source] serde_json::Error),
}

/// Overlay service errors (hosted image-generation call + file post-processing)
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("API request failed: {0}")]
    ApiRequestFailed(#[from] reqwest::Error),

    #[error("Overlay API error: {status} - {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Overlay generation returned no image part")]
    NoImagePart,

    #[error("Failed to decode inline image data: {0}")]
    DecodeFailed(#[from] base64::DecodeError),

    #[error("Image processing failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Failed to write overlay to {path}: {source}")]
    SaveFailed {
        path: String,
        source: std::io::Error,
    },
}

/// Storage errors (upload persistence, output read-back)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Missing imageBase64 payload.")]
    MissingImagePayload,

    #[error("Invalid base64 image data.")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Generated overlay image missing: {0}")]
    MissingOverlay(String),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("No image found for '{0}'")]
    UploadNotFound(String),
}

/// Prompt construction errors
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Object name must be a non-empty string")]
    EmptyObjectName,
}

/// Segmentation service errors (camera demo)
#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("ONNX inference failed: {0}")]
    InferenceFailed(#[from] ort::Error),

    #[error("Failed to load segmentation model from {path}: {source}")]
    ModelLoadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Unexpected model output: {0}")]
    InvalidModelOutput(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
}

/// Pipeline orchestration errors, grouped by how the HTTP boundary reports them
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Facts(#[from] FactsError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl PipelineError {
    /// True for failures the caller caused (bad input or unusable model
    /// content), reported as 4xx; everything else is a server-side 5xx.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::Prompt(_) => true,
            PipelineError::Storage(e) => matches!(
                e,
                StorageError::MissingImagePayload
                    | StorageError::InvalidBase64(_)
                    | StorageError::UploadNotFound(_)
            ),
            PipelineError::Facts(e) => matches!(
                e,
                FactsError::NoJsonObject | FactsError::JsonParseFailed(_)
            ),
            PipelineError::Overlay(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::Storage(StorageError::UploadNotFound(_)))
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid facts API config: {0}")]
    InvalidFactsConfig(String),

    #[error("Invalid overlay API config: {0}")]
    InvalidOverlayConfig(String),

    #[error("Invalid storage config: {0}")]
    InvalidStorageConfig(String),

    #[error("Confidence threshold must be in [0.0, 1.0], got {0}")]
    InvalidConfidenceThreshold(f32),

    #[error("Invalid segmentation config: {0}")]
    InvalidSegmentationConfig(String),
}

// Convenience type aliases for Results
pub type FactsApiResult<T> = Result<T, FactsError>;
pub type OverlayApiResult<T> = Result<T, OverlayError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type SegmentationResult<T> = Result<T, SegmentationError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert!(PipelineError::Facts(FactsError::NoJsonObject).is_client_error());
        assert!(PipelineError::Storage(StorageError::MissingImagePayload).is_client_error());
        assert!(!PipelineError::Overlay(OverlayError::NoImagePart).is_client_error());
        assert!(
            PipelineError::Storage(StorageError::UploadNotFound("cup".into())).is_not_found()
        );
    }

    #[test]
    fn test_no_json_message_matches_contract() {
        // The HTTP contract surfaces this message verbatim.
        assert_eq!(
            FactsError::NoJsonObject.to_string(),
            "Model did not return valid JSON."
        );
    }
}
