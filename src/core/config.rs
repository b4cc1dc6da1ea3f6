use crate::core::errors::ConfigError;
use std::env;
use tracing::Level;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
    /// Base URL clients can reach this server under, used to build upload URLs
    pub public_base_url: String,
}

/// Facts API configuration (hosted chat completions)
#[derive(Debug, Clone)]
pub struct FactsApiConfig {
    pub api_key: String,
    pub model: String,
    pub max_completion_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

/// Overlay API configuration (hosted image generation)
#[derive(Debug, Clone)]
pub struct OverlayApiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// On-disk layout for uploads and generated overlays
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub output_dir: String,
}

/// Segmentation configuration (camera demo only)
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    pub model_path: String,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub target_size: u32,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub facts: FactsApiConfig,
    pub overlay: OverlayApiConfig,
    pub storage: StorageConfig,
    pub segmentation: SegmentationConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        // Parse log level
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5050);

        Ok(Self {
            server: ServerConfig {
                port,
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                log_level,
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port)),
            },
            facts: FactsApiConfig {
                api_key: env::var("CEREBRAS_API_KEY").unwrap_or_default(),
                model: env::var("FACTS_MODEL").unwrap_or_else(|_| "gpt-oss-120b".to_string()),
                max_completion_tokens: env::var("FACTS_MAX_COMPLETION_TOKENS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1024),
                temperature: env::var("FACTS_TEMPERATURE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.2),
                timeout_seconds: env::var("API_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            },
            overlay: OverlayApiConfig {
                api_key: env::var("GEMINI_API_KEY")
                    .or_else(|_| env::var("GOOGLE_GENAI_API_KEY"))
                    .unwrap_or_default(),
                model: env::var("OVERLAY_IMAGE_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
                timeout_seconds: env::var("API_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "outputs".to_string()),
            },
            segmentation: SegmentationConfig {
                model_path: env::var("SEG_MODEL_PATH")
                    .unwrap_or_else(|_| "models/yolov8n-seg.onnx".to_string()),
                confidence_threshold: env::var("SEG_CONFIDENCE_THRESHOLD")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.35),
                iou_threshold: env::var("SEG_IOU_THRESHOLD")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.45),
                target_size: env::var("SEG_TARGET_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(640),
            },
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Note: API keys are validated when the clients are constructed, so
        // the camera demo can run without either hosted API configured.

        if self.facts.max_completion_tokens == 0 {
            return Err(ConfigError::InvalidFactsConfig(
                "FACTS_MAX_COMPLETION_TOKENS must be > 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.facts.temperature) {
            return Err(ConfigError::InvalidFactsConfig(format!(
                "FACTS_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.facts.temperature
            )));
        }

        if self.overlay.model.trim().is_empty() {
            return Err(ConfigError::InvalidOverlayConfig(
                "OVERLAY_IMAGE_MODEL must not be empty".to_string(),
            ));
        }

        if self.storage.upload_dir.trim().is_empty() || self.storage.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidStorageConfig(
                "UPLOAD_DIR and OUTPUT_DIR must not be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.segmentation.confidence_threshold) {
            return Err(ConfigError::InvalidConfidenceThreshold(
                self.segmentation.confidence_threshold,
            ));
        }

        if !(0.0..=1.0).contains(&self.segmentation.iou_threshold) {
            return Err(ConfigError::InvalidSegmentationConfig(format!(
                "SEG_IOU_THRESHOLD must be between 0.0 and 1.0, got {}",
                self.segmentation.iou_threshold
            )));
        }

        if !(320..=2048).contains(&self.segmentation.target_size) {
            return Err(ConfigError::InvalidSegmentationConfig(format!(
                "SEG_TARGET_SIZE must be between 320 and 2048, got {}",
                self.segmentation.target_size
            )));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn public_base_url(&self) -> &str {
        &self.server.public_base_url
    }

    pub fn upload_dir(&self) -> &str {
        &self.storage.upload_dir
    }

    pub fn output_dir(&self) -> &str {
        &self.storage.output_dir
    }
}

// Note: No Default implementation because Config::new() can fail
// Users should explicitly call Config::new()? and handle errors
