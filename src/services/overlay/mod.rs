// Overlay API client for annotated image generation
// Sends the lens instruction + rendering brief (+ source photo) to the hosted
// image model and saves the first inline image part it returns.
// Single attempt per request; a missing image part is a hard failure.

use base64::{engine::general_purpose, Engine};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::core::config::OverlayApiConfig;
use crate::core::errors::OverlayError;
use crate::lens::{LensMode, OverlayStyle};
use crate::sanitize::sanitize_slug;
use crate::utils::image_ops::{matte_saved_overlay, mime_for_image_path};
use crate::utils::Metrics;

/// Overlay API client
pub struct OverlayClient {
    api_key: String,
    http_client: reqwest::Client,
    model: String,
    output_dir: PathBuf,
    metrics: Option<Metrics>,
}

impl OverlayClient {
    /// Create a new overlay client writing into `output_dir`
    pub fn new(
        config: &OverlayApiConfig,
        output_dir: impl Into<PathBuf>,
        metrics: Option<Metrics>,
    ) -> anyhow::Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("Overlay API key is required (set GEMINI_API_KEY)");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            http_client,
            model: config.model.clone(),
            output_dir: output_dir.into(),
            metrics,
        })
    }

    /// Generate the annotated overlay for one object and save it to
    /// `<output_dir>/<object-slug>_<lens-slug>.png` (overwritten on collision).
    ///
    /// The math lens additionally gets its background matted out after the
    /// save. Returns the output path; a response with no inline image part is
    /// an error the caller must treat as fatal for the request.
    pub async fn generate_overlay(
        &self,
        guide: &str,
        object_name: &str,
        image_path: Option<&Path>,
        lens: LensMode,
        explanation: &str,
    ) -> Result<PathBuf, OverlayError> {
        let mut composed = format!(
            "{}\n\nInput object: {}\n\nVisual guide:\n{}",
            lens.overlay_instruction(),
            object_name,
            guide
        );
        if !explanation.is_empty() {
            composed.push_str(&format!("\n\nExplanation text to include:\n{}", explanation));
        }

        let mut parts = vec![serde_json::json!({ "text": composed })];

        if let Some(path) = image_path {
            match std::fs::read(path) {
                Ok(bytes) => {
                    let encoded = general_purpose::STANDARD.encode(&bytes);
                    parts.push(serde_json::json!({
                        "inline_data": {
                            "mime_type": mime_for_image_path(path),
                            "data": encoded
                        }
                    }));
                }
                Err(e) => {
                    // Missing source photo degrades to text-only generation,
                    // matching the original behavior.
                    warn!("Could not open image {}: {}", path.display(), e);
                }
            }
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request_body = serde_json::json!({
            "contents": [{
                "parts": parts
            }]
        });

        info!("Overlay: {} lens render for '{}'", lens, object_name);
        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(ref m) = self.metrics {
                m.record_overlay_call(false, start.elapsed());
            }
            return Err(OverlayError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        let elapsed = start.elapsed();

        if let Some(ref m) = self.metrics {
            m.record_overlay_call(true, elapsed);
        }

        let inline_b64 = extract_inline_image(&data).ok_or(OverlayError::NoImagePart)?;
        let image_bytes = general_purpose::STANDARD.decode(inline_b64)?;

        let output_path = self.output_path(object_name, lens);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OverlayError::SaveFailed {
                path: output_path.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(&output_path, &image_bytes).map_err(|e| OverlayError::SaveFailed {
            path: output_path.display().to_string(),
            source: e,
        })?;

        debug!(
            "Overlay: saved {} ({} bytes, {:.2}s)",
            output_path.display(),
            image_bytes.len(),
            elapsed.as_secs_f64()
        );

        if lens.overlay_style() == OverlayStyle::Schematic {
            matte_saved_overlay(&output_path).await?;
        }

        Ok(output_path)
    }

    /// Deterministic output path for an object/lens pair.
    pub fn output_path(&self, object_name: &str, lens: LensMode) -> PathBuf {
        let slug = sanitize_slug(object_name, "object");
        self.output_dir.join(format!("{}_{}.png", slug, lens.slug()))
    }
}

/// Scan a generateContent response for the first part carrying inline image
/// data. Both wire spellings of the field are accepted.
pub fn extract_inline_image(response: &Value) -> Option<&str> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    parts.iter().find_map(|part| {
        part.get("inline_data")
            .or_else(|| part.get("inlineData"))
            .and_then(|d| d.get("data"))
            .and_then(Value::as_str)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_inline_image_finds_first_image_part() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your overlay." },
                        { "inline_data": { "mime_type": "image/png", "data": "Zmlyc3Q=" } },
                        { "inline_data": { "mime_type": "image/png", "data": "c2Vjb25k" } }
                    ]
                }
            }]
        });
        assert_eq!(extract_inline_image(&response), Some("Zmlyc3Q="));
    }

    #[test]
    fn test_extract_inline_image_accepts_camel_case() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "YWJj" } }
                    ]
                }
            }]
        });
        assert_eq!(extract_inline_image(&response), Some("YWJj"));
    }

    #[test]
    fn test_extract_inline_image_none_for_text_only() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "no image, sorry" }]
                }
            }]
        });
        assert_eq!(extract_inline_image(&response), None);
    }

    #[test]
    fn test_extract_inline_image_none_for_empty_response() {
        assert_eq!(extract_inline_image(&json!({})), None);
        assert_eq!(extract_inline_image(&json!({ "candidates": [] })), None);
    }
}
