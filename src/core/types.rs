// Shared request/response and pipeline types

use serde::{Deserialize, Serialize};

use crate::lens::LensMode;

/// Per-request input to the facts phase. Built from the incoming HTTP payload;
/// never persisted.
#[derive(Debug, Clone)]
pub struct FactsRequest {
    pub object_name: String,
    pub image_url: Option<String>,
    pub lens: LensMode,
}

/// Parsed output of the facts phase. Fields are raw model text until the
/// pipeline runs the sanitizer passes over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsResult {
    pub object: String,
    pub equation: String,
    pub explanation: String,
    /// Rendering brief for the overlay phase; the model may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,
}

/// POST /api/objects request body
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRequest {
    pub client_object_id: Option<String>,
    pub lens_mode: Option<String>,
    pub label: Option<String>,
    /// Legacy alias for `label`
    pub object: Option<String>,
    pub image_base64: Option<String>,
}

impl ObjectRequest {
    /// Object label, preferring `label` over the legacy `object` field.
    pub fn object_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.object.as_deref())
            .unwrap_or("object")
    }
}

/// POST /api/objects response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResponse {
    pub client_object_id: String,
    pub lens_mode: String,
    pub equation: String,
    pub explanation: String,
    pub message: String,
    pub annotated_image_base64: String,
}

/// POST /generate request body (re-annotates a previously uploaded image)
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub object: Option<String>,
    pub lens_mode: Option<String>,
}

/// POST /generate response body
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub facts: FactsResult,
    pub used_image: String,
    pub lens_mode: String,
    pub overlay_image: String,
}

/// JSON error body shared by all endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_request_label_fallback() {
        let req = ObjectRequest {
            label: None,
            object: Some("bottle".into()),
            ..Default::default()
        };
        assert_eq!(req.object_label(), "bottle");

        let req = ObjectRequest::default();
        assert_eq!(req.object_label(), "object");
    }

    #[test]
    fn test_object_request_accepts_camel_case() {
        let req: ObjectRequest = serde_json::from_str(
            r#"{"clientObjectId":"abc","lensMode":"math","label":"cup","imageBase64":"AA=="}"#,
        )
        .unwrap();
        assert_eq!(req.client_object_id.as_deref(), Some("abc"));
        assert_eq!(req.lens_mode.as_deref(), Some("math"));
        assert_eq!(req.image_base64.as_deref(), Some("AA=="));
    }
}
