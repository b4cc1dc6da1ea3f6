// Request orchestration
// One pipeline instance owns the external API clients and storage for the
// process lifetime; handlers share it through Arc and chain the phases
// synchronously per request.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::errors::{PipelineError, StorageError};
use crate::core::types::{
    FactsRequest, FactsResult, GenerateResponse, ObjectRequest, ObjectResponse,
};
use crate::lens::{build_prompt, LensMode};
use crate::sanitize::{clean_for_display, clean_for_prompt};
use crate::services::facts::FactsClient;
use crate::services::overlay::OverlayClient;
use crate::lens::prompts::DEFAULT_GUIDE;
use crate::storage::{StoredUpload, Storage};
use crate::utils::Metrics;

/// Output of a full facts+overlay run, before wire serialization.
struct AnnotatedObject {
    facts: FactsResult,
    explanation: String,
    overlay_path: PathBuf,
}

/// Orchestrates storage, the facts phase, sanitization, and the overlay phase.
pub struct ObjectPipeline {
    facts: FactsClient,
    overlay: OverlayClient,
    storage: Storage,
    metrics: Metrics,
}

impl ObjectPipeline {
    /// Construct the pipeline once at startup. Fails when either hosted API
    /// is not configured.
    pub fn new(config: Arc<Config>, metrics: Metrics) -> anyhow::Result<Self> {
        let storage = Storage::new(
            config.upload_dir(),
            config.output_dir(),
            config.public_base_url(),
        );
        storage.ensure_dirs()?;

        Ok(Self {
            facts: FactsClient::new(&config.facts, Some(metrics.clone()))?,
            overlay: OverlayClient::new(
                &config.overlay,
                config.output_dir(),
                Some(metrics.clone()),
            )?,
            storage,
            metrics,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Full chain for POST /api/objects: persist the upload, gather facts,
    /// render the overlay, and return the annotated result.
    #[instrument(skip(self, request), fields(label = request.object_label()))]
    pub async fn process_object(
        &self,
        request: &ObjectRequest,
    ) -> Result<ObjectResponse, PipelineError> {
        let client_object_id = request
            .client_object_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let lens = LensMode::resolve(request.lens_mode.as_deref());
        let label = request.object_label().to_string();

        let image_base64 = request
            .image_base64
            .as_deref()
            .ok_or(StorageError::MissingImagePayload)?;
        let upload = self
            .storage
            .persist_upload(image_base64, &client_object_id, &label)?;
        self.metrics.record_upload_stored();

        let annotated = self.annotate(&label, lens, &upload).await?;
        let annotated_image_base64 = self.storage.encode_file_base64(&annotated.overlay_path)?;

        let message = if annotated.facts.equation.is_empty() {
            "Overlay generated.".to_string()
        } else {
            annotated.facts.equation.clone()
        };

        Ok(ObjectResponse {
            client_object_id,
            lens_mode: lens.slug().to_string(),
            equation: annotated.facts.equation,
            explanation: annotated.explanation,
            message,
            annotated_image_base64,
        })
    }

    /// Chain for POST /generate: re-annotate a previously uploaded
    /// `<object>.png` without accepting new bytes.
    #[instrument(skip(self))]
    pub async fn generate_from_existing(
        &self,
        object_name: &str,
        lens_input: Option<&str>,
    ) -> Result<GenerateResponse, PipelineError> {
        let lens = LensMode::resolve(lens_input);
        let upload = self.storage.existing_upload(object_name)?;

        let annotated = self.annotate(object_name, lens, &upload).await?;

        Ok(GenerateResponse {
            used_image: upload.public_url,
            lens_mode: lens.slug().to_string(),
            overlay_image: annotated.overlay_path.display().to_string(),
            facts: annotated.facts,
        })
    }

    /// Shared facts → sanitize → overlay chain.
    async fn annotate(
        &self,
        label: &str,
        lens: LensMode,
        upload: &StoredUpload,
    ) -> Result<AnnotatedObject, PipelineError> {
        let facts_request = FactsRequest {
            object_name: label.to_string(),
            image_url: Some(upload.public_url.clone()),
            lens,
        };

        let built = build_prompt(
            facts_request.lens,
            &facts_request.object_name,
            facts_request.image_url.as_deref(),
        )?;
        let raw = self.facts.generate_facts(&built, label).await?;

        // Prompt-safe pass over every surfaced field, then the display pass
        // for the explanation shown to the caller.
        let facts = FactsResult {
            object: raw.object,
            equation: clean_for_prompt(&raw.equation),
            explanation: clean_for_prompt(&raw.explanation),
            guide: raw.guide.as_deref().map(clean_for_prompt),
        };
        let explanation = clean_for_display(&facts.explanation);
        let guide = facts
            .guide
            .clone()
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GUIDE.to_string());

        debug!("Facts phase done for '{}', rendering overlay", label);

        let overlay_path = self
            .overlay
            .generate_overlay(&guide, label, Some(upload.path.as_path()), lens, &explanation)
            .await?;
        self.metrics.record_overlay_generated();

        Ok(AnnotatedObject {
            facts,
            explanation,
            overlay_path,
        })
    }
}
