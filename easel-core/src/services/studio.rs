//! Studio service - image, thumbnail and animation workflows
//!
//! Orchestrates a generation end to end: affordability check, delegate
//! call, artifact write, then the credit debit and history entry. Credits
//! are only debited after the delegate succeeds, so a failed generation
//! costs nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{GenerationKind, HistoryItem, UserRecord};
use crate::ports::{AspectRatio, MediaGenerator};
use crate::repository::UserRepository;
use crate::services::artifacts::{ArtifactKind, ArtifactStore};
use crate::services::credit::CreditService;

/// Result of a completed image or thumbnail generation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub prompt: String,
    pub path: PathBuf,
    pub cost: i64,
    pub remaining_credits: i64,
}

/// Result of a completed animation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOutcome {
    pub source: PathBuf,
    pub path: PathBuf,
    pub cost: i64,
    pub remaining_credits: i64,
}

/// Service for credit-metered media generation
pub struct StudioService {
    repository: Arc<UserRepository>,
    credits: CreditService,
    artifacts: ArtifactStore,
}

impl StudioService {
    pub fn new(repository: Arc<UserRepository>, artifacts: ArtifactStore) -> Self {
        let credits = CreditService::new(repository.clone());
        Self {
            repository,
            credits,
            artifacts,
        }
    }

    fn require_current(&self) -> Result<UserRecord> {
        self.repository
            .current_user()?
            .ok_or_else(|| Error::not_found("You are not signed in."))
    }

    /// Cost of `kind` for this account, or InsufficientCredits
    fn check_affordable(user: &UserRecord, kind: GenerationKind) -> Result<i64> {
        let cost = kind.cost_for(user.is_admin);
        if user.credits < cost {
            return Err(Error::InsufficientCredits {
                required: cost,
                available: user.credits,
            });
        }
        Ok(cost)
    }

    /// Generate a still image from a prompt
    pub async fn generate_image(
        &self,
        generator: &dyn MediaGenerator,
        prompt: &str,
        ratio: AspectRatio,
        out: Option<&Path>,
    ) -> Result<GenerationOutcome> {
        self.run_image_job(generator, GenerationKind::Image, prompt, ratio, out)
            .await
    }

    /// Generate a video thumbnail from a prompt
    ///
    /// Same pipeline as plain images but costed separately, and the history
    /// entry carries a "Thumbnail: " marker.
    pub async fn generate_thumbnail(
        &self,
        generator: &dyn MediaGenerator,
        prompt: &str,
        ratio: AspectRatio,
        out: Option<&Path>,
    ) -> Result<GenerationOutcome> {
        self.run_image_job(generator, GenerationKind::Thumbnail, prompt, ratio, out)
            .await
    }

    async fn run_image_job(
        &self,
        generator: &dyn MediaGenerator,
        kind: GenerationKind,
        prompt: &str,
        ratio: AspectRatio,
        out: Option<&Path>,
    ) -> Result<GenerationOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::validation(format!(
                "Please describe the {} you want to create.",
                kind.label()
            )));
        }

        let user = self.require_current()?;
        let cost = Self::check_affordable(&user, kind)?;

        let artifact = generator.generate_image(prompt, ratio).await?;

        let artifact_kind = match kind {
            GenerationKind::Thumbnail => ArtifactKind::Thumbnail,
            _ => ArtifactKind::Image,
        };
        let path = self.artifacts.save(artifact_kind, &artifact, out)?;

        let remaining = self.credits.adjust(-cost)?;
        let history_prompt = match kind {
            GenerationKind::Thumbnail => format!("Thumbnail: {}", prompt),
            _ => prompt.to_string(),
        };
        self.credits
            .append_history(HistoryItem::new(history_prompt, path.display().to_string()))?;

        Ok(GenerationOutcome {
            prompt: prompt.to_string(),
            path,
            cost,
            remaining_credits: remaining,
        })
    }

    /// Animate a still image into a short video
    ///
    /// Reads the source image from disk and hands it to the delegate. No
    /// history entry is recorded for animations; the artifact on disk is
    /// the record.
    pub async fn animate(
        &self,
        generator: &dyn MediaGenerator,
        image_path: &Path,
        out: Option<&Path>,
    ) -> Result<AnimationOutcome> {
        let mime = image_mime_type(image_path)?;
        if !image_path.is_file() {
            return Err(Error::validation(format!(
                "image file not found: {}",
                image_path.display()
            )));
        }
        let bytes = std::fs::read(image_path)?;

        let user = self.require_current()?;
        let cost = Self::check_affordable(&user, GenerationKind::Animation)?;

        let artifact = generator.animate_image(&bytes, mime).await?;
        let path = self.artifacts.save(ArtifactKind::Video, &artifact, out)?;

        let remaining = self.credits.adjust(-cost)?;

        Ok(AnimationOutcome {
            source: image_path.to_path_buf(),
            path,
            cost,
            remaining_credits: remaining,
        })
    }
}

/// Mime type for a source image, by file extension
fn image_mime_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        _ => Err(Error::validation(format!(
            "unsupported image type '{}' (use .jpg, .png or .webp)",
            path.display()
        ))),
    }
}
