//! Generation delegate port
//!
//! Defines the interface to the external generative-AI service (Gemini,
//! demo data). The core never talks HTTP directly; services hold a
//! `dyn MediaGenerator` and stay ignorant of the provider specifics.

use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::result::GenerateError;

/// Aspect ratios accepted by the image endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Wide16x9,
    Standard4x3,
    Square,
    Portrait3x4,
    Tall9x16,
}

impl AspectRatio {
    /// The wire form the API expects
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Standard4x3 => "4:3",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Tall9x16 => "9:16",
        }
    }

    /// All supported ratios, for help text
    pub fn all() -> &'static [AspectRatio] {
        &[
            AspectRatio::Wide16x9,
            AspectRatio::Standard4x3,
            AspectRatio::Square,
            AspectRatio::Portrait3x4,
            AspectRatio::Tall9x16,
        ]
    }

    /// Width/height proportion, used by the demo renderer
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Wide16x9 => (1280, 720),
            AspectRatio::Standard4x3 => (1024, 768),
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait3x4 => (768, 1024),
            AspectRatio::Tall9x16 => (720, 1280),
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Wide16x9),
            "4:3" => Ok(AspectRatio::Standard4x3),
            "1:1" => Ok(AspectRatio::Square),
            "3:4" => Ok(AspectRatio::Portrait3x4),
            "9:16" => Ok(AspectRatio::Tall9x16),
            other => Err(format!(
                "unsupported aspect ratio '{}' (expected one of 16:9, 4:3, 1:1, 3:4, 9:16)",
                other
            )),
        }
    }
}

/// A generated media payload, not yet written anywhere
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// File extension for the payload's mime type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/svg+xml" => "svg",
            "video/mp4" => "mp4",
            _ => "bin",
        }
    }
}

/// Speaker of one chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    /// The wire form the API expects
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One completed exchange turn kept as chat context
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Generation delegate trait
///
/// All calls are asynchronous; cancellation is dropping the future. Errors
/// are delegate-shaped (`GenerateError`); credit accounting and history are
/// the caller's concern.
#[async_trait]
pub trait MediaGenerator: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "gemini", "demo")
    fn name(&self) -> &str;

    /// Generate a still image for a prompt
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Artifact, GenerateError>;

    /// Stream a chat reply
    ///
    /// `history` is the prior conversation, oldest first, excluding
    /// `message`. Fragments are delivered through `on_chunk` as they
    /// arrive; the full reply is returned on completion. Fragments already
    /// delivered are not rolled back on failure.
    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String, GenerateError>;

    /// Animate a still image into a short video
    ///
    /// Long-running: implementations poll the provider until completion.
    /// Fails with `GenerateError::NotFound` when the configured key lacks
    /// access to the video model.
    async fn animate_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Artifact, GenerateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_round_trips_wire_form() {
        for ratio in AspectRatio::all() {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), *ratio);
        }
    }

    #[test]
    fn test_aspect_ratio_rejects_unknown() {
        assert!("2:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_artifact_extension_by_mime() {
        assert_eq!(Artifact::new(vec![], "image/jpeg").extension(), "jpg");
        assert_eq!(Artifact::new(vec![], "video/mp4").extension(), "mp4");
        assert_eq!(Artifact::new(vec![], "application/x-unknown").extension(), "bin");
    }
}
