//! Gemini API client
//!
//! Handles communication with the Google Generative Language API: Imagen
//! for still images, Gemini for streaming chat, Veo for image-to-video.

use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model ids
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Persona sent as the chat system instruction
const SYSTEM_INSTRUCTION: &str = "You are Easel, a helpful and creative assistant.";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Veo operations are polled at this interval, as the API docs recommend
const POLL_INTERVAL_SECS: u64 = 10;

/// Gemini API client
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_model: String,
    chat_model: String,
    video_model: String,
}

/// Response of an Imagen `:predict` call
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

/// One SSE chunk of a `streamGenerateContent` response
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<StreamCandidate>,
}

#[derive(Debug, Deserialize)]
struct StreamCandidate {
    #[serde(default)]
    content: Option<StreamContent>,
}

#[derive(Debug, Deserialize)]
struct StreamContent {
    #[serde(default)]
    parts: Vec<StreamPart>,
}

#[derive(Debug, Deserialize)]
struct StreamPart {
    #[serde(default)]
    text: Option<String>,
}

/// A long-running Veo operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<ApiStatus>,
    #[serde(default)]
    response: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Error body the API returns on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiStatus>,
}

/// Strip the SSE framing from one line, yielding the JSON payload
fn sse_data(line: &str) -> Option<&str> {
    line.trim().strip_prefix("data:").map(str::trim_start)
}

/// Concatenate the text parts of one stream chunk
fn chunk_text(raw: &str) -> Result<String> {
    let chunk: StreamChunk =
        serde_json::from_str(raw).context("Failed to parse stream chunk")?;
    let mut text = String::new();
    for candidate in chunk.candidates {
        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(t) = part.text {
                    text.push_str(&t);
                }
            }
        }
    }
    Ok(text)
}

/// Pull the generated video URI out of a completed operation response
///
/// The REST shape nests it as `generateVideoResponse.generatedSamples[0]
/// .video.uri`; older responses use `generatedVideos`. Accept both.
fn extract_video_uri(response: &serde_json::Value) -> Option<String> {
    let inner = response.get("generateVideoResponse").unwrap_or(response);
    let samples = inner
        .get("generatedSamples")
        .or_else(|| inner.get("generatedVideos"))?
        .as_array()?;
    samples
        .first()?
        .get("video")?
        .get("uri")?
        .as_str()
        .map(str::to_string)
}

impl GeminiClient {
    /// Create a client for the production endpoint
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client for a specific endpoint (tests use a local one)
    pub fn with_endpoint(api_key: &str, base_url: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            anyhow::bail!("Gemini API key must not be empty");
        }

        let parsed = Url::parse(base_url).context("Invalid Gemini base URL")?;
        let loopback = matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1"));
        if parsed.scheme() != "https" && !loopback {
            anyhow::bail!("Gemini base URL must use HTTPS");
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        })
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_video_model(mut self, model: impl Into<String>) -> Self {
        self.video_model = model.into();
        self
    }

    fn model_url(&self, model: &str, verb: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, model, verb, self.api_key
        )
    }

    /// Generate one still image via Imagen
    async fn predict_image(&self, prompt: &str, aspect_ratio: &str) -> Result<(Vec<u8>, String)> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "outputMimeType": "image/jpeg",
                "aspectRatio": aspect_ratio,
            }
        });

        let response = self
            .client
            .post(self.model_url(&self.image_model, "predict"))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let response = Self::check_response(response).await?;

        let data: PredictResponse = response
            .json()
            .await
            .context("Failed to parse Imagen response")?;

        let prediction = data
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or_else(|| anyhow::anyhow!("No image was generated."))?;

        let encoded = prediction.bytes_base64_encoded.unwrap_or_default();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .context("Generated image was not valid base64")?;
        let mime = prediction
            .mime_type
            .unwrap_or_else(|| "image/jpeg".to_string());
        Ok((bytes, mime))
    }

    /// Stream a chat reply, invoking `on_chunk` per text fragment
    async fn run_chat_stream(
        &self,
        contents: Vec<serde_json::Value>,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<String> {
        let body = json!({
            "contents": contents,
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        });

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.chat_model, self.api_key
        );

        // No overall timeout here: the stream stays open for the whole reply.
        let mut response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut full = String::new();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let chunk = response
                .chunk()
                .await
                .map_err(|e| self.map_request_error(e))?;
            let Some(chunk) = chunk else { break };
            buf.extend_from_slice(&chunk);

            // SSE events are newline-delimited `data: {...}` lines
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(raw) = sse_data(&line) {
                    let text = chunk_text(raw)?;
                    if !text.is_empty() {
                        on_chunk(&text);
                        full.push_str(&text);
                    }
                }
            }
        }
        if !buf.is_empty() {
            let line = String::from_utf8_lossy(&buf);
            if let Some(raw) = sse_data(&line) {
                let text = chunk_text(raw)?;
                if !text.is_empty() {
                    on_chunk(&text);
                    full.push_str(&text);
                }
            }
        }

        Ok(full)
    }

    /// Animate a still image via Veo: start the operation, poll it to
    /// completion, download the resulting video
    async fn run_animation(&self, image: &[u8], mime_type: &str) -> Result<Vec<u8>> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = json!({
            "instances": [{
                "image": {
                    "bytesBase64Encoded": encoded,
                    "mimeType": mime_type,
                }
            }],
            "parameters": {
                "sampleCount": 1,
                "resolution": "720p",
            }
        });

        let response = self
            .client
            .post(self.model_url(&self.video_model, "predictLongRunning"))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let response = Self::check_response(response).await?;

        let mut operation: Operation = response
            .json()
            .await
            .context("Failed to parse Veo operation")?;

        while !operation.done {
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            operation = self.get_operation(&operation.name).await?;
        }

        if let Some(status) = operation.error {
            let detail = status
                .message
                .or(status.status)
                .unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("Video generation failed: {}", detail);
        }

        let uri = operation
            .response
            .as_ref()
            .and_then(extract_video_uri)
            .ok_or_else(|| {
                anyhow::anyhow!("Video generation completed, but no download link was found.")
            })?;

        self.download_video(&uri).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        let url = format!("{}/{}?key={}", self.base_url, name, self.api_key);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse Veo operation")
    }

    /// The download link requires the API key appended
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>> {
        let sep = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, sep, self.api_key);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if text.contains("NOT_FOUND") || text.contains("Requested entity was not found") {
                anyhow::bail!(
                    "NOT_FOUND: The requested entity was not found. \
                    Your API key might not have access to the Veo model."
                );
            }
            anyhow::bail!("Failed to download video file: HTTP {}. Details: {}", status, text);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;
        Ok(bytes.to_vec())
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> anyhow::Error {
        if error.is_timeout() {
            anyhow::anyhow!("Request timed out after {} seconds", REQUEST_TIMEOUT_SECS)
        } else if error.is_connect() {
            anyhow::anyhow!("Unable to connect to the Gemini API")
        } else {
            anyhow::anyhow!("Gemini request failed: {}", error)
        }
    }

    /// Surface non-2xx responses with the API's own error message
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .unwrap_or(body);
        if detail.is_empty() {
            anyhow::anyhow!("Gemini API error: HTTP {}", status)
        } else {
            anyhow::anyhow!("Gemini API error: HTTP {}: {}", status, detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_default_endpoint() {
        assert!(GeminiClient::new("test-key").is_ok());
    }

    #[test]
    fn test_rejects_empty_key() {
        let result = GeminiClient::new("   ");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_rejects_plain_http_endpoint() {
        let result = GeminiClient::with_endpoint("key", "http://example.com/v1beta");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTPS"));
    }

    #[test]
    fn test_allows_loopback_http_for_tests() {
        assert!(GeminiClient::with_endpoint("key", "http://127.0.0.1:8080/v1beta").is_ok());
    }

    #[test]
    fn test_sse_data_strips_framing() {
        assert_eq!(sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data(""), None);
        assert_eq!(sse_data(": keepalive"), None);
    }

    #[test]
    fn test_chunk_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}],"role":"model"}}]}"#;
        assert_eq!(chunk_text(raw).unwrap(), "Hello");
    }

    #[test]
    fn test_chunk_without_text_is_empty() {
        let raw = r#"{"candidates":[{"finishReason":"STOP"}]}"#;
        assert_eq!(chunk_text(raw).unwrap(), "");
    }

    #[test]
    fn test_extract_video_uri_rest_shape() {
        let value = serde_json::json!({
            "generateVideoResponse": {
                "generatedSamples": [
                    { "video": { "uri": "https://example.com/video/1" } }
                ]
            }
        });
        assert_eq!(
            extract_video_uri(&value).as_deref(),
            Some("https://example.com/video/1")
        );
    }

    #[test]
    fn test_extract_video_uri_sdk_shape() {
        let value = serde_json::json!({
            "generatedVideos": [
                { "video": { "uri": "https://example.com/video/2" } }
            ]
        });
        assert_eq!(
            extract_video_uri(&value).as_deref(),
            Some("https://example.com/video/2")
        );
    }

    #[test]
    fn test_extract_video_uri_missing() {
        let value = serde_json::json!({ "generateVideoResponse": {} });
        assert_eq!(extract_video_uri(&value), None);
    }
}

// =============================================================================
// MediaGenerator implementation
// =============================================================================

use async_trait::async_trait;

use crate::domain::result::GenerateError;
use crate::ports::{Artifact, AspectRatio, ChatTurn, MediaGenerator};

/// Whether a delegate failure is the access-denied shape
fn is_not_found(message: &str) -> bool {
    message.contains("NOT_FOUND") || message.contains("Requested entity was not found")
}

fn to_generate_error(error: anyhow::Error) -> GenerateError {
    let message = format!("{:#}", error);
    if is_not_found(&message) {
        GenerateError::NotFound(message)
    } else {
        GenerateError::Failed(message)
    }
}

#[async_trait]
impl MediaGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> std::result::Result<Artifact, GenerateError> {
        let (bytes, mime) = self
            .predict_image(prompt, aspect_ratio.as_str())
            .await
            .map_err(to_generate_error)?;
        Ok(Artifact::new(bytes, mime))
    }

    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> std::result::Result<String, GenerateError> {
        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.as_str(),
                    "parts": [{ "text": turn.text }],
                })
            })
            .collect();
        contents.push(json!({
            "role": "user",
            "parts": [{ "text": message }],
        }));

        self.run_chat_stream(contents, on_chunk)
            .await
            .map_err(to_generate_error)
    }

    async fn animate_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> std::result::Result<Artifact, GenerateError> {
        let bytes = self
            .run_animation(image, mime_type)
            .await
            .map_err(to_generate_error)?;
        Ok(Artifact::new(bytes, "video/mp4"))
    }
}
