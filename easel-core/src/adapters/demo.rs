//! Demo generation delegate
//!
//! Produces deterministic media offline so the whole product can be
//! exercised without an API key: labeled SVG stills, canned streamed chat
//! replies and a stub MP4 clip. The same prompt always yields the same
//! bytes.

use async_trait::async_trait;

use crate::domain::result::GenerateError;
use crate::ports::{Artifact, AspectRatio, ChatTurn, MediaGenerator};

/// Background colors the demo renderer cycles through
const PALETTE: &[&str] = &["#4f46e5", "#0d9488", "#b45309", "#be123c", "#334155"];

/// Smallest well-formed MP4: an ftyp box and an empty mdat box
const DEMO_MP4: &[u8] =
    b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2\x00\x00\x00\x08mdat";

/// FNV-1a, used to pick stable colors and replies per prompt
fn seed(text: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in text.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Offline stand-in for the hosted generation service
#[derive(Debug)]
pub struct DemoGenerator;

impl DemoGenerator {
    pub fn new() -> Self {
        Self
    }

    fn render_svg(prompt: &str, ratio: AspectRatio) -> String {
        let (width, height) = ratio.dimensions();
        let fill = PALETTE[(seed(prompt) % PALETTE.len() as u64) as usize];
        let label = escape_xml(prompt);
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<rect width="100%" height="100%" fill="{fill}"/>"#,
                r##"<rect x="0" y="{band_y}" width="100%" height="{band_h}" fill="#000000" opacity="0.35"/>"##,
                r##"<text x="50%" y="50%" fill="#ffffff" font-family="sans-serif" font-size="{font}" text-anchor="middle" dominant-baseline="middle">{label}</text>"##,
                r##"<text x="50%" y="{foot_y}" fill="#ffffff" font-family="sans-serif" font-size="{small}" text-anchor="middle" opacity="0.7">Easel demo render</text>"##,
                "</svg>"
            ),
            w = width,
            h = height,
            fill = fill,
            band_y = height / 2 - height / 10,
            band_h = height / 5,
            font = height / 18,
            foot_y = height - height / 20,
            small = height / 36,
            label = label,
        )
    }

    fn canned_reply(history: &[ChatTurn], message: &str) -> String {
        let openers = [
            "Happy to riff on that.",
            "Here's one way to look at it.",
            "Good question.",
        ];
        let opener = openers[(seed(message) % openers.len() as u64) as usize];
        format!(
            "{} You asked about \"{}\" (turn {} of this conversation). \
             This is a demo reply generated offline; add an API key with \
             'ez config set-key' to talk to the real model.",
            opener,
            message,
            history.len() / 2 + 1
        )
    }
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaGenerator for DemoGenerator {
    fn name(&self) -> &str {
        "demo"
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Artifact, GenerateError> {
        let svg = Self::render_svg(prompt, aspect_ratio);
        Ok(Artifact::new(svg.into_bytes(), "image/svg+xml"))
    }

    async fn stream_chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String, GenerateError> {
        let reply = Self::canned_reply(history, message);

        // Deliver in small fragments so callers exercise their streaming path
        let mut rest = reply.as_str();
        while !rest.is_empty() {
            let cut = rest
                .char_indices()
                .nth(24)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let (head, tail) = rest.split_at(cut);
            on_chunk(head);
            rest = tail;
        }

        Ok(reply)
    }

    async fn animate_image(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<Artifact, GenerateError> {
        Ok(Artifact::new(DEMO_MP4.to_vec(), "video/mp4"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_image_is_svg_with_prompt_and_dimensions() {
        let generator = DemoGenerator::new();
        let artifact = generator
            .generate_image("a red fox", AspectRatio::Wide16x9)
            .await
            .unwrap();

        assert_eq!(artifact.mime_type, "image/svg+xml");
        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.contains("a red fox"));
        assert!(svg.contains(r#"width="1280""#));
        assert!(svg.contains(r#"height="720""#));
    }

    #[tokio::test]
    async fn test_prompt_text_is_escaped() {
        let generator = DemoGenerator::new();
        let artifact = generator
            .generate_image("cats < dogs & \"birds\"", AspectRatio::Square)
            .await
            .unwrap();

        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.contains("cats &lt; dogs &amp; &quot;birds&quot;"));
    }

    #[tokio::test]
    async fn test_same_prompt_same_bytes() {
        let generator = DemoGenerator::new();
        let a = generator
            .generate_image("stable", AspectRatio::Square)
            .await
            .unwrap();
        let b = generator
            .generate_image("stable", AspectRatio::Square)
            .await
            .unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn test_chat_stream_matches_returned_reply() {
        let generator = DemoGenerator::new();
        let mut streamed = String::new();
        let reply = generator
            .stream_chat(&[], "what is color theory?", &mut |chunk| {
                streamed.push_str(chunk)
            })
            .await
            .unwrap();

        assert_eq!(streamed, reply);
        assert!(reply.contains("what is color theory?"));
    }

    #[tokio::test]
    async fn test_animation_is_mp4() {
        let generator = DemoGenerator::new();
        let artifact = generator.animate_image(b"png", "image/png").await.unwrap();
        assert_eq!(artifact.mime_type, "video/mp4");
        assert_eq!(&artifact.bytes[4..8], b"ftyp");
    }
}
