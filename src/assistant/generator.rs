//! Asset generation collaborators.
//!
//! [`AssetGenerator`] is the seam the session and the fallback chain talk to.
//! The two mocks stand in for the primary and the fallback image services:
//! they sleep for a configurable time and hand back placeholder URLs.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AssistantConfig;
use crate::error::GenerationError;

pub const SAMPLE_VIDEO_URL: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";
pub const SAMPLE_SLIDESHOW_URL: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4";

/// Characters of the prompt that go into a placeholder seed.
const SEED_PREFIX_CHARS: usize = 20;

/// A service that turns prompts into asset URLs.
#[async_trait]
pub trait AssetGenerator: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn edit_image(&self, image_url: &str, prompt: &str) -> Result<String, GenerationError>;

    async fn generate_video(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn generate_video_from_images(
        &self,
        image_urls: &[String],
    ) -> Result<String, GenerationError>;
}

/// Seeded placeholder image URL. The seed is `prefix` + the first 20
/// characters of `prompt` + `suffix`, percent-encoded the way browsers'
/// `encodeURIComponent` does it, so the same prompt maps to the same image.
pub fn placeholder_image_url(prefix: &str, prompt: &str, suffix: &str) -> String {
    let head: String = prompt.chars().take(SEED_PREFIX_CHARS).collect();
    let seed = format!("{prefix}{head}{suffix}");
    format!("https://picsum.photos/seed/{}/512/512", encode_component(&seed))
}

/// Escapes left alone by `encodeURIComponent` but not by `urlencoding`.
const COMPONENT_UNRESERVED: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// `urlencoding` output is unreserved ASCII and `%XX` triples only, and a
/// literal `%` comes out as `%25`, so restoring these triples is exact.
fn encode_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escaped, plain) in COMPONENT_UNRESERVED {
        if encoded.contains(escaped) {
            encoded = encoded.replace(escaped, plain);
        }
    }
    encoded
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Primary generator. Supports every operation; image generation fails at
/// the configured rate.
#[derive(Debug)]
pub struct MockPrimaryGenerator {
    config: AssistantConfig,
    rng: Mutex<StdRng>,
}

impl MockPrimaryGenerator {
    pub fn new(config: AssistantConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic failure pattern for tests.
    pub fn seeded(config: AssistantConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: AssistantConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn roll_failure(&self) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f32>() < self.config.primary_failure_rate
    }
}

#[async_trait]
impl AssetGenerator for MockPrimaryGenerator {
    fn name(&self) -> &str {
        "primary"
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::info!(service = self.name(), prompt, "generating image");
        // Decide before suspending so the lock never crosses an await
        let fail = self.roll_failure();
        simulate_latency(self.config.image_delay()).await;

        if fail {
            tracing::warn!(service = self.name(), "image generation failed");
            return Err(GenerationError::failed(
                self.name(),
                "mock API failed to generate image",
            ));
        }
        let url = placeholder_image_url("", prompt, "");
        tracing::info!(service = self.name(), url = %url, "image generated");
        Ok(url)
    }

    async fn edit_image(&self, image_url: &str, prompt: &str) -> Result<String, GenerationError> {
        tracing::info!(service = self.name(), image_url, prompt, "editing image");
        simulate_latency(self.config.image_delay()).await;
        Ok(placeholder_image_url("", prompt, "edited"))
    }

    async fn generate_video(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::info!(service = self.name(), prompt, "generating video");
        simulate_latency(self.config.video_delay()).await;
        Ok(SAMPLE_VIDEO_URL.to_string())
    }

    async fn generate_video_from_images(
        &self,
        image_urls: &[String],
    ) -> Result<String, GenerationError> {
        tracing::info!(service = self.name(), images = image_urls.len(), "animating images");
        simulate_latency(self.config.video_from_images_delay()).await;
        Ok(SAMPLE_SLIDESHOW_URL.to_string())
    }
}

/// Reliable image-only fallback.
#[derive(Debug, Clone)]
pub struct MockFallbackGenerator {
    delay: Duration,
}

impl MockFallbackGenerator {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            delay: config.fallback_delay(),
        }
    }

    fn unsupported(&self, operation: &'static str) -> GenerationError {
        GenerationError::Unsupported {
            service: self.name().to_string(),
            operation,
        }
    }
}

#[async_trait]
impl AssetGenerator for MockFallbackGenerator {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::info!(service = self.name(), prompt, "generating image");
        simulate_latency(self.delay).await;
        Ok(placeholder_image_url("hf-", prompt, ""))
    }

    async fn edit_image(&self, _image_url: &str, _prompt: &str) -> Result<String, GenerationError> {
        Err(self.unsupported("image editing"))
    }

    async fn generate_video(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(self.unsupported("video generation"))
    }

    async fn generate_video_from_images(
        &self,
        _image_urls: &[String],
    ) -> Result<String, GenerationError> {
        Err(self.unsupported("video generation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_failing() -> AssistantConfig {
        AssistantConfig {
            primary_failure_rate: 1.0,
            ..AssistantConfig::instant()
        }
    }

    fn never_failing() -> AssistantConfig {
        AssistantConfig {
            primary_failure_rate: 0.0,
            ..AssistantConfig::instant()
        }
    }

    #[test]
    fn test_placeholder_url_truncates_and_encodes() {
        assert_eq!(
            placeholder_image_url("", "a red fox", ""),
            "https://picsum.photos/seed/a%20red%20fox/512/512"
        );
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(
            placeholder_image_url("hf-", long, ""),
            "https://picsum.photos/seed/hf-abcdefghijklmnopqrst/512/512"
        );
        assert_eq!(
            placeholder_image_url("", "cat", "edited"),
            "https://picsum.photos/seed/catedited/512/512"
        );
    }

    #[test]
    fn test_placeholder_url_matches_browser_encoding() {
        assert_eq!(
            placeholder_image_url("", "logo (retro)!", ""),
            "https://picsum.photos/seed/logo%20(retro)!/512/512"
        );
        assert_eq!(
            placeholder_image_url("", "it's *bold*", ""),
            "https://picsum.photos/seed/it's%20*bold*/512/512"
        );
        // Reserved characters and literal percent signs stay escaped.
        assert_eq!(
            placeholder_image_url("", "100%21 a/b?c&d", ""),
            "https://picsum.photos/seed/100%2521%20a%2Fb%3Fc%26d/512/512"
        );
    }

    #[test]
    fn test_placeholder_url_counts_chars_not_bytes() {
        let prompt = "é".repeat(30);
        let url = placeholder_image_url("", &prompt, "");
        assert_eq!(url.matches("%C3%A9").count(), 20);
    }

    #[tokio::test]
    async fn test_primary_failure_rate_extremes() {
        let primary = MockPrimaryGenerator::seeded(always_failing(), 1);
        let err = primary.generate_image("boat").await.unwrap_err();
        assert!(matches!(err, GenerationError::Failed { ref service, .. } if service == "primary"));

        let primary = MockPrimaryGenerator::seeded(never_failing(), 1);
        for _ in 0..20 {
            assert!(primary.generate_image("boat").await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_primary_other_operations_succeed() {
        let primary = MockPrimaryGenerator::seeded(always_failing(), 7);
        assert_eq!(
            primary.edit_image("https://x", "blue sky").await.unwrap(),
            "https://picsum.photos/seed/blue%20skyedited/512/512"
        );
        assert_eq!(primary.generate_video("trailer").await.unwrap(), SAMPLE_VIDEO_URL);
        let urls = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            primary.generate_video_from_images(&urls).await.unwrap(),
            SAMPLE_SLIDESHOW_URL
        );
    }

    #[tokio::test]
    async fn test_fallback_is_image_only() {
        let fallback = MockFallbackGenerator::new(&AssistantConfig::instant());
        assert_eq!(
            fallback.generate_image("boat").await.unwrap(),
            "https://picsum.photos/seed/hf-boat/512/512"
        );
        assert!(matches!(
            fallback.generate_video("x").await,
            Err(GenerationError::Unsupported { .. })
        ));
        assert!(matches!(
            fallback.edit_image("u", "p").await,
            Err(GenerationError::Unsupported { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_waits_for_delay() {
        let fallback = MockFallbackGenerator::new(&AssistantConfig::default());
        let started = tokio::time::Instant::now();
        fallback.generate_image("boat").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }
}
