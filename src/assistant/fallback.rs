//! Primary-then-fallback image generation.

use std::fmt;

use crate::error::GenerationError;

use super::generator::AssetGenerator;

/// Which collaborator produced an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub url: String,
    pub source: AssetSource,
}

/// One primary attempt, then at most one fallback attempt. No backoff and no
/// further retries.
pub struct FallbackChain<P, F> {
    primary: P,
    fallback: F,
}

impl<P: AssetGenerator, F: AssetGenerator> FallbackChain<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<ImageAsset, GenerationError> {
        self.generate_image_observed(prompt, None).await
    }

    /// Like [`generate_image`](Self::generate_image), calling `on_fallback`
    /// with the primary's error right before the fallback runs.
    pub async fn generate_image_observed(
        &self,
        prompt: &str,
        on_fallback: Option<&(dyn Fn(&GenerationError) + Send + Sync)>,
    ) -> Result<ImageAsset, GenerationError> {
        let primary_err = match self.primary.generate_image(prompt).await {
            Ok(url) => {
                return Ok(ImageAsset {
                    url,
                    source: AssetSource::Primary,
                })
            }
            Err(err) => err,
        };

        tracing::warn!(
            primary = self.primary.name(),
            fallback = self.fallback.name(),
            error = %primary_err,
            "primary image service failed, trying fallback"
        );
        if let Some(observer) = on_fallback {
            observer(&primary_err);
        }

        match self.fallback.generate_image(prompt).await {
            Ok(url) => Ok(ImageAsset {
                url,
                source: AssetSource::Fallback,
            }),
            Err(fallback_err) => {
                tracing::error!(error = %fallback_err, "fallback image service failed");
                Err(GenerationError::Exhausted {
                    primary: primary_err.to_string(),
                    fallback: fallback_err.to_string(),
                })
            }
        }
    }
}

impl<P: fmt::Debug, F: fmt::Debug> fmt::Debug for FallbackChain<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("primary", &self.primary)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts image attempts; fails when `fails` is set.
    #[derive(Debug)]
    struct Counting {
        name: &'static str,
        fails: bool,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(name: &'static str, fails: bool) -> Self {
            Self {
                name,
                fails,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssetGenerator for Counting {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(GenerationError::failed(self.name, "down"))
            } else {
                Ok(format!("{}://{prompt}", self.name))
            }
        }

        async fn edit_image(&self, _: &str, _: &str) -> Result<String, GenerationError> {
            Err(GenerationError::failed(self.name, "not under test"))
        }

        async fn generate_video(&self, _: &str) -> Result<String, GenerationError> {
            Err(GenerationError::failed(self.name, "not under test"))
        }

        async fn generate_video_from_images(&self, _: &[String]) -> Result<String, GenerationError> {
            Err(GenerationError::failed(self.name, "not under test"))
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let chain = FallbackChain::new(Counting::new("a", false), Counting::new("b", false));
        let asset = chain.generate_image("cat").await.unwrap();
        assert_eq!(asset.url, "a://cat");
        assert_eq!(asset.source, AssetSource::Primary);
        assert_eq!(chain.primary().calls(), 1);
        assert_eq!(chain.fallback().calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback() {
        let chain = FallbackChain::new(Counting::new("a", true), Counting::new("b", false));
        let asset = chain.generate_image("cat").await.unwrap();
        assert_eq!(asset, ImageAsset { url: "b://cat".into(), source: AssetSource::Fallback });
        assert_eq!(chain.primary().calls(), 1);
        assert_eq!(chain.fallback().calls(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_after_exactly_two_attempts() {
        let chain = FallbackChain::new(Counting::new("a", true), Counting::new("b", true));
        let err = chain.generate_image("cat").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Exhausted {
                primary: "a failed: down".into(),
                fallback: "b failed: down".into(),
            }
        );
        assert_eq!(chain.primary().calls() + chain.fallback().calls(), 2);
    }

    #[tokio::test]
    async fn test_observer_runs_only_on_fallback() {
        let seen = AtomicUsize::new(0);
        let notify: &(dyn Fn(&GenerationError) + Send + Sync) = &|_| {
            seen.fetch_add(1, Ordering::SeqCst);
        };

        let chain = FallbackChain::new(Counting::new("a", false), Counting::new("b", false));
        chain.generate_image_observed("x", Some(notify)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        let chain = FallbackChain::new(Counting::new("a", true), Counting::new("b", false));
        chain.generate_image_observed("x", Some(notify)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
