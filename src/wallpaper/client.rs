use async_trait::async_trait;

use super::imagen::ImagenAdapter;
use super::types::{AspectRatio, GeneratedImage};
use crate::config::GenerationConfig;
use crate::error::AppError;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a vibe to generate.";

/// Text-to-image backend used by the studio. One attempt per call, no retries.
#[async_trait]
pub trait WallpaperGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<GeneratedImage>, AppError>;
}

pub struct ImagenClient {
    config: GenerationConfig,
    http: reqwest::Client,
    adapter: ImagenAdapter,
}

impl ImagenClient {
    pub fn new(config: GenerationConfig) -> Result<Self, AppError> {
        // No timeout: a slow call keeps the studio loading until it settles.
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            config,
            http,
            adapter: ImagenAdapter,
        })
    }

    async fn request_sources(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<String>, AppError> {
        let url = self.adapter.endpoint(&self.config);
        tracing::info!(
            component = "image_generator",
            "Requesting wallpapers from {} (ratio {})",
            url,
            aspect_ratio
        );

        let mut req_builder = self.http.post(&url);
        for (key, value) in self.adapter.headers(&self.config.api_key) {
            req_builder = req_builder.header(key, value);
        }
        req_builder = req_builder.json(&self.adapter.body(prompt, aspect_ratio));

        let response = req_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Other(format!(
                "API error {}: {}",
                status,
                self.adapter.error_message(&error_text)
            )));
        }

        let response_json: serde_json::Value = response.json().await?;
        self.adapter.parse_response(response_json)
    }
}

#[async_trait]
impl WallpaperGenerator for ImagenClient {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<GeneratedImage>, AppError> {
        if prompt.is_empty() {
            return Err(AppError::Validation(EMPTY_PROMPT_MESSAGE.to_string()));
        }

        match self.request_sources(prompt, aspect_ratio).await {
            Ok(sources) => {
                tracing::info!(
                    component = "image_generator",
                    "Received {} wallpapers",
                    sources.len()
                );
                Ok(tag_sources(sources, prompt, aspect_ratio))
            }
            Err(e) => {
                tracing::error!(component = "image_generator", "Error generating wallpapers: {}", e);
                Err(AppError::generation_failed(e))
            }
        }
    }
}

/// Attaches the originating prompt and ratio to each returned source, keeping service order.
pub fn tag_sources(
    sources: Vec<String>,
    prompt: &str,
    aspect_ratio: AspectRatio,
) -> Vec<GeneratedImage> {
    sources
        .into_iter()
        .map(|src| GeneratedImage::new(src, prompt, aspect_ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_every_source_with_prompt_and_ratio() {
        let images = tag_sources(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "misty forest",
            AspectRatio::Square,
        );
        assert_eq!(images.len(), 4);
        assert!(images
            .iter()
            .all(|img| img.prompt == "misty forest" && img.aspect_ratio == AspectRatio::Square));
        assert_eq!(images[0].src, "a");
        assert_eq!(images[3].src, "d");
    }

    #[tokio::test]
    async fn empty_prompt_never_reaches_network() {
        // Unroutable base URL: reaching the network would surface a generation error instead.
        let config = GenerationConfig::new("k").with_base_url("http://127.0.0.1:9");
        let client = ImagenClient::new(config).unwrap();
        match client.generate("", AspectRatio::Phone).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, EMPTY_PROMPT_MESSAGE),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_maps_to_generation_error() {
        let config = GenerationConfig::new("k").with_base_url("http://127.0.0.1:9");
        let client = ImagenClient::new(config).unwrap();
        match client.generate("neon dusk", AspectRatio::Phone).await {
            Err(AppError::Generation(msg)) => {
                assert!(msg.starts_with("Failed to generate images: "))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
