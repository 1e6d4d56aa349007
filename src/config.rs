use crate::error::AppError;

pub const API_KEY_VAR: &str = "API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const IMAGEN_MODEL: &str = "imagen-4.0-generate-001";
pub const IMAGES_PER_REQUEST: u32 = 4;
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Everything the generation client needs, resolved once at startup.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: IMAGEN_MODEL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = resolve_base_url(Some(base_url));
        self
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_KEY_VAR) {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(AppError::Config(format!(
                "{} environment variable is not set.",
                API_KEY_VAR
            ))),
        }
    }

    pub fn predict_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:predict",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
pub fn resolve_base_url(custom_base_url: Option<&str>) -> String {
    match custom_base_url {
        Some(custom) if !custom.is_empty() => custom.trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
