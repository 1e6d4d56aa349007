use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::types::AspectRatio;
use crate::config::{GenerationConfig, IMAGES_PER_REQUEST, OUTPUT_MIME_TYPE};
use crate::error::AppError;

pub const NO_IMAGES_MESSAGE: &str = "No images were generated.";

/// Request/response mapping for the Imagen `predict` endpoint.
pub struct ImagenAdapter;

#[derive(Serialize)]
struct ImagenInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenOutputOptions<'a> {
    mime_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_options: ImagenOutputOptions<'a>,
}

#[derive(Serialize)]
struct ImagenRequest<'a> {
    instances: Vec<ImagenInstance<'a>>,
    parameters: ImagenParameters<'a>,
}

#[derive(Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct ImagenErrorEnvelope {
    error: ImagenErrorBody,
}

#[derive(Deserialize)]
struct ImagenErrorBody {
    message: String,
}

impl ImagenAdapter {
    pub fn endpoint(&self, config: &GenerationConfig) -> String {
        config.predict_url()
    }

    pub fn headers(&self, api_key: &str) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("x-goog-api-key".into(), api_key.to_string());
        headers.insert("Content-Type".into(), "application/json".into());
        headers
    }

    pub fn body(&self, prompt: &str, aspect_ratio: AspectRatio) -> Value {
        let req = ImagenRequest {
            instances: vec![ImagenInstance { prompt }],
            parameters: ImagenParameters {
                sample_count: IMAGES_PER_REQUEST,
                aspect_ratio: aspect_ratio.as_str(),
                output_options: ImagenOutputOptions {
                    mime_type: OUTPUT_MIME_TYPE,
                },
            },
        };

        serde_json::to_value(req).unwrap_or_else(|_| json!({}))
    }

    /// Turns a successful response into renderable `data:` URIs, in service order.
    pub fn parse_response(&self, response: Value) -> Result<Vec<String>, AppError> {
        let parsed: ImagenResponse = serde_json::from_value(response).map_err(AppError::from)?;

        let sources: Vec<String> = parsed
            .predictions
            .into_iter()
            .filter_map(|prediction| {
                let bytes = prediction.bytes_base64_encoded?;
                if bytes.is_empty() {
                    return None;
                }
                let mime = prediction
                    .mime_type
                    .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string());
                Some(format!("data:{};base64,{}", mime, bytes))
            })
            .collect();

        if sources.is_empty() {
            return Err(AppError::Generation(NO_IMAGES_MESSAGE.to_string()));
        }

        Ok(sources)
    }

    /// Best-effort extraction of the service's own message from an error body.
    pub fn error_message(&self, body: &str) -> String {
        match serde_json::from_str::<ImagenErrorEnvelope>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}
