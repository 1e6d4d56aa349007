use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub fn download_file_name(timestamp_ms: u64) -> String {
    format!("vibepaper-{}.jpeg", timestamp_ms)
}

/// Decodes a `data:` URI or bare base64 payload into raw image bytes.
pub fn decode_image_source(src: &str) -> Result<Vec<u8>, AppError> {
    let data = if src.starts_with("data:") {
        let (header, payload) = src
            .split_once(',')
            .ok_or_else(|| AppError::from("Invalid data URL format"))?;
        if !header.ends_with(";base64") {
            return Err("Only base64 data URLs can be saved".into());
        }
        payload
    } else {
        src
    };

    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::from(format!("Failed to decode base64: {}", e)))
}

/// Writes the image into `dir` as `vibepaper-<timestamp>.jpeg` and returns the path.
pub fn save_image(dir: &Path, src: &str, timestamp_ms: u64) -> Result<PathBuf, AppError> {
    let bytes = decode_image_source(src)?;

    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let file_path = dir.join(download_file_name(timestamp_ms));
    fs::write(&file_path, bytes)?;
    Ok(file_path)
}
