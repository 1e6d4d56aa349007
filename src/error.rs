use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AppError {
    /// Local input problem; never reaches the network layer.
    Validation(String),
    /// A generation call is already outstanding.
    Busy,
    /// The image service returned nothing usable or the call failed.
    Generation(String),
    Config(String),
    Http(reqwest::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Other(String),
}

impl AppError {
    /// Wraps any failure from the generation call in the user-facing form.
    pub fn generation_failed(cause: impl Display) -> Self {
        AppError::Generation(format!("Failed to generate images: {}", cause))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(s) => write!(f, "{}", s),
            AppError::Busy => write!(f, "A generation is already in progress."),
            AppError::Generation(s) => write!(f, "{}", s),
            AppError::Config(s) => write!(f, "{}", s),
            AppError::Http(e) => write!(f, "{}", e),
            AppError::Json(e) => write!(f, "{}", e),
            AppError::Io(e) => write!(f, "{}", e),
            AppError::Other(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        AppError::Http(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Json(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Other(value)
    }
}

impl From<&str> for AppError {
    fn from(value: &str) -> Self {
        AppError::Other(value.to_string())
    }
}

impl From<AppError> for String {
    fn from(value: AppError) -> Self {
        value.to_string()
    }
}
