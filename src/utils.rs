use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tauri::Manager;

use crate::logger::{LogEntry, LogManager};

pub const SERVICE: &str = "vibepaper";

pub fn vibepaper_dir(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    let base = app.path().app_data_dir().map_err(|e| e.to_string())?;
    Ok(base.join(SERVICE))
}

pub fn ensure_vibepaper_dir(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    let dir = vibepaper_dir(app)?;
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir)
}

pub fn now_millis() -> Result<u64, String> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_millis() as u64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

fn emit(app: &tauri::AppHandle, level: LogLevel, component: &str, message: &str) {
    match level {
        LogLevel::Info => tracing::info!(component, "{}", message),
        LogLevel::Warn => tracing::warn!(component, "{}", message),
        LogLevel::Error => tracing::error!(component, "{}", message),
    }

    if let Some(logger) = app.try_state::<LogManager>() {
        let entry = LogEntry {
            timestamp: chrono::Local::now().to_rfc3339(),
            level: level.as_str().to_string(),
            component: component.to_string(),
            function: None,
            message: message.to_string(),
        };
        if let Err(e) = logger.write_log(entry) {
            tracing::warn!(component = "logger", "failed to write log file: {}", e);
        }
    }
}

pub fn log_info(app: &tauri::AppHandle, component: &str, message: impl AsRef<str>) {
    emit(app, LogLevel::Info, component, message.as_ref());
}

pub fn log_warn(app: &tauri::AppHandle, component: &str, message: impl AsRef<str>) {
    emit(app, LogLevel::Warn, component, message.as_ref());
}

pub fn log_error(app: &tauri::AppHandle, component: &str, message: impl AsRef<str>) {
    emit(app, LogLevel::Error, component, message.as_ref());
}

/// Builds an error string tagged with its origin and records it at error level.
pub fn err_msg(module: &str, line: u32, message: impl AsRef<str>) -> String {
    let message = message.as_ref();
    tracing::error!(component = module, line, "{}", message);
    message.to_string()
}
