use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tauri::{AppHandle, Manager};

const LOG_PREFIX: &str = "vibepaper-";
const LOG_EXTENSION: &str = "log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub component: String,
    pub function: Option<String>,
    pub message: String,
}

/// Installs the process-wide `tracing` subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Appends log lines to one file per day under the app log directory.
pub struct LogManager {
    file: Mutex<Option<(PathBuf, File)>>,
    log_dir: PathBuf,
}

impl LogManager {
    pub fn new(app_handle: &AppHandle) -> Result<Self, Box<dyn std::error::Error>> {
        let log_dir = app_handle
            .path()
            .app_log_dir()
            .map_err(|e| format!("Failed to get log directory: {}", e))?;
        Ok(Self::with_dir(log_dir)?)
    }

    pub fn with_dir(log_dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            file: Mutex::new(None),
            log_dir,
        })
    }

    fn current_log_file_path(&self) -> PathBuf {
        let now = chrono::Local::now();
        let filename = format!("{}{}.{}", LOG_PREFIX, now.format("%Y-%m-%d"), LOG_EXTENSION);
        self.log_dir.join(filename)
    }

    pub fn write_log(&self, entry: LogEntry) -> Result<(), String> {
        let log_path = self.current_log_file_path();
        let mut file_lock = self.file.lock().map_err(|e| format!("Lock error: {}", e))?;

        // Reopen when the day rolled over or the file was removed underneath us.
        let reopen = match file_lock.as_ref() {
            Some((path, _)) => *path != log_path || !log_path.exists(),
            None => true,
        };

        if reopen {
            let new_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| format!("Failed to open log file: {}", e))?;
            *file_lock = Some((log_path, new_file));
        }

        if let Some((_, ref mut file)) = *file_lock {
            let scope = match entry.function {
                Some(ref f) => format!("{}/{}", entry.component, f),
                None => entry.component.clone(),
            };

            let log_line = format!(
                "[{}] {} {} {}\n",
                entry.timestamp, scope, entry.level, entry.message
            );

            file.write_all(log_line.as_bytes())
                .map_err(|e| format!("Failed to write log: {}", e))?;
            file.flush()
                .map_err(|e| format!("Failed to flush log: {}", e))?;
        }

        Ok(())
    }

    pub fn list_log_files(&self) -> Result<Vec<String>, String> {
        let entries = fs::read_dir(&self.log_dir)
            .map_err(|e| format!("Failed to read log directory: {}", e))?;

        let mut log_files: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if is_log_file(&path) {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect();

        log_files.sort_by(|a, b| b.cmp(a));
        Ok(log_files)
    }

    pub fn read_log_file(&self, filename: &str) -> Result<String, String> {
        let path = self.resolve(filename)?;
        fs::read_to_string(path).map_err(|e| format!("Failed to read log file: {}", e))
    }

    pub fn clear_all_logs(&self) -> Result<(), String> {
        let mut file_lock = self.file.lock().map_err(|e| format!("Lock error: {}", e))?;
        *file_lock = None;

        let entries = fs::read_dir(&self.log_dir)
            .map_err(|e| format!("Failed to read log directory: {}", e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if is_log_file(&path) {
                fs::remove_file(path).map_err(|e| format!("Failed to delete log file: {}", e))?;
            }
        }

        Ok(())
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, String> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err("Invalid log file name".to_string());
        }
        let path = self.log_dir.join(filename);
        if !is_log_file(&path) {
            return Err("Log file not found".to_string());
        }
        Ok(path)
    }
}

fn is_log_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(LOG_EXTENSION)
}

#[tauri::command]
pub async fn log_to_file(
    app_handle: AppHandle,
    timestamp: String,
    level: String,
    component: String,
    function: Option<String>,
    message: String,
) -> Result<(), String> {
    let logger = app_handle.state::<LogManager>();
    logger.write_log(LogEntry {
        timestamp,
        level,
        component,
        function,
        message,
    })
}

#[tauri::command]
pub async fn list_log_files(app_handle: AppHandle) -> Result<Vec<String>, String> {
    app_handle.state::<LogManager>().list_log_files()
}

#[tauri::command]
pub async fn read_log_file(app_handle: AppHandle, filename: String) -> Result<String, String> {
    app_handle.state::<LogManager>().read_log_file(&filename)
}

#[tauri::command]
pub async fn clear_all_logs(app_handle: AppHandle) -> Result<(), String> {
    app_handle.state::<LogManager>().clear_all_logs()
}
