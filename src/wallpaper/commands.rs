use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, State};
use tokio::sync::watch;

use super::download::save_image;
use super::studio::WallpaperStudio;
use super::types::{self, AspectRatio, AspectRatioOption, GeneratedImage, StudioSnapshot, View};
use super::view_model::StudioView;
use crate::error::AppError;
use crate::utils::{err_msg, log_error, log_info, log_warn, now_millis};

pub const STATE_EVENT: &str = "studio://state";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioUpdate {
    pub state: StudioSnapshot,
    pub view: StudioView,
}

impl From<StudioSnapshot> for StudioUpdate {
    fn from(state: StudioSnapshot) -> Self {
        let view = StudioView::from_snapshot(&state);
        Self { state, view }
    }
}

/// Pushes every studio change to the web view until the studio is dropped.
pub fn forward_updates(app: AppHandle, mut updates: watch::Receiver<StudioSnapshot>) {
    tauri::async_runtime::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if let Err(e) = app.emit(STATE_EVENT, StudioUpdate::from(snapshot)) {
                log_error(&app, "studio", format!("Failed to emit state update: {}", e));
            }
        }
    });
}

#[tauri::command]
pub fn studio_state(studio: State<'_, WallpaperStudio>) -> StudioSnapshot {
    studio.snapshot()
}

#[tauri::command]
pub fn studio_view(studio: State<'_, WallpaperStudio>) -> StudioView {
    StudioView::from_snapshot(&studio.snapshot())
}

#[tauri::command]
pub fn list_aspect_ratios() -> Vec<AspectRatioOption> {
    types::aspect_ratio_options()
}

#[tauri::command]
pub fn studio_set_prompt(studio: State<'_, WallpaperStudio>, prompt: String) -> StudioSnapshot {
    studio.set_prompt(prompt)
}

#[tauri::command]
pub fn studio_set_aspect_ratio(
    studio: State<'_, WallpaperStudio>,
    aspect_ratio: String,
) -> Result<StudioSnapshot, String> {
    let ratio: AspectRatio = aspect_ratio.parse()?;
    Ok(studio.set_aspect_ratio(ratio))
}

#[tauri::command]
pub async fn studio_submit(
    app: AppHandle,
    studio: State<'_, WallpaperStudio>,
) -> Result<StudioSnapshot, String> {
    log_info(&app, "studio", "submit requested");
    let snapshot = studio.submit().await.map_err(|e| refused(&app, e))?;
    if let Some(err) = snapshot.error.as_deref() {
        log_error(&app, "studio", format!("submit finished with error: {}", err));
    }
    Ok(snapshot)
}

#[tauri::command]
pub async fn studio_remix(
    app: AppHandle,
    studio: State<'_, WallpaperStudio>,
    image: GeneratedImage,
) -> Result<StudioSnapshot, String> {
    log_info(
        &app,
        "studio",
        format!("remix requested ({})", image.aspect_ratio),
    );
    studio.remix(&image).await.map_err(|e| refused(&app, e))
}

fn refused(app: &AppHandle, e: AppError) -> String {
    log_warn(app, "studio", format!("request refused: {}", e));
    e.into()
}

#[tauri::command]
pub fn studio_clear(studio: State<'_, WallpaperStudio>) -> StudioSnapshot {
    studio.clear()
}

#[tauri::command]
pub fn studio_toggle_favorite(
    app: AppHandle,
    studio: State<'_, WallpaperStudio>,
    image: GeneratedImage,
) -> StudioSnapshot {
    let (now_favorite, snapshot) = studio.toggle_favorite(&image);
    let action = if now_favorite { "added to" } else { "removed from" };
    log_info(&app, "favorites", format!("wallpaper {} favorites", action));
    snapshot
}

#[tauri::command]
pub fn studio_select(studio: State<'_, WallpaperStudio>, image: GeneratedImage) -> StudioSnapshot {
    studio.select(image)
}

#[tauri::command]
pub fn studio_deselect(studio: State<'_, WallpaperStudio>) -> StudioSnapshot {
    studio.deselect()
}

#[tauri::command]
pub fn studio_switch_view(studio: State<'_, WallpaperStudio>, view: View) -> StudioSnapshot {
    studio.switch_view(view)
}

#[tauri::command]
pub fn studio_pick_history(
    studio: State<'_, WallpaperStudio>,
    index: usize,
) -> Result<StudioSnapshot, String> {
    studio.pick_history(index).map_err(String::from)
}

#[tauri::command]
pub async fn wallpaper_download(app: AppHandle, src: String) -> Result<String, String> {
    #[cfg(target_os = "android")]
    let download_dir = std::path::PathBuf::from("/storage/emulated/0/Download");

    #[cfg(not(target_os = "android"))]
    let download_dir = app
        .path()
        .download_dir()
        .map_err(|e| {
            err_msg(
                module_path!(),
                line!(),
                format!("Failed to get downloads directory: {}", e),
            )
        })?;

    let file_path = save_image(&download_dir, &src, now_millis()?)?;
    let path_str = file_path.to_string_lossy().to_string();
    log_info(&app, "download", format!("Saved wallpaper to {}", path_str));
    Ok(path_str)
}
