mod config;
mod error;
mod logger;
mod utils;
mod wallpaper;

use std::sync::Arc;

use anyhow::Context;
use tauri::{AppHandle, Manager};

use config::GenerationConfig;
use wallpaper::client::ImagenClient;
use wallpaper::collections::{Collections, JsonFileStore};
use wallpaper::commands;
use wallpaper::studio::WallpaperStudio;

fn build_studio(app: &AppHandle, config: GenerationConfig) -> anyhow::Result<WallpaperStudio> {
    let client = ImagenClient::new(config).context("Failed to build image generation client")?;
    let data_dir = utils::ensure_vibepaper_dir(app)
        .map_err(anyhow::Error::msg)
        .context("Failed to prepare app data directory")?;
    let collections = Collections::load(JsonFileStore::new(data_dir));
    Ok(WallpaperStudio::new(Arc::new(client), collections))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logger::init_tracing();

    // Without the credential nothing can be generated, so no window is shown.
    let config = match GenerationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(component = "startup", "{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            let log_manager = logger::LogManager::new(app.handle())?;
            app.manage(log_manager);

            let studio = build_studio(app.handle(), config)?;
            commands::forward_updates(app.handle().clone(), studio.subscribe());
            app.manage(studio);

            utils::log_info(app.handle(), "startup", "VibePaper ready");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::studio_state,
            commands::studio_view,
            commands::list_aspect_ratios,
            commands::studio_set_prompt,
            commands::studio_set_aspect_ratio,
            commands::studio_submit,
            commands::studio_remix,
            commands::studio_clear,
            commands::studio_toggle_favorite,
            commands::studio_select,
            commands::studio_deselect,
            commands::studio_switch_view,
            commands::studio_pick_history,
            commands::wallpaper_download,
            logger::log_to_file,
            logger::list_log_files,
            logger::read_log_file,
            logger::clear_all_logs,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
