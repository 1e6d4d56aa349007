//! Render models for the web view, derived from a [`StudioSnapshot`] and nothing else.

use serde::Serialize;

use super::types::{aspect_ratio_options, AspectRatio, AspectRatioOption, GeneratedImage, StudioSnapshot, View};

pub const PROMPT_PLACEHOLDER: &str = "e.g., rainy cyberpunk lo-fi";
pub const WELCOME_TITLE: &str = "Welcome to VibePaper";
pub const WELCOME_BODY: &str = "Describe a vibe, and we'll generate unique wallpapers for you.";
pub const FAVORITES_EMPTY_LINES: [&str; 2] = [
    "Your favorite wallpapers will appear here.",
    "Click the heart icon on an image to save it.",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub prompt: String,
    pub placeholder: &'static str,
    pub aspect_ratio: AspectRatio,
    pub aspect_ratio_options: Vec<AspectRatioOption>,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryChip {
    pub index: usize,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabView {
    pub view: View,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub index: usize,
    pub src: String,
    pub alt: String,
    pub favorited: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Content {
    Empty,
    Welcome { title: &'static str, body: &'static str },
    Grid { tiles: Vec<Tile> },
    FavoritesEmpty { lines: [&'static str; 2] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayAction {
    ToggleFavorite,
    Download,
    Remix,
    Close,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub image: GeneratedImage,
    pub favorited: bool,
    pub favorite_label: &'static str,
    pub actions: [OverlayAction; 4],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioView {
    pub form: FormView,
    pub history: Vec<HistoryChip>,
    pub tabs: Vec<TabView>,
    pub show_clear: bool,
    pub show_loader: bool,
    pub error: Option<String>,
    pub content: Content,
    pub overlay: Option<OverlayView>,
}

impl StudioView {
    pub fn from_snapshot(snapshot: &StudioSnapshot) -> Self {
        let is_favorite = |src: &str| snapshot.favorites.iter().any(|fav| fav.src == src);

        let form = FormView {
            prompt: snapshot.prompt.clone(),
            placeholder: PROMPT_PLACEHOLDER,
            aspect_ratio: snapshot.aspect_ratio,
            aspect_ratio_options: aspect_ratio_options(),
            submit_label: if snapshot.is_loading { "..." } else { "Generate" },
            submit_disabled: snapshot.is_loading,
        };

        let history = snapshot
            .prompt_history
            .iter()
            .enumerate()
            .map(|(index, prompt)| HistoryChip {
                index,
                prompt: prompt.clone(),
            })
            .collect();

        let favorites_label = if snapshot.favorites.is_empty() {
            "Favorites".to_string()
        } else {
            format!("Favorites ({})", snapshot.favorites.len())
        };
        let tabs = vec![
            TabView {
                view: View::Results,
                label: "Results".to_string(),
                active: snapshot.view == View::Results,
            },
            TabView {
                view: View::Favorites,
                label: favorites_label,
                active: snapshot.view == View::Favorites,
            },
        ];

        let tiles = |images: &[GeneratedImage]| -> Vec<Tile> {
            images
                .iter()
                .enumerate()
                .map(|(index, image)| Tile {
                    index,
                    src: image.src.clone(),
                    alt: image.prompt.clone(),
                    favorited: is_favorite(&image.src),
                })
                .collect()
        };

        let settled = !snapshot.is_loading && snapshot.error.is_none();
        let content = match snapshot.view {
            View::Results if !settled => Content::Empty,
            View::Results if snapshot.results.is_empty() => Content::Welcome {
                title: WELCOME_TITLE,
                body: WELCOME_BODY,
            },
            View::Results => Content::Grid {
                tiles: tiles(&snapshot.results),
            },
            View::Favorites if snapshot.favorites.is_empty() => Content::FavoritesEmpty {
                lines: FAVORITES_EMPTY_LINES,
            },
            View::Favorites => Content::Grid {
                tiles: tiles(&snapshot.favorites),
            },
        };

        let overlay = snapshot.selected_image.as_ref().map(|image| {
            let favorited = is_favorite(&image.src);
            OverlayView {
                image: image.clone(),
                favorited,
                favorite_label: if favorited { "Favorited" } else { "Favorite" },
                actions: [
                    OverlayAction::ToggleFavorite,
                    OverlayAction::Download,
                    OverlayAction::Remix,
                    OverlayAction::Close,
                ],
            }
        });

        Self {
            form,
            history,
            tabs,
            show_clear: snapshot.view == View::Results
                && !snapshot.results.is_empty()
                && !snapshot.is_loading,
            show_loader: snapshot.is_loading,
            error: snapshot.error.clone(),
            content,
            overlay,
        }
    }
}
