use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Phone,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
}

impl AspectRatio {
    /// Picker order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Phone,
        AspectRatio::Widescreen,
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Phone => "9:16",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Phone => "Phone (9:16)",
            AspectRatio::Widescreen => "Widescreen (16:9)",
            AspectRatio::Square => "Square (1:1)",
            AspectRatio::Portrait => "Portrait (3:4)",
            AspectRatio::Landscape => "Landscape (4:3)",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| format!("Unsupported aspect ratio: {}", s))
    }
}

/// One generated wallpaper. `src` is a directly renderable reference (a data URI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub src: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl GeneratedImage {
    pub fn new(src: impl Into<String>, prompt: &str, aspect_ratio: AspectRatio) -> Self {
        Self {
            src: src.into(),
            prompt: prompt.to_string(),
            aspect_ratio,
        }
    }

    pub fn same_src(&self, other: &GeneratedImage) -> bool {
        self.src == other.src
    }
}

impl PartialEq for GeneratedImage {
    fn eq(&self, other: &Self) -> bool {
        self.same_src(other)
    }
}

impl Eq for GeneratedImage {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Results,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// In-memory session state. Lives only as long as the window.
#[derive(Debug, Clone, Default)]
pub struct ApplicationState {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub results: Vec<GeneratedImage>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected_image: Option<GeneratedImage>,
    pub view: View,
}

impl ApplicationState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Errored
        } else if !self.results.is_empty() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }
}

/// Serializable copy of everything the web view renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub results: Vec<GeneratedImage>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected_image: Option<GeneratedImage>,
    pub view: View,
    pub phase: Phase,
    pub favorites: Vec<GeneratedImage>,
    pub prompt_history: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatioOption {
    pub label: &'static str,
    pub value: AspectRatio,
}

pub fn aspect_ratio_options() -> Vec<AspectRatioOption> {
    AspectRatio::ALL
        .into_iter()
        .map(|value| AspectRatioOption {
            label: value.label(),
            value,
        })
        .collect()
}
