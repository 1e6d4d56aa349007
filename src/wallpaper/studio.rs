//! Application state controller.
//!
//! `WallpaperStudio` owns the session state and the persisted collections and applies
//! every user action to them. The only suspending operation is the generation call;
//! the state lock is never held across it, and a second submit while one is
//! outstanding is refused with [`AppError::Busy`].

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use super::client::{WallpaperGenerator, EMPTY_PROMPT_MESSAGE};
use super::collections::Collections;
use super::imagen::NO_IMAGES_MESSAGE;
use super::types::{ApplicationState, AspectRatio, GeneratedImage, StudioSnapshot, View};
use crate::error::AppError;

pub const UNKNOWN_GENERATION_ERROR: &str = "An unknown error occurred during image generation.";

struct StudioInner {
    state: ApplicationState,
    collections: Collections,
}

impl StudioInner {
    fn snapshot(&self) -> StudioSnapshot {
        let state = &self.state;
        StudioSnapshot {
            prompt: state.prompt.clone(),
            aspect_ratio: state.aspect_ratio,
            results: state.results.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            selected_image: state.selected_image.clone(),
            view: state.view,
            phase: state.phase(),
            favorites: self.collections.favorites().items().to_vec(),
            prompt_history: self.collections.history().entries().to_vec(),
        }
    }

    /// Validates and enters the loading state. `Ok(false)` means the prompt was rejected
    /// locally and the error is already recorded in state.
    fn begin_generation(&mut self, prompt: &str) -> Result<bool, AppError> {
        if self.state.is_loading {
            return Err(AppError::Busy);
        }
        if prompt.is_empty() {
            self.state.error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return Ok(false);
        }

        self.state.view = View::Results;
        self.state.is_loading = true;
        self.state.error = None;
        self.state.results.clear();
        self.collections.record_prompt(prompt);
        Ok(true)
    }
}

pub struct WallpaperStudio {
    inner: Mutex<StudioInner>,
    generator: Arc<dyn WallpaperGenerator>,
    updates: watch::Sender<StudioSnapshot>,
}

impl WallpaperStudio {
    pub fn new(generator: Arc<dyn WallpaperGenerator>, collections: Collections) -> Self {
        let inner = StudioInner {
            state: ApplicationState::default(),
            collections,
        };
        let (updates, _) = watch::channel(inner.snapshot());
        Self {
            inner: Mutex::new(inner),
            generator,
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StudioInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `f` under the lock, then publishes the resulting snapshot.
    fn mutate<R>(&self, f: impl FnOnce(&mut StudioInner) -> R) -> (R, StudioSnapshot) {
        let (result, snapshot) = {
            let mut inner = self.lock();
            let result = f(&mut inner);
            (result, inner.snapshot())
        };
        self.updates.send_replace(snapshot.clone());
        (result, snapshot)
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        self.lock().snapshot()
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StudioSnapshot> {
        self.updates.subscribe()
    }

    pub fn set_prompt(&self, prompt: String) -> StudioSnapshot {
        self.mutate(|inner| inner.state.prompt = prompt).1
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) -> StudioSnapshot {
        self.mutate(|inner| inner.state.aspect_ratio = aspect_ratio).1
    }

    /// Generates from the current form fields.
    pub async fn submit(&self) -> Result<StudioSnapshot, AppError> {
        let (started, snapshot) = self.mutate(|inner| {
            let prompt = inner.state.prompt.clone();
            let aspect_ratio = inner.state.aspect_ratio;
            inner
                .begin_generation(&prompt)
                .map(|go| go.then_some((prompt, aspect_ratio)))
        });

        match started? {
            Some((prompt, aspect_ratio)) => Ok(self.run_generation(prompt, aspect_ratio).await),
            None => Ok(snapshot),
        }
    }

    /// Closes the overlay, copies the image's prompt and ratio into the form, and submits.
    pub async fn remix(&self, image: &GeneratedImage) -> Result<StudioSnapshot, AppError> {
        let (started, snapshot) = self.mutate(|inner| {
            if inner.state.is_loading {
                return Err(AppError::Busy);
            }
            inner.state.selected_image = None;
            inner.state.prompt = image.prompt.clone();
            inner.state.aspect_ratio = image.aspect_ratio;
            inner
                .begin_generation(&image.prompt)
                .map(|go| go.then_some((image.prompt.clone(), image.aspect_ratio)))
        });

        match started? {
            Some((prompt, aspect_ratio)) => Ok(self.run_generation(prompt, aspect_ratio).await),
            None => Ok(snapshot),
        }
    }

    async fn run_generation(&self, prompt: String, aspect_ratio: AspectRatio) -> StudioSnapshot {
        tracing::info!(component = "studio", "Generating wallpapers for \"{}\" ({})", prompt, aspect_ratio);

        let generator = Arc::clone(&self.generator);
        let task_prompt = prompt.clone();
        let outcome = tokio::spawn(async move { generator.generate(&task_prompt, aspect_ratio).await }).await;

        let outcome: Result<Vec<GeneratedImage>, String> = match outcome {
            Ok(Ok(images)) if images.is_empty() => {
                Err(AppError::generation_failed(NO_IMAGES_MESSAGE).to_string())
            }
            Ok(Ok(images)) => Ok(images
                .into_iter()
                .map(|img| GeneratedImage::new(img.src, &prompt, aspect_ratio))
                .collect()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_error) => {
                tracing::error!(component = "studio", "Generation task aborted: {}", join_error);
                Err(UNKNOWN_GENERATION_ERROR.to_string())
            }
        };

        self.mutate(|inner| {
            inner.state.is_loading = false;
            match outcome {
                Ok(images) => {
                    tracing::info!(component = "studio", "Loaded {} wallpapers", images.len());
                    inner.state.results = images;
                }
                Err(message) => {
                    tracing::warn!(component = "studio", "Generation failed: {}", message);
                    inner.state.error = Some(message);
                }
            }
        })
        .1
    }

    /// Empties the result grid. Ignored outside a settled, non-empty results view.
    pub fn clear(&self) -> StudioSnapshot {
        self.mutate(|inner| {
            let state = &mut inner.state;
            if state.view == View::Results && !state.results.is_empty() && !state.is_loading {
                state.results.clear();
                state.error = None;
            }
        })
        .1
    }

    /// Returns whether the image is a favorite after the toggle.
    pub fn toggle_favorite(&self, image: &GeneratedImage) -> (bool, StudioSnapshot) {
        self.mutate(|inner| inner.collections.toggle_favorite(image))
    }

    pub fn select(&self, image: GeneratedImage) -> StudioSnapshot {
        self.mutate(|inner| inner.state.selected_image = Some(image)).1
    }

    pub fn deselect(&self) -> StudioSnapshot {
        self.mutate(|inner| inner.state.selected_image = None).1
    }

    pub fn switch_view(&self, view: View) -> StudioSnapshot {
        self.mutate(|inner| inner.state.view = view).1
    }

    /// Copies a stored prompt into the form without submitting.
    pub fn pick_history(&self, index: usize) -> Result<StudioSnapshot, AppError> {
        let (picked, snapshot) = self.mutate(|inner| {
            let entry = inner.collections.history().get(index).map(str::to_string);
            match entry {
                Some(prompt) => {
                    inner.state.prompt = prompt;
                    Ok(())
                }
                None => Err(AppError::Other(format!("No history entry at index {}", index))),
            }
        });
        picked.map(|_| snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallpaper::collections::JsonFileStore;
    use crate::wallpaper::types::Phase;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    /// Returns four sources derived from the inputs, or fails when `fail` is set.
    #[derive(Default)]
    struct ScriptedGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WallpaperGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            aspect_ratio: AspectRatio,
        ) -> Result<Vec<GeneratedImage>, AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::generation_failed("quota exceeded"));
            }
            Ok((0..4)
                .map(|i| {
                    GeneratedImage::new(
                        format!("data:image/jpeg;base64,{}-{}-{}-{}", prompt, aspect_ratio, call, i),
                        prompt,
                        aspect_ratio,
                    )
                })
                .collect())
        }
    }

    /// Blocks inside the call until released, so the loading phase can be observed.
    #[derive(Default)]
    struct GatedGenerator {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl WallpaperGenerator for GatedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            aspect_ratio: AspectRatio,
        ) -> Result<Vec<GeneratedImage>, AppError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![GeneratedImage::new("gated", prompt, aspect_ratio)])
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl WallpaperGenerator for PanickingGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _aspect_ratio: AspectRatio,
        ) -> Result<Vec<GeneratedImage>, AppError> {
            panic!("decoder exploded");
        }
    }

    fn studio_with(generator: Arc<dyn WallpaperGenerator>) -> (Arc<WallpaperStudio>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let collections = Collections::load(JsonFileStore::new(dir.path()));
        (Arc::new(WallpaperStudio::new(generator, collections)), dir)
    }

    #[tokio::test]
    async fn submit_populates_results_and_history() {
        let generator = Arc::new(ScriptedGenerator::default());
        let (studio, _dir) = studio_with(generator.clone());

        studio.set_prompt("rainy cyberpunk lo-fi".to_string());
        studio.set_aspect_ratio(AspectRatio::Phone);
        let snapshot = studio.submit().await.unwrap();

        assert_eq!(snapshot.results.len(), 4);
        assert!(snapshot
            .results
            .iter()
            .all(|img| img.prompt == "rainy cyberpunk lo-fi" && img.aspect_ratio == AspectRatio::Phone));
        assert_eq!(snapshot.prompt_history.first().map(String::as_str), Some("rainy cyberpunk lo-fi"));
        assert_eq!(snapshot.phase, Phase::Loaded);
        assert_eq!(snapshot.view, View::Results);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_generation_sets_error_and_empty_results() {
        let generator = Arc::new(ScriptedGenerator {
            fail: true,
            ..Default::default()
        });
        let (studio, _dir) = studio_with(generator);

        studio.set_prompt("glacier at dawn".to_string());
        let snapshot = studio.submit().await.unwrap();

        assert_eq!(
            snapshot.error.as_deref(),
            Some("Failed to generate images: quota exceeded")
        );
        assert!(!snapshot.is_loading);
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.phase, Phase::Errored);
    }

    #[tokio::test]
    async fn empty_prompt_sets_validation_error_without_calling_generator() {
        let generator = Arc::new(ScriptedGenerator::default());
        let (studio, _dir) = studio_with(generator.clone());

        studio.set_prompt("desert highway".to_string());
        let loaded = studio.submit().await.unwrap();
        studio.switch_view(View::Favorites);

        studio.set_prompt(String::new());
        let snapshot = studio.submit().await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.error.as_deref(), Some("Please enter a vibe to generate."));
        assert_eq!(snapshot.results, loaded.results);
        assert_eq!(snapshot.view, View::Favorites);
        assert_eq!(snapshot.prompt_history, vec!["desert highway".to_string()]);
    }

    #[tokio::test]
    async fn whitespace_prompt_is_sent_unmodified() {
        let generator = Arc::new(ScriptedGenerator::default());
        let (studio, _dir) = studio_with(generator.clone());

        studio.set_prompt("   ".to_string());
        let snapshot = studio.submit().await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.results.len(), 4);
        assert!(snapshot.results.iter().all(|img| img.prompt == "   "));
        assert_eq!(snapshot.prompt_history, vec!["   ".to_string()]);
    }

    #[tokio::test]
    async fn submit_passes_through_loading_and_blocks_reentry() {
        let generator = Arc::new(GatedGenerator::default());
        let (studio, _dir) = studio_with(generator.clone());

        // Pre-release the first call and drain its start signal.
        generator.release.notify_one();
        studio.set_prompt("first".to_string());
        let first = studio.submit().await.unwrap();
        assert_eq!(first.results.len(), 1);
        generator.started.notified().await;

        studio.switch_view(View::Favorites);
        studio.set_prompt("second".to_string());

        let task = tokio::spawn({
            let studio = Arc::clone(&studio);
            async move { studio.submit().await }
        });
        generator.started.notified().await;

        let loading = studio.snapshot();
        assert_eq!(loading.phase, Phase::Loading);
        assert!(loading.is_loading);
        assert!(loading.results.is_empty());
        assert!(loading.error.is_none());
        assert_eq!(loading.view, View::Results);
        assert!(matches!(studio.submit().await, Err(AppError::Busy)));

        generator.release.notify_one();
        let done = task.await.unwrap().unwrap();
        assert_eq!(done.phase, Phase::Loaded);
        assert_eq!(done.results[0].prompt, "second");
    }

    #[tokio::test]
    async fn remix_matches_manual_submit() {
        let (remixed, _a) = studio_with(Arc::new(ScriptedGenerator::default()));
        let (manual, _b) = studio_with(Arc::new(ScriptedGenerator::default()));

        let source = GeneratedImage::new("old", "foggy harbor", AspectRatio::Landscape);
        remixed.select(source.clone());
        let via_remix = remixed.remix(&source).await.unwrap();

        manual.set_prompt("foggy harbor".to_string());
        manual.set_aspect_ratio(AspectRatio::Landscape);
        let via_submit = manual.submit().await.unwrap();

        assert!(via_remix.selected_image.is_none());
        assert_eq!(via_remix, via_submit);
        assert_eq!(via_remix.prompt, "foggy harbor");
        assert_eq!(via_remix.aspect_ratio, AspectRatio::Landscape);
    }

    #[tokio::test]
    async fn favorites_are_copies_independent_of_results() {
        let (studio, _dir) = studio_with(Arc::new(ScriptedGenerator::default()));
        studio.set_prompt("aurora over peaks".to_string());
        let loaded = studio.submit().await.unwrap();
        let pick = loaded.results[1].clone();

        let (added, _) = studio.toggle_favorite(&pick);
        assert!(added);
        let favorites_view = studio.switch_view(View::Favorites);
        assert_eq!(favorites_view.favorites, vec![pick.clone()]);

        let (still_favorite, after) = studio.toggle_favorite(&pick);
        assert!(!still_favorite);
        assert!(after.favorites.is_empty());
        assert_eq!(after.results, loaded.results);
    }

    #[tokio::test]
    async fn clear_only_applies_to_settled_results_view() {
        let (studio, _dir) = studio_with(Arc::new(ScriptedGenerator::default()));
        studio.set_prompt("city lights".to_string());
        let loaded = studio.submit().await.unwrap();
        studio.toggle_favorite(&loaded.results[0]);

        studio.switch_view(View::Favorites);
        assert_eq!(studio.clear().results.len(), 4);

        studio.switch_view(View::Results);
        let cleared = studio.clear();
        assert!(cleared.results.is_empty());
        assert!(cleared.error.is_none());
        assert_eq!(cleared.favorites.len(), 1);
        assert_eq!(cleared.prompt_history, vec!["city lights".to_string()]);
        assert_eq!(cleared.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn history_stays_capped_and_unique() {
        let generator = Arc::new(ScriptedGenerator::default());
        let (studio, _dir) = studio_with(generator);

        for i in 0..12 {
            studio.set_prompt(format!("vibe {}", i));
            studio.submit().await.unwrap();
        }
        studio.set_prompt("vibe 5".to_string());
        let snapshot = studio.submit().await.unwrap();

        assert_eq!(snapshot.prompt_history.len(), 10);
        assert_eq!(snapshot.prompt_history[0], "vibe 11");
        let mut deduped = snapshot.prompt_history.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), snapshot.prompt_history.len());
    }

    #[tokio::test]
    async fn pick_history_sets_prompt_without_submitting() {
        let generator = Arc::new(ScriptedGenerator::default());
        let (studio, _dir) = studio_with(generator.clone());
        studio.set_prompt("pastel clouds".to_string());
        studio.submit().await.unwrap();
        studio.set_prompt("something else".to_string());

        let snapshot = studio.pick_history(0).unwrap();
        assert_eq!(snapshot.prompt, "pastel clouds");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(studio.pick_history(3).is_err());
    }

    #[tokio::test]
    async fn panicking_generator_becomes_unknown_error() {
        let (studio, _dir) = studio_with(Arc::new(PanickingGenerator));
        studio.set_prompt("storm".to_string());
        let snapshot = studio.submit().await.unwrap();
        assert_eq!(snapshot.error.as_deref(), Some(UNKNOWN_GENERATION_ERROR));
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn subscribers_see_latest_state() {
        let (studio, _dir) = studio_with(Arc::new(ScriptedGenerator::default()));
        let mut rx = studio.subscribe();
        studio.set_prompt("koi pond".to_string());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().prompt, "koi pond");
    }

    #[tokio::test]
    async fn collections_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let generator: Arc<dyn WallpaperGenerator> = Arc::new(ScriptedGenerator::default());

        let first = WallpaperStudio::new(generator.clone(), Collections::load(store.clone()));
        first.set_prompt("lavender fields".to_string());
        let loaded = first.submit().await.unwrap();
        first.toggle_favorite(&loaded.results[2]);

        let second = WallpaperStudio::new(generator, Collections::load(store));
        let snapshot = second.snapshot();
        assert_eq!(snapshot.favorites, vec![loaded.results[2].clone()]);
        assert_eq!(snapshot.prompt_history, vec!["lavender fields".to_string()]);
        assert!(snapshot.results.is_empty());
    }
}
