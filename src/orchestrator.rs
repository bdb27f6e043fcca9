use crate::{
    client::ImageGenerator,
    error::{GenerationError, Result},
    gallery::{GalleryStore, ImageDownloader},
    models::{GeneratedImage, GenerationOutcome, GenerationRequest, GenerationSettings},
    prompt::DEFAULT_SYSTEM_PROMPT,
};
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

pub const PROGRESS_CEILING: f32 = 90.0;
pub const MAX_PROGRESS_STEP: f32 = 15.0;
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
    Succeeded,
    Failed,
}

/// Everything a front end needs to render the generator.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub state: GenerationState,
    pub progress: f32,
    pub error: Option<String>,
    pub settings: GenerationSettings,
    pub system_prompt: String,
    pub images: Vec<GeneratedImage>,
}

struct ControllerState {
    state: GenerationState,
    settings: GenerationSettings,
    system_prompt: String,
    gallery: GalleryStore,
    error: Option<String>,
    last_id: i64,
}

impl ControllerState {
    fn transition(&mut self, next: GenerationState) {
        log::debug!("Generation state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn next_id(&mut self, now_ms: i64) -> String {
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

/// Drives a single generation at a time and owns the gallery, settings and
/// synthetic progress for one user session.
pub struct GenerationController<G> {
    generator: G,
    inner: Mutex<ControllerState>,
    progress: Arc<watch::Sender<f32>>,
    tick: Duration,
    downloader: ImageDownloader,
}

impl<G: ImageGenerator> GenerationController<G> {
    pub fn new(generator: G) -> Self {
        let (progress, _) = watch::channel(0.0);
        Self {
            generator,
            inner: Mutex::new(ControllerState {
                state: GenerationState::Idle,
                settings: GenerationSettings::default(),
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
                gallery: GalleryStore::new(),
                error: None,
                last_id: 0,
            }),
            progress: Arc::new(progress),
            tick: DEFAULT_TICK,
            downloader: ImageDownloader::default(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn with_downloader(mut self, downloader: ImageDownloader) -> Self {
        self.downloader = downloader;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate an image for `prompt` with the current settings and system prompt.
    ///
    /// Rejected with [`GenerationError::Busy`] while another generation is in flight.
    /// On success the image is prepended to the gallery; on any failure the error
    /// message is recorded. Either way the controller ends up `Idle`.
    pub async fn submit(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = self.begin(prompt)?;

        let mut in_flight = InFlight {
            controller: self,
            ticker: ProgressTicker::spawn(self.progress.clone(), self.tick),
            finished: false,
        };

        let result = self.generator.generate(&request).await;

        in_flight.ticker.stop();
        in_flight.finished = true;
        self.complete(request, result)
    }

    fn begin(&self, prompt: &str) -> Result<GenerationRequest> {
        let mut inner = self.lock();

        if inner.state == GenerationState::Generating {
            log::warn!("Rejected submission: a generation is already in flight");
            return Err(GenerationError::Busy);
        }

        if prompt.trim().is_empty() {
            inner.error = Some("Please enter a prompt".to_string());
            return Err(GenerationError::InvalidInput("Please enter a prompt".into()));
        }

        inner.error = None;
        inner.transition(GenerationState::Generating);
        self.progress.send_replace(0.0);

        let mut request = GenerationRequest::new(prompt, inner.settings.clone());
        if !inner.system_prompt.is_empty() {
            request = request.with_system_prompt(inner.system_prompt.clone());
        }
        Ok(request)
    }

    fn complete(
        &self,
        request: GenerationRequest,
        result: Result<GenerationOutcome>,
    ) -> Result<GeneratedImage> {
        let mut inner = self.lock();

        let result = result.and_then(|outcome| {
            if outcome.image_url.is_empty() {
                Err(GenerationError::NoImageInResponse)
            } else {
                Ok(outcome)
            }
        });

        match result {
            Ok(outcome) => {
                self.progress.send_replace(100.0);
                inner.transition(GenerationState::Succeeded);

                let now = Utc::now().timestamp_millis();
                let image = GeneratedImage {
                    id: inner.next_id(now),
                    url: outcome.image_url,
                    prompt: request.prompt,
                    timestamp: now,
                    settings: request.settings,
                };
                inner.gallery.add(image.clone());
                log::info!(
                    "Image {} added to gallery ({} total, {}ms)",
                    image.id,
                    inner.gallery.len(),
                    outcome.generation_time_ms
                );

                inner.transition(GenerationState::Idle);
                self.progress.send_replace(0.0);
                Ok(image)
            }
            Err(e) => {
                self.progress.send_replace(0.0);
                log::error!("Generation error ({}): {}", e.kind(), e);
                inner.error = Some(e.user_message());
                inner.transition(GenerationState::Failed);
                inner.transition(GenerationState::Idle);
                Err(e)
            }
        }
    }

    fn abandon(&self) {
        let mut inner = self.lock();
        if inner.state == GenerationState::Generating {
            log::warn!("Generation cancelled before completion");
            self.progress.send_replace(0.0);
            inner.error = Some("Generation cancelled".to_string());
            inner.transition(GenerationState::Failed);
            inner.transition(GenerationState::Idle);
        }
    }

    pub fn state(&self) -> GenerationState {
        self.lock().state
    }

    pub fn is_generating(&self) -> bool {
        self.state() == GenerationState::Generating
    }

    pub fn progress(&self) -> f32 {
        *self.progress.borrow()
    }

    pub fn progress_updates(&self) -> WatchStream<f32> {
        WatchStream::new(self.progress.subscribe())
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn settings(&self) -> GenerationSettings {
        self.lock().settings.clone()
    }

    /// Applies to future submissions only; images already in the gallery keep
    /// their own snapshot.
    pub fn set_settings(&self, settings: GenerationSettings) -> Result<()> {
        settings.validate()?;
        self.lock().settings = settings;
        Ok(())
    }

    pub fn system_prompt(&self) -> String {
        self.lock().system_prompt.clone()
    }

    pub fn set_system_prompt(&self, system_prompt: impl Into<String>) {
        self.lock().system_prompt = system_prompt.into();
    }

    pub fn images(&self) -> Vec<GeneratedImage> {
        self.lock().gallery.list().to_vec()
    }

    pub fn delete_image(&self, id: &str) -> bool {
        self.lock().gallery.delete(id)
    }

    pub fn clear_images(&self) {
        self.lock().gallery.clear();
    }

    pub async fn download_image(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let image = self.lock().gallery.get(id).cloned();
        let result = match image {
            Some(image) => self.downloader.download(&image, dir).await,
            None => Err(GenerationError::DownloadError(format!(
                "no image with id {}",
                id
            ))),
        };

        if let Err(e) = &result {
            log::error!("Download failed: {}", e);
            self.lock().error = Some(e.user_message());
        }
        result
    }

    pub fn view(&self) -> ViewState {
        let inner = self.lock();
        ViewState {
            state: inner.state,
            progress: self.progress(),
            error: inner.error.clone(),
            settings: inner.settings.clone(),
            system_prompt: inner.system_prompt.clone(),
            images: inner.gallery.list().to_vec(),
        }
    }
}

/// Lives exactly as long as one in-flight request. Dropping it without
/// finishing (the submit future was dropped) returns the controller to `Idle`.
struct InFlight<'a, G: ImageGenerator> {
    controller: &'a GenerationController<G>,
    ticker: ProgressTicker,
    finished: bool,
}

impl<G: ImageGenerator> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        self.ticker.stop();
        if !self.finished {
            self.controller.abandon();
        }
    }
}

struct ProgressTicker {
    handle: JoinHandle<()>,
    active: Arc<AtomicBool>,
}

impl ProgressTicker {
    fn spawn(progress: Arc<watch::Sender<f32>>, period: Duration) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let step = rand::thread_rng().gen_range(0.0..MAX_PROGRESS_STEP);

                // `active` is checked under the channel lock so a late tick can never
                // overwrite the value written on completion.
                progress.send_if_modified(|value| {
                    if !flag.load(Ordering::SeqCst) {
                        return false;
                    }
                    let next = (*value + step).min(PROGRESS_CEILING);
                    let changed = next != *value;
                    *value = next;
                    changed
                });

                if !flag.load(Ordering::SeqCst) || *progress.borrow() >= PROGRESS_CEILING {
                    break;
                }
            }
        });

        Self { handle, active }
    }

    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.handle.abort();
    }
}
