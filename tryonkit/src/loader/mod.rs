//! Tiered, deduplicating image loading.
//!
//! A [`TieredImageLoader`] owns, per quality tier, at most one in-flight
//! or most-recent fetch. Requests for a higher tier trigger the lowest
//! tier first (progressive-loading cascade) so a cheap preview is always
//! on its way before an expensive fetch completes. Completion state is
//! retained per tier, so a late subscriber still receives the most recent
//! successful result ("subscribe-past").
//!
//! The loader tags every successful arrival with its [`Quality`]; it is
//! the display consumer's job to ignore a lower-quality arrival that
//! lands after a higher-quality one has been applied.

use crate::observable::ObservableValue;
use crate::source::{FetchError, ImageSource, Quality};
use bytes::Bytes;
use dashmap::DashMap;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Completion state of one fetch at one quality tier.
#[derive(Clone, Debug)]
pub enum FetchState {
    /// Fetch is still in flight.
    Pending,
    /// Fetch completed with image data.
    Ready(Bytes),
    /// Fetch failed; the message preserves the cause.
    Failed(String),
}

impl FetchState {
    /// Returns true once the fetch has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A successfully loaded image tagged with the tier it belongs to.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub quality: Quality,
    pub bytes: Bytes,
}

/// Handle to the fetch for one quality tier.
///
/// Cloneable; all clones observe the same fetch. The last settled state
/// is retained, so awaiting or inspecting a handle after completion
/// yields the result immediately.
#[derive(Clone)]
pub struct FetchHandle {
    quality: Quality,
    rx: watch::Receiver<FetchState>,
}

impl FetchHandle {
    /// Returns the quality tier this handle fetches.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Returns the most recent state without waiting.
    pub fn latest(&self) -> FetchState {
        self.rx.borrow().clone()
    }

    /// Waits for the fetch to settle and returns the image bytes.
    ///
    /// Completes immediately if the fetch already settled.
    pub async fn ready(mut self) -> Result<Bytes, FetchError> {
        loop {
            let state = self.rx.borrow().clone();
            match state {
                FetchState::Ready(bytes) => return Ok(bytes),
                FetchState::Failed(message) => return Err(FetchError::Transport(message)),
                FetchState::Pending => {}
            }
            if self.rx.changed().await.is_err() {
                return Err(FetchError::Transport("fetch task dropped".to_string()));
            }
        }
    }
}

impl fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("quality", &self.quality)
            .field("state", &self.latest())
            .finish()
    }
}

/// Per-source object fetching an image at several quality tiers.
///
/// Lives inside the [`LoaderCache`](crate::cache::LoaderCache) keyed by
/// source identity; loader equality is source identity equality.
pub struct TieredImageLoader {
    source: ImageSource,
    handles: DashMap<Quality, FetchHandle>,
    on_image: ObservableValue<Option<LoadedImage>>,
}

impl TieredImageLoader {
    /// Creates a loader for `source`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            handles: DashMap::new(),
            on_image: ObservableValue::new(None),
        }
    }

    /// Returns the source this loader fetches.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Observable of successful arrivals, tagged with their quality.
    ///
    /// Subscribing with `fire_immediately` replays the most recent
    /// successful arrival, if any.
    pub fn on_image(&self) -> &ObservableValue<Option<LoadedImage>> {
        &self.on_image
    }

    /// Starts (or reuses) the fetch for `quality` and returns its handle.
    ///
    /// Requesting a tier above the lowest triggers the lowest tier first
    /// when no fetch exists for it yet. A previously failed fetch for the
    /// requested tier is replaced, allowing a retry; in-flight and
    /// successful fetches are always reused.
    pub fn load(&self, quality: Quality) -> FetchHandle {
        for tier in Quality::ascending() {
            if tier >= quality {
                break;
            }
            if !self.handles.contains_key(&tier) {
                self.load(tier);
            }
        }

        let mut entry = self
            .handles
            .entry(quality)
            .or_insert_with(|| self.spawn_fetch(quality));
        if let FetchState::Failed(_) = entry.latest() {
            *entry = self.spawn_fetch(quality);
        }
        entry.clone()
    }

    /// Fetches the image at `quality`, awaiting the shared in-flight
    /// fetch if one exists.
    pub async fn fetch(&self, quality: Quality) -> Result<Bytes, FetchError> {
        self.load(quality).ready().await
    }

    /// Warms the cache at `quality`; failures are swallowed.
    pub async fn prefetch(&self, quality: Quality) {
        if let Err(error) = self.fetch(quality).await {
            debug!(
                source = %self.source.identity(),
                %quality,
                %error,
                "prefetch failed"
            );
        }
    }

    fn spawn_fetch(&self, quality: Quality) -> FetchHandle {
        let (tx, rx) = watch::channel(FetchState::Pending);
        let source = self.source.clone();
        let on_image = self.on_image.clone();

        tokio::spawn(async move {
            match source.fetch(quality).await {
                Ok(bytes) => {
                    debug!(
                        source = %source.identity(),
                        %quality,
                        size = bytes.len(),
                        "image fetch complete"
                    );
                    let _ = tx.send(FetchState::Ready(bytes.clone()));
                    on_image.set(Some(LoadedImage { quality, bytes }));
                }
                Err(error) => {
                    debug!(
                        source = %source.identity(),
                        %quality,
                        %error,
                        "image fetch failed"
                    );
                    let _ = tx.send(FetchState::Failed(error.to_string()));
                }
            }
        });

        FetchHandle { quality, rx }
    }
}

impl PartialEq for TieredImageLoader {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for TieredImageLoader {}

impl fmt::Debug for TieredImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredImageLoader")
            .field("source", &self.source)
            .finish()
    }
}
