//! End-to-end generation pipeline.
//!
//! One [`TryOnOrchestrator::run`] call drives a complete try-on request:
//!
//! ```text
//!   source photo
//!        |
//!        v
//!   [prepare] --> [upload] --> [submit job] --> [poll] --> [prefetch]
//!    (skipped for already-uploaded sources)         |
//!                                                   v
//!                                          history + session results
//! ```
//!
//! The orchestrator never talks to the wire itself; each stage delegates
//! to a collaborator trait from [`backend`](crate::backend) or
//! [`source`](crate::source). At most one run is in flight per
//! orchestrator; a second call fails fast with
//! [`TryOnError::AlreadyRunning`].

mod backoff;
mod compress;
mod error;

pub use backoff::PollSchedule;
pub use compress::{prepare_upload_image, PrepareError};
pub use error::TryOnError;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::backend::{
    ImageUploader, JobSnapshot, JobStatus, OperationHandle, TryOnGateway,
};
use crate::cache::LoaderCache;
use crate::config::TryOnConfig;
use crate::data::ItemsProvider;
use crate::history::{GeneratedImage, HistoryStore, UploadedImage};
use crate::source::{ImageSource, Quality, RemoteImageFetch};

/// Poll count after which the run is assumed to be past person detection
/// and into image generation.
const GENERATING_AFTER_POLLS: usize = 3;

/// Coarse milestones reported to the caller while a run is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryOnProgress {
    /// The source photo is being analyzed.
    Scanning,
    /// The service is rendering result images.
    Generating,
}

/// One generated outfit image produced by a run.
#[derive(Clone, Debug)]
pub struct TryOnResult {
    image: GeneratedImage,
}

impl TryOnResult {
    /// Wraps a generated history record as a session result.
    pub fn new(image: GeneratedImage) -> Self {
        Self { image }
    }

    /// The underlying history record.
    pub fn image(&self) -> &GeneratedImage {
        &self.image
    }

    /// Remote identifier of the result image.
    pub fn id(&self) -> &str {
        &self.image.id
    }

    /// Remote URL of the result image.
    pub fn url(&self) -> &str {
        &self.image.url
    }

    /// Product the result was generated for.
    pub fn product_id(&self) -> &str {
        &self.image.product_id
    }
}

impl PartialEq for TryOnResult {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
    }
}

impl Eq for TryOnResult {}

/// Drives try-on generation runs and owns the session result list.
///
/// The orchestrator is cheap to share behind an [`Arc`]; all state it
/// mutates is interior. Results of successive runs accumulate newest
/// first in [`results`](Self::results).
pub struct TryOnOrchestrator {
    uploader: Arc<dyn ImageUploader>,
    gateway: Arc<dyn TryOnGateway>,
    image_fetch: Arc<dyn RemoteImageFetch>,
    history: Arc<HistoryStore>,
    config: TryOnConfig,
    loaders: LoaderCache,
    results: Arc<ItemsProvider<TryOnResult>>,
    busy: AtomicBool,
}

impl TryOnOrchestrator {
    /// Creates an orchestrator over the given collaborators.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(
        uploader: Arc<dyn ImageUploader>,
        gateway: Arc<dyn TryOnGateway>,
        image_fetch: Arc<dyn RemoteImageFetch>,
        history: Arc<HistoryStore>,
        config: TryOnConfig,
    ) -> Self {
        let loaders = LoaderCache::new(config.loader_ttl());
        Self {
            uploader,
            gateway,
            image_fetch,
            history,
            config,
            loaders,
            results: Arc::new(ItemsProvider::new(Vec::new())),
            busy: AtomicBool::new(false),
        }
    }

    /// Results of this session's runs, newest first.
    pub fn results(&self) -> &Arc<ItemsProvider<TryOnResult>> {
        &self.results
    }

    /// Loader cache shared with result prefetching.
    ///
    /// UI layers fetch result pixels through this cache so they reuse
    /// the in-flight or completed prefetch instead of re-downloading.
    pub fn loaders(&self) -> &LoaderCache {
        &self.loaders
    }

    /// The history store backing this orchestrator.
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Runs one try-on request to completion.
    ///
    /// `on_progress` is invoked with coarse milestones as the run
    /// advances. On success the generated records have been prefetched,
    /// persisted to history and prepended to [`results`](Self::results).
    ///
    /// # Errors
    ///
    /// Fails fast with [`TryOnError::AlreadyRunning`] if another run is
    /// in flight, and with [`TryOnError::NoSku`] if `product_id` is
    /// blank. All other variants map one pipeline stage each.
    pub async fn run(
        &self,
        source: ImageSource,
        product_id: &str,
        on_progress: impl Fn(TryOnProgress) + Send + Sync,
    ) -> Result<Vec<TryOnResult>, TryOnError> {
        if product_id.trim().is_empty() {
            return Err(TryOnError::NoSku);
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(TryOnError::AlreadyRunning);
        }
        let result = self.run_inner(source, product_id, &on_progress).await;
        self.busy.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(
        &self,
        source: ImageSource,
        product_id: &str,
        on_progress: &(impl Fn(TryOnProgress) + Send + Sync),
    ) -> Result<Vec<TryOnResult>, TryOnError> {
        on_progress(TryOnProgress::Scanning);

        let (remote_image_id, pending_upload) = self.ensure_uploaded(&source).await?;
        debug!(
            remote_image_id = %remote_image_id,
            product_id = %product_id,
            "submitting try-on job"
        );

        let handle = self
            .gateway
            .submit(remote_image_id, product_id.to_string())
            .await
            .map_err(TryOnError::TryOnStartFailed)?;

        let snapshot = self.poll_until_terminal(&handle, on_progress).await?;
        let records = interpret_terminal(snapshot, product_id)?;
        info!(
            operation_id = %handle.operation_id,
            count = records.len(),
            "try-on job succeeded"
        );

        self.prefetch_results(&records).await;

        // History only records uploads whose run actually produced
        // results; a failed run leaves it untouched.
        if let Some(record) = pending_upload {
            if let Err(error) = self.history.add_uploaded(record).await {
                warn!(%error, "failed to persist uploaded image, continuing");
            }
        }
        if let Err(error) = self.history.add_generated(records.clone()).await {
            warn!(%error, "failed to persist generated images, continuing");
        }

        let results: Vec<TryOnResult> = records.into_iter().map(TryOnResult::new).collect();
        self.results.prepend_all(results.clone());
        Ok(results)
    }

    /// Resolves the source to a remote image id, uploading it first if
    /// it only exists locally.
    ///
    /// A fresh upload is returned as a pending history record; the
    /// caller persists it once the run succeeds.
    async fn ensure_uploaded(
        &self,
        source: &ImageSource,
    ) -> Result<(String, Option<UploadedImage>), TryOnError> {
        if let Some(id) = source.remote_id() {
            // Reusing a previous upload bumps it to the front of history.
            match self.history.touch_uploaded(id).await {
                Ok(found) => debug!(image_id = %id, found, "reusing uploaded image"),
                Err(error) => warn!(%error, "failed to reorder upload history, continuing"),
            }
            return Ok((id.to_string(), None));
        }

        let raw = source
            .fetch(Quality::HiRes)
            .await
            .map_err(|e| TryOnError::PrepareImageFailed(PrepareError::Fetch(e)))?;
        let prepared = prepare_upload_image(raw, *self.config.compression())
            .await
            .map_err(TryOnError::PrepareImageFailed)?;

        let remote = self
            .uploader
            .upload(prepared)
            .await
            .map_err(TryOnError::UploadImageFailed)?;
        debug!(image_id = %remote.id, "person image uploaded");

        let record = UploadedImage::new(remote.id.clone(), remote.url);
        Ok((remote.id, Some(record)))
    }

    /// Polls the job until it reaches a terminal status or the deadline
    /// elapses.
    ///
    /// Transient poll errors are logged and retried on the next tick;
    /// only the deadline turns a silent service into a failure.
    async fn poll_until_terminal(
        &self,
        handle: &OperationHandle,
        on_progress: &(impl Fn(TryOnProgress) + Send + Sync),
    ) -> Result<JobSnapshot, TryOnError> {
        let schedule = self.config.polling().schedule().clone();
        let deadline = self.config.polling().deadline();
        let started = Instant::now();
        let mut attempt = 0usize;

        loop {
            let delay = schedule.delay(attempt);
            if started.elapsed() + delay > deadline {
                warn!(operation_id = %handle.operation_id, ?deadline, "try-on poll deadline elapsed");
                return Err(TryOnError::TryOnTimeout(deadline));
            }
            sleep(delay).await;

            if attempt == GENERATING_AFTER_POLLS {
                on_progress(TryOnProgress::Generating);
            }

            match self.gateway.poll(handle.operation_id.clone()).await {
                Ok(snapshot) if snapshot.status.is_terminal() => return Ok(snapshot),
                Ok(snapshot) => {
                    debug!(status = %snapshot.status, attempt, "job not terminal yet")
                }
                Err(error) => {
                    warn!(%error, attempt, "status poll failed, retrying")
                }
            }
            attempt += 1;
        }
    }

    /// Warms the loader cache with every result at display quality.
    ///
    /// Prefetch failures are swallowed by the loader; the UI retries
    /// through the same cache entry on demand.
    async fn prefetch_results(&self, records: &[GeneratedImage]) {
        let prefetches = records.iter().map(|record| {
            let source = ImageSource::remote_url(
                record.id.clone(),
                record.url.clone(),
                Arc::clone(&self.image_fetch),
            );
            let loader = self.loaders.loader_for(&source);
            async move { loader.prefetch(Quality::HiRes).await }
        });
        join_all(prefetches).await;
    }
}

/// Maps a terminal snapshot to generated records or the matching error.
fn interpret_terminal(
    snapshot: JobSnapshot,
    product_id: &str,
) -> Result<Vec<GeneratedImage>, TryOnError> {
    match snapshot.status {
        JobStatus::Success if snapshot.results.is_empty() => Err(TryOnError::EmptyResults),
        JobStatus::Success => Ok(snapshot
            .results
            .into_iter()
            .map(|result| GeneratedImage::new(result.id, result.url, product_id))
            .collect()),
        JobStatus::Aborted => Err(TryOnError::TryOnAborted),
        status => Err(TryOnError::TryOnFailed {
            status,
            message: snapshot.error,
        }),
    }
}
