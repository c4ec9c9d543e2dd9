//! Failure modes of a try-on run.

use std::time::Duration;

use thiserror::Error;

use crate::backend::{ApiError, JobStatus};
use crate::orchestrator::compress::PrepareError;

/// Errors surfaced by [`TryOnOrchestrator::run`](crate::orchestrator::TryOnOrchestrator::run).
///
/// Each phase of a run has its own variant so callers can distinguish
/// "the person photo never left the device" from "the service rejected
/// the job" without string matching.
#[derive(Debug, Error)]
pub enum TryOnError {
    /// The product identifier was empty.
    #[error("no product identifier supplied")]
    NoSku,

    /// Reading or re-encoding the person image failed before upload.
    #[error("failed to prepare image for upload")]
    PrepareImageFailed(#[source] PrepareError),

    /// The upload call itself failed.
    #[error("failed to upload person image")]
    UploadImageFailed(#[source] ApiError),

    /// Submitting the generation job failed.
    #[error("failed to start try-on job")]
    TryOnStartFailed(#[source] ApiError),

    /// The job reached a terminal failure state.
    #[error("try-on job ended as {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    TryOnFailed {
        status: JobStatus,
        message: Option<String>,
    },

    /// The job was aborted server-side, typically because no person was
    /// detected in the source photo.
    #[error("try-on job was aborted")]
    TryOnAborted,

    /// The job succeeded but produced no images.
    #[error("try-on job succeeded without any result images")]
    EmptyResults,

    /// The job did not reach a terminal state within the poll deadline.
    #[error("try-on job still running after {0:?}")]
    TryOnTimeout(Duration),

    /// Another run is already in flight on this orchestrator.
    #[error("a try-on run is already in progress")]
    AlreadyRunning,
}
