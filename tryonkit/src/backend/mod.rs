//! Collaborator contracts for the network and persistence layers.
//!
//! The core never talks to the wire itself; it consumes these
//! object-safe traits and leaves field names, encodings and transports to
//! the embedding application. Async methods return
//! [`BoxFuture`](crate::source::BoxFuture)s so implementations can be
//! held as `Arc<dyn Trait>`.

use crate::history::{GeneratedImage, UploadedImage};
use crate::observable::ObservableValue;
use crate::source::BoxFuture;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Transport/status errors from network collaborators.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Errors from the history persistence collaborator.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("history persistence failed: {0}")]
    Backend(String),
}

/// An image known to the remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteImage {
    pub id: String,
    pub url: String,
}

/// Handle to a submitted generation job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationHandle {
    pub operation_id: String,
}

/// Remote generation job status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Job accepted, not yet started.
    Created,
    /// Generation is running.
    InProgress,
    /// Generation finished; results may still be empty.
    Success,
    /// Generation failed server-side.
    Failed,
    /// No person was detected in the source image.
    Aborted,
    /// Job was cancelled.
    Cancelled,
    /// Status the client does not recognize.
    Unknown,
}

impl JobStatus {
    /// Returns true if polling should stop at this status.
    ///
    /// Terminal statuses are Success, Failed, Aborted, Cancelled and
    /// Unknown.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Created | Self::InProgress)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Aborted => write!(f, "aborted"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One result image in a job snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultImage {
    pub id: String,
    pub url: String,
}

/// Immutable snapshot of a generation job at one poll.
///
/// A new poll yields a new snapshot; snapshots are never mutated.
#[derive(Clone, Debug)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub error: Option<String>,
    pub results: Vec<ResultImage>,
}

/// Uploads user photos to the remote service.
pub trait ImageUploader: Send + Sync {
    /// Uploads compressed image bytes, returning the assigned remote
    /// image.
    fn upload(&self, image: Bytes) -> BoxFuture<'_, Result<RemoteImage, ApiError>>;
}

/// Submits and polls remote generation jobs.
pub trait TryOnGateway: Send + Sync {
    /// Submits a generation job for an uploaded image and a product.
    fn submit(
        &self,
        remote_image_id: String,
        product_id: String,
    ) -> BoxFuture<'_, Result<OperationHandle, ApiError>>;

    /// Fetches the current status snapshot of a job.
    fn poll(&self, operation_id: String) -> BoxFuture<'_, Result<JobSnapshot, ApiError>>;
}

/// Persists uploaded and generated history and broadcasts the full
/// persisted lists on every change.
///
/// The store in [`history`](crate::history) mirrors these observables
/// verbatim; it never computes history state on its own. Each operation
/// may be a no-op under configuration.
pub trait HistoryPersistence: Send + Sync {
    /// Observable of the full persisted uploaded list, most recent first.
    fn uploaded(&self) -> &ObservableValue<Vec<UploadedImage>>;

    /// Observable of the full persisted generated list, most recent
    /// first.
    fn generated(&self) -> &ObservableValue<Vec<GeneratedImage>>;

    /// Persists a newly uploaded image at the front of the list.
    fn add_uploaded(&self, image: UploadedImage) -> BoxFuture<'_, Result<(), PersistenceError>>;

    /// Moves the uploaded image with `id` to the front, returning whether
    /// it was found.
    fn select_uploaded(&self, id: String) -> BoxFuture<'_, Result<bool, PersistenceError>>;

    /// Deletes uploaded images, purging remote assets where ownership
    /// allows.
    fn delete_uploaded(
        &self,
        images: Vec<UploadedImage>,
    ) -> BoxFuture<'_, Result<(), PersistenceError>>;

    /// Persists generated images at the front of the list.
    fn add_generated(
        &self,
        images: Vec<GeneratedImage>,
    ) -> BoxFuture<'_, Result<(), PersistenceError>>;

    /// Deletes generated images.
    fn delete_generated(
        &self,
        images: Vec<GeneratedImage>,
    ) -> BoxFuture<'_, Result<(), PersistenceError>>;
}
