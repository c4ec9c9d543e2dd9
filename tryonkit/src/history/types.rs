//! History record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who owns an image, deciding whether deletion may purge the underlying
/// remote asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageOwner {
    /// Uploaded or generated by the user; deletion may purge the asset.
    User,
    /// Provided by the service (demo models etc.); deletion only removes
    /// the history entry.
    ServiceProvided,
}

impl fmt::Display for ImageOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::ServiceProvided => write!(f, "service-provided"),
        }
    }
}

/// A user photo that has been uploaded for try-on.
///
/// Equality is identity-based (remote id only), so records survive
/// timestamp or URL refreshes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: String,
    pub url: String,
    pub owner: ImageOwner,
    pub created_at: DateTime<Utc>,
}

impl UploadedImage {
    /// Creates a record owned by the user, stamped with the current time.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            owner: ImageOwner::User,
            created_at: Utc::now(),
        }
    }
}

impl PartialEq for UploadedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UploadedImage {}

/// A generated try-on composite, paired with the product it was
/// generated for.
///
/// Equality is identity-based (remote id only).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
    pub owner: ImageOwner,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedImage {
    /// Creates a record owned by the user, stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            owner: ImageOwner::User,
            product_id: product_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl PartialEq for GeneratedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GeneratedImage {}
