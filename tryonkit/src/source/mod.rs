//! Image sources, quality tiers and fetch capabilities.
//!
//! An [`ImageSource`] pairs a stable identity (remote id for uploaded
//! images, local reference otherwise) with the capability to fetch pixel
//! data at a requested [`Quality`]. Identity drives cache keys and
//! equality: two sources are equal iff their identities are equal,
//! regardless of which fetcher backs them.

use bytes::Bytes;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Boxed future type for object-safe async collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Requested fidelity level for an image fetch.
///
/// Ordered low to high; the ordering drives the progressive-loading
/// cascade and lets display consumers ignore stale lower-quality
/// arrivals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quality {
    /// Small preview, cheap to fetch.
    Thumbnail,
    /// Full-resolution image.
    HiRes,
}

impl Quality {
    /// Returns all quality tiers in ascending order.
    ///
    /// Drives the progressive-loading cascade: tiers below the requested
    /// one are triggered in this order.
    pub fn ascending() -> [Quality; 2] {
        [Quality::Thumbnail, Quality::HiRes]
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thumbnail => write!(f, "thumbnail"),
            Self::HiRes => write!(f, "hires"),
        }
    }
}

/// Errors from fetching image pixel data.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level failure (network, I/O).
    #[error("image fetch failed: {0}")]
    Transport(String),

    /// The response was not usable image data.
    #[error("invalid image data: {0}")]
    InvalidData(String),
}

/// The logical identity of an image.
///
/// Remote ids are assigned by the upload service; local references
/// identify not-yet-uploaded content on the device.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceIdentity {
    /// Already uploaded, known to the remote service.
    Remote { id: String },
    /// Local content that has not been uploaded yet.
    Local { reference: String },
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { id } => write!(f, "remote:{}", id),
            Self::Local { reference } => write!(f, "local:{}", reference),
        }
    }
}

/// Capability to fetch pixel data for one image at a given quality.
///
/// Implemented by the embedding application for local content and by
/// URL-based adapters for remote content.
pub trait ImageFetch: Send + Sync {
    /// Fetches the image bytes at the requested quality.
    fn fetch(&self, quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// Collaborator that fetches remote images by URL.
///
/// The quality tier lets the implementation pick a thumbnail variant of
/// the URL where the service offers one.
pub trait RemoteImageFetch: Send + Sync {
    /// Fetches the image at `url` at the requested quality.
    fn fetch(&self, url: String, quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// An image with a stable identity and a fetch capability.
///
/// Immutable once created. Cloning shares the underlying fetcher.
#[derive(Clone)]
pub struct ImageSource {
    identity: SourceIdentity,
    fetcher: Arc<dyn ImageFetch>,
}

impl ImageSource {
    /// Creates a source for local, not-yet-uploaded content.
    pub fn local(reference: impl Into<String>, fetcher: Arc<dyn ImageFetch>) -> Self {
        Self {
            identity: SourceIdentity::Local {
                reference: reference.into(),
            },
            fetcher,
        }
    }

    /// Creates a source for an already-uploaded image.
    pub fn remote(id: impl Into<String>, fetcher: Arc<dyn ImageFetch>) -> Self {
        Self {
            identity: SourceIdentity::Remote { id: id.into() },
            fetcher,
        }
    }

    /// Creates a remote source backed by a URL-based fetch collaborator.
    pub fn remote_url(
        id: impl Into<String>,
        url: impl Into<String>,
        fetcher: Arc<dyn RemoteImageFetch>,
    ) -> Self {
        Self {
            identity: SourceIdentity::Remote { id: id.into() },
            fetcher: Arc::new(RemoteFetchAdapter {
                url: url.into(),
                fetcher,
            }),
        }
    }

    /// Returns the identity of this source.
    pub fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    /// Returns the remote id if this source is already uploaded.
    pub fn remote_id(&self) -> Option<&str> {
        match &self.identity {
            SourceIdentity::Remote { id } => Some(id),
            SourceIdentity::Local { .. } => None,
        }
    }

    /// Fetches the pixel data at the requested quality.
    pub fn fetch(&self, quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        self.fetcher.fetch(quality)
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ImageSource {}

impl Hash for ImageSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Adapts a URL plus a [`RemoteImageFetch`] collaborator into a
/// per-source [`ImageFetch`] capability.
struct RemoteFetchAdapter {
    url: String,
    fetcher: Arc<dyn RemoteImageFetch>,
}

impl ImageFetch for RemoteFetchAdapter {
    fn fetch(&self, quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        self.fetcher.fetch(self.url.clone(), quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetch(Vec<u8>);

    impl ImageFetch for StaticFetch {
        fn fetch(&self, _quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>> {
            let data = Bytes::from(self.0.clone());
            Box::pin(async move { Ok(data) })
        }
    }

    fn fetcher() -> Arc<dyn ImageFetch> {
        Arc::new(StaticFetch(vec![1, 2, 3]))
    }

    #[test]
    fn test_quality_ordering() {
        assert!(Quality::Thumbnail < Quality::HiRes);
        assert_eq!(
            Quality::ascending(),
            [Quality::Thumbnail, Quality::HiRes]
        );
    }

    #[test]
    fn test_source_equality_is_identity_based() {
        let a = ImageSource::remote("img-1", fetcher());
        let b = ImageSource::remote("img-1", Arc::new(StaticFetch(vec![9])));
        let c = ImageSource::remote("img-2", fetcher());

        assert_eq!(a, b, "equal identities compare equal regardless of fetcher");
        assert_ne!(a, c);
    }

    #[test]
    fn test_local_and_remote_identities_differ() {
        let local = ImageSource::local("photo.jpg", fetcher());
        let remote = ImageSource::remote("photo.jpg", fetcher());

        assert_ne!(local, remote);
        assert_eq!(local.remote_id(), None);
        assert_eq!(remote.remote_id(), Some("photo.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_delegates_to_capability() {
        let source = ImageSource::local("p", fetcher());
        let bytes = source.fetch(Quality::Thumbnail).await.unwrap();
        assert_eq!(&bytes[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_remote_url_adapter_passes_url() {
        struct RecordingFetch;

        impl RemoteImageFetch for RecordingFetch {
            fn fetch(
                &self,
                url: String,
                _quality: Quality,
            ) -> BoxFuture<'_, Result<Bytes, FetchError>> {
                Box::pin(async move { Ok(Bytes::from(url.into_bytes())) })
            }
        }

        let source =
            ImageSource::remote_url("img-1", "https://cdn.example/img-1", Arc::new(RecordingFetch));
        let bytes = source.fetch(Quality::HiRes).await.unwrap();
        assert_eq!(&bytes[..], b"https://cdn.example/img-1");
    }
}
