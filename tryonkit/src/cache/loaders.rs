//! Shared loader cache keyed by source identity.
//!
//! One [`TieredImageLoader`] exists per distinct image source seen; the
//! sliding TTL keeps hot sources (thumbnails revisited while scrolling)
//! alive while letting idle loaders expire instead of growing without
//! bound.

use crate::cache::ExpiringCache;
use crate::loader::TieredImageLoader;
use crate::source::{ImageSource, SourceIdentity};
use std::sync::Arc;
use std::time::Duration;

/// Deduplicating cache of image loaders.
///
/// For two sources with equal identity this hands out the same loader
/// instance until the TTL elapses with no intervening use.
pub struct LoaderCache {
    loaders: ExpiringCache<SourceIdentity, Arc<TieredImageLoader>>,
}

impl LoaderCache {
    /// Creates a loader cache whose idle loaders expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            loaders: ExpiringCache::new(ttl),
        }
    }

    /// Returns the loader for `source`, creating it on first use.
    ///
    /// Must be called within a Tokio runtime; the loader spawns fetch
    /// tasks on demand.
    pub fn loader_for(&self, source: &ImageSource) -> Arc<TieredImageLoader> {
        self.loaders.get_or_insert(source.identity().clone(), || {
            Arc::new(TieredImageLoader::new(source.clone()))
        })
    }

    /// Removes expired loaders.
    pub fn sweep(&self) {
        self.loaders.sweep();
    }

    /// Returns the raw loader count, including not-yet-swept entries.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Returns whether no loaders are cached.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BoxFuture, FetchError, ImageFetch, Quality};
    use bytes::Bytes;

    struct NoopFetch;

    impl ImageFetch for NoopFetch {
        fn fetch(&self, _quality: Quality) -> BoxFuture<'_, Result<Bytes, FetchError>> {
            Box::pin(async { Ok(Bytes::new()) })
        }
    }

    fn source(id: &str) -> ImageSource {
        ImageSource::remote(id, Arc::new(NoopFetch))
    }

    #[tokio::test]
    async fn test_same_identity_shares_one_loader() {
        let cache = LoaderCache::new(Duration::from_secs(60));

        let a = cache.loader_for(&source("img-1"));
        let b = cache.loader_for(&source("img-1"));
        let c = cache.loader_for(&source("img-2"));

        assert!(Arc::ptr_eq(&a, &b), "equal sources share a loader");
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_loader_expires() {
        let cache = LoaderCache::new(Duration::from_millis(40));

        let first = cache.loader_for(&source("img-1"));
        tokio::time::sleep(Duration::from_millis(60)).await;

        let second = cache.loader_for(&source("img-1"));
        assert!(
            !Arc::ptr_eq(&first, &second),
            "an idle loader past its TTL is replaced"
        );
    }
}
