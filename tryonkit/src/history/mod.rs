//! History store synchronizing with the persistence collaborator.
//!
//! [`HistoryStore`] wraps two mirrored providers (uploaded photos,
//! generated results) and two "pending deletion" providers used purely
//! for optimistic UI. It is a typed, change-propagating facade: the
//! persisted lists always come from the collaborator's observables, never
//! from local computation.

mod types;

pub use types::{GeneratedImage, ImageOwner, UploadedImage};

use crate::backend::{HistoryPersistence, PersistenceError};
use crate::config::HistoryConfig;
use crate::data::ItemsProvider;
use crate::observable::ListenerId;
use std::sync::Arc;
use tracing::debug;

/// Observable history of uploaded photos and generated results.
///
/// Operations are silent no-ops when the corresponding feature is
/// disabled by configuration; the caller's in-memory flow proceeds
/// either way.
pub struct HistoryStore {
    persistence: Arc<dyn HistoryPersistence>,
    config: HistoryConfig,
    uploaded: Arc<ItemsProvider<UploadedImage>>,
    generated: Arc<ItemsProvider<GeneratedImage>>,
    deleting_uploaded: Arc<ItemsProvider<UploadedImage>>,
    deleting_generated: Arc<ItemsProvider<GeneratedImage>>,
    uploaded_subscription: ListenerId,
    generated_subscription: ListenerId,
}

impl HistoryStore {
    /// Creates a store mirroring the collaborator's persisted lists.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(persistence: Arc<dyn HistoryPersistence>, config: HistoryConfig) -> Self {
        let uploaded = Arc::new(ItemsProvider::new(persistence.uploaded().get()));
        let generated = Arc::new(ItemsProvider::new(persistence.generated().get()));

        // The immediate fire replays the list current at registration,
        // so an update racing the snapshot above is still mirrored.
        let uploaded_subscription = {
            let mirror = Arc::clone(&uploaded);
            persistence
                .uploaded()
                .subscribe(true, move |items: &Vec<UploadedImage>| {
                    mirror.set_items(items.clone())
                })
        };
        let generated_subscription = {
            let mirror = Arc::clone(&generated);
            persistence
                .generated()
                .subscribe(true, move |items: &Vec<GeneratedImage>| {
                    mirror.set_items(items.clone())
                })
        };

        Self {
            persistence,
            config,
            uploaded,
            generated,
            deleting_uploaded: Arc::new(ItemsProvider::new(Vec::new())),
            deleting_generated: Arc::new(ItemsProvider::new(Vec::new())),
            uploaded_subscription,
            generated_subscription,
        }
    }

    /// Mirror of the persisted uploaded list, most recent first.
    pub fn uploaded(&self) -> &Arc<ItemsProvider<UploadedImage>> {
        &self.uploaded
    }

    /// Mirror of the persisted generated list, most recent first.
    pub fn generated(&self) -> &Arc<ItemsProvider<GeneratedImage>> {
        &self.generated
    }

    /// Uploaded images with a deletion in flight.
    pub fn deleting_uploaded(&self) -> &Arc<ItemsProvider<UploadedImage>> {
        &self.deleting_uploaded
    }

    /// Generated images with a deletion in flight.
    pub fn deleting_generated(&self) -> &Arc<ItemsProvider<GeneratedImage>> {
        &self.deleting_generated
    }

    /// Persists a newly uploaded image.
    pub async fn add_uploaded(&self, image: UploadedImage) -> Result<(), PersistenceError> {
        if !self.config.uploads_enabled() {
            debug!(image_id = %image.id, "uploads history disabled, skipping persistence");
            return Ok(());
        }
        self.persistence.add_uploaded(image).await
    }

    /// Moves the uploaded image with `id` to the front of the history
    /// (MRU reorder), returning whether it was found.
    pub async fn touch_uploaded(&self, id: &str) -> Result<bool, PersistenceError> {
        if !self.config.uploads_enabled() {
            return Ok(false);
        }
        self.persistence.select_uploaded(id.to_string()).await
    }

    /// Deletes an uploaded image, tracking it as pending in the
    /// meantime.
    ///
    /// The image leaves the pending provider once the collaborator
    /// answers, whether the deletion succeeded or failed.
    pub async fn remove_uploaded(&self, image: UploadedImage) -> Result<(), PersistenceError> {
        if !self.config.uploads_enabled() {
            return Ok(());
        }
        self.deleting_uploaded.prepend(image.clone());
        let result = self.persistence.delete_uploaded(vec![image.clone()]).await;
        // Cleanup runs on success and failure alike.
        self.deleting_uploaded.remove(&image);
        result
    }

    /// Persists generated images; each record carries its product id.
    pub async fn add_generated(&self, images: Vec<GeneratedImage>) -> Result<(), PersistenceError> {
        if !self.config.generations_enabled() {
            debug!(
                count = images.len(),
                "generations history disabled, skipping persistence"
            );
            return Ok(());
        }
        self.persistence.add_generated(images).await
    }

    /// Deletes a selection of generated images, tracking them as pending
    /// in the meantime.
    pub async fn remove_generated(
        &self,
        selection: Vec<GeneratedImage>,
    ) -> Result<(), PersistenceError> {
        if !self.config.generations_enabled() {
            return Ok(());
        }
        self.deleting_generated.prepend_all(selection.clone());
        let result = self.persistence.delete_generated(selection.clone()).await;
        // Cleanup runs on success and failure alike.
        self.deleting_generated
            .remove_where(|image| selection.contains(image));
        result
    }
}

impl Drop for HistoryStore {
    fn drop(&mut self) {
        self.persistence
            .uploaded()
            .unsubscribe(self.uploaded_subscription);
        self.persistence
            .generated()
            .unsubscribe(self.generated_subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HistoryPersistence;
    use crate::data::DataProvider;
    use crate::observable::ObservableValue;
    use crate::source::BoxFuture;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    /// In-memory persistence collaborator with scriptable failures.
    struct MemoryPersistence {
        uploaded: ObservableValue<Vec<UploadedImage>>,
        generated: ObservableValue<Vec<GeneratedImage>>,
        fail_deletes: AtomicBool,
        calls: AtomicUsize,
    }

    impl MemoryPersistence {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                uploaded: ObservableValue::new(Vec::new()),
                generated: ObservableValue::new(Vec::new()),
                fail_deletes: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HistoryPersistence for MemoryPersistence {
        fn uploaded(&self) -> &ObservableValue<Vec<UploadedImage>> {
            &self.uploaded
        }

        fn generated(&self) -> &ObservableValue<Vec<GeneratedImage>> {
            &self.generated
        }

        fn add_uploaded(
            &self,
            image: UploadedImage,
        ) -> BoxFuture<'_, Result<(), PersistenceError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                self.uploaded.update(|items| items.insert(0, image));
                Ok(())
            })
        }

        fn select_uploaded(&self, id: String) -> BoxFuture<'_, Result<bool, PersistenceError>> {
            Box::pin(async move {
                let mut found = false;
                self.uploaded.update(|items| {
                    if let Some(position) = items.iter().position(|image| image.id == id) {
                        let image = items.remove(position);
                        items.insert(0, image);
                        found = true;
                    }
                });
                Ok(found)
            })
        }

        fn delete_uploaded(
            &self,
            images: Vec<UploadedImage>,
        ) -> BoxFuture<'_, Result<(), PersistenceError>> {
            Box::pin(async move {
                if self.fail_deletes.load(Ordering::SeqCst) {
                    return Err(PersistenceError::Backend("scripted failure".to_string()));
                }
                self.uploaded
                    .update(|items| items.retain(|image| !images.contains(image)));
                Ok(())
            })
        }

        fn add_generated(
            &self,
            images: Vec<GeneratedImage>,
        ) -> BoxFuture<'_, Result<(), PersistenceError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                self.generated.update(|items| {
                    items.splice(0..0, images);
                });
                Ok(())
            })
        }

        fn delete_generated(
            &self,
            images: Vec<GeneratedImage>,
        ) -> BoxFuture<'_, Result<(), PersistenceError>> {
            Box::pin(async move {
                if self.fail_deletes.load(Ordering::SeqCst) {
                    return Err(PersistenceError::Backend("scripted failure".to_string()));
                }
                self.generated
                    .update(|items| items.retain(|image| !images.contains(image)));
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_store_mirrors_persisted_lists() {
        let persistence = MemoryPersistence::new();
        let store = HistoryStore::new(
            Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
            HistoryConfig::default(),
        );

        store
            .add_uploaded(UploadedImage::new("img-1", "https://a"))
            .await
            .unwrap();
        sleep(Duration::from_millis(50)).await;

        let items = store.uploaded().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "img-1");
    }

    #[tokio::test]
    async fn test_mirror_catches_update_racing_construction() {
        for _ in 0..25 {
            let persistence = MemoryPersistence::new();
            let writer = {
                let persistence = Arc::clone(&persistence);
                tokio::spawn(async move {
                    persistence
                        .uploaded
                        .set(vec![UploadedImage::new("img-1", "https://a")])
                })
            };
            let store = HistoryStore::new(
                Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
                HistoryConfig::default(),
            );
            writer.await.unwrap();
            sleep(Duration::from_millis(10)).await;

            assert_eq!(store.uploaded().items(), persistence.uploaded.get());
        }
    }

    #[tokio::test]
    async fn test_touch_uploaded_moves_to_front() {
        let persistence = MemoryPersistence::new();
        let store = HistoryStore::new(
            Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
            HistoryConfig::default(),
        );

        store
            .add_uploaded(UploadedImage::new("img-1", "https://a"))
            .await
            .unwrap();
        store
            .add_uploaded(UploadedImage::new("img-2", "https://b"))
            .await
            .unwrap();

        assert!(store.touch_uploaded("img-1").await.unwrap());
        assert!(!store.touch_uploaded("missing").await.unwrap());
        sleep(Duration::from_millis(50)).await;

        assert_eq!(store.uploaded().items()[0].id, "img-1");
    }

    #[tokio::test]
    async fn test_disabled_features_skip_persistence() {
        let persistence = MemoryPersistence::new();
        let store = HistoryStore::new(
            Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
            HistoryConfig::default()
                .with_uploads_enabled(false)
                .with_generations_enabled(false),
        );

        store
            .add_uploaded(UploadedImage::new("img-1", "https://a"))
            .await
            .unwrap();
        store
            .add_generated(vec![GeneratedImage::new("gen-1", "https://g", "sku-1")])
            .await
            .unwrap();

        assert_eq!(persistence.calls.load(Ordering::SeqCst), 0);
        assert!(store.uploaded().items().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_deletion_cleans_up_on_success() {
        let persistence = MemoryPersistence::new();
        let store = HistoryStore::new(
            Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
            HistoryConfig::default(),
        );
        let image = GeneratedImage::new("gen-1", "https://g", "sku-1");
        store.add_generated(vec![image.clone()]).await.unwrap();

        store.remove_generated(vec![image.clone()]).await.unwrap();
        sleep(Duration::from_millis(50)).await;

        assert!(store.deleting_generated().items().is_empty());
        assert!(store.generated().items().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_deletion_cleans_up_on_failure() {
        let persistence = MemoryPersistence::new();
        let store = HistoryStore::new(
            Arc::clone(&persistence) as Arc<dyn HistoryPersistence>,
            HistoryConfig::default(),
        );
        let image = GeneratedImage::new("gen-1", "https://g", "sku-1");
        store.add_generated(vec![image.clone()]).await.unwrap();
        persistence.fail_deletes.store(true, Ordering::SeqCst);

        let result = store.remove_generated(vec![image.clone()]).await;
        sleep(Duration::from_millis(50)).await;

        assert!(result.is_err());
        assert!(
            store.deleting_generated().items().is_empty(),
            "pending entry is removed even when the collaborator fails"
        );
        assert_eq!(store.generated().items().len(), 1, "entry stays in history");
    }
}
