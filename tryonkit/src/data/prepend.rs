//! Prepending provider showing a fixed head list in front of an
//! upstream.

use crate::data::DataProvider;
use crate::observable::{ListenerId, ObservableValue};
use std::sync::Arc;

/// Always shows a fixed head list in front of the upstream's items.
///
/// When the upstream is empty the head is shown only if
/// `show_head_when_upstream_empty` is set.
pub struct PrependProvider<T: Clone + Send + Sync + 'static> {
    upstream: Arc<dyn DataProvider<T>>,
    derived: ObservableValue<Vec<T>>,
    subscription: ListenerId,
}

impl<T: Clone + Send + Sync + 'static> PrependProvider<T> {
    /// Creates a provider prepending `head` to the upstream's items.
    pub fn new(
        upstream: Arc<dyn DataProvider<T>>,
        head: Vec<T>,
        show_head_when_upstream_empty: bool,
    ) -> Self {
        let apply = move |items: &[T]| -> Vec<T> {
            if items.is_empty() && !show_head_when_upstream_empty {
                return Vec::new();
            }
            head.iter().cloned().chain(items.iter().cloned()).collect()
        };

        let derived = ObservableValue::new(apply(upstream.items().as_slice()));
        // Fire-immediately covers an upstream update racing the snapshot.
        let subscription = {
            let derived = derived.clone();
            upstream
                .updates()
                .subscribe(true, move |items: &Vec<T>| derived.set(apply(items.as_slice())))
        };

        Self {
            upstream,
            derived,
            subscription,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> DataProvider<T> for PrependProvider<T> {
    fn updates(&self) -> &ObservableValue<Vec<T>> {
        &self.derived
    }

    fn can_update(&self) -> bool {
        self.upstream.can_update()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty() && !self.can_update()
    }

    fn request_update(&self) {
        self.upstream.request_update();
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for PrependProvider<T> {
    fn drop(&mut self) {
        self.upstream.updates().unsubscribe(self.subscription);
    }
}
