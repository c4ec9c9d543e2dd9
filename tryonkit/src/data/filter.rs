//! Filtering provider over an upstream data provider.

use crate::data::DataProvider;
use crate::observable::{ListenerId, ObservableValue};
use std::sync::Arc;

/// Re-applies a predicate to the upstream's items on every upstream
/// update.
///
/// Derivation is pure: the same upstream state always yields the same
/// filtered list.
pub struct FilterProvider<T: Clone + Send + Sync + 'static> {
    upstream: Arc<dyn DataProvider<T>>,
    derived: ObservableValue<Vec<T>>,
    subscription: ListenerId,
}

impl<T: Clone + Send + Sync + 'static> FilterProvider<T> {
    /// Creates a provider exposing the upstream items matching
    /// `predicate`.
    pub fn new(
        upstream: Arc<dyn DataProvider<T>>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        let predicate = Arc::new(predicate);
        let apply = move |items: &[T]| -> Vec<T> {
            items.iter().filter(|item| predicate(item)).cloned().collect()
        };

        let derived = ObservableValue::new(apply(upstream.items().as_slice()));
        // Fire-immediately re-derives from the registration-time value,
        // so an upstream update racing the snapshot above is not lost.
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

impl<T: Clone + Send + Sync + 'static> DataProvider<T> for FilterProvider<T> {
    fn updates(&self) -> &ObservableValue<Vec<T>> {
        &self.derived
    }

    fn can_update(&self) -> bool {
        self.upstream.can_update()
    }

    fn request_update(&self) {
        self.upstream.request_update();
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for FilterProvider<T> {
    fn drop(&mut self) {
        self.upstream.updates().unsubscribe(self.subscription);
    }
}
