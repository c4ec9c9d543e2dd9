//! Transforming provider mapping upstream items through a pure function.

use crate::data::DataProvider;
use crate::observable::{ListenerId, ObservableValue};
use std::sync::Arc;

/// Maps every upstream item through a pure function, re-deriving on each
/// upstream update.
pub struct TransformProvider<U: Clone + Send + Sync + 'static, T> {
    upstream: Arc<dyn DataProvider<U>>,
    derived: ObservableValue<Vec<T>>,
    subscription: ListenerId,
}

impl<U: Clone + Send + Sync + 'static, T: Clone + Send + Sync + 'static> TransformProvider<U, T> {
    /// Creates a provider exposing `map` applied to every upstream item.
    pub fn new(
        upstream: Arc<dyn DataProvider<U>>,
        map: impl Fn(&U) -> T + Send + Sync + 'static,
    ) -> Self {
        let map = Arc::new(map);
        let apply = move |items: &[U]| -> Vec<T> { items.iter().map(|item| map(item)).collect() };

        let derived = ObservableValue::new(apply(upstream.items().as_slice()));
        // Fire-immediately covers an upstream update racing the snapshot.
        let subscription = {
            let derived = derived.clone();
            upstream
                .updates()
                .subscribe(true, move |items: &Vec<U>| derived.set(apply(items.as_slice())))
        };

        Self {
            upstream,
            derived,
            subscription,
        }
    }
}

impl<U: Clone + Send + Sync + 'static, T: Clone + Send + Sync + 'static> DataProvider<T>
    for TransformProvider<U, T>
{
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

impl<U: Clone + Send + Sync + 'static, T> Drop for TransformProvider<U, T> {
    fn drop(&mut self) {
        self.upstream.updates().unsubscribe(self.subscription);
    }
}
