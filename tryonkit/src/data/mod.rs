//! Ordered, observable, lazily-extendable collections.
//!
//! A [`DataProvider`] exposes an ordered item list through an
//! [`ObservableValue`], so UI listeners learn about every replacement of
//! the list in order. Variants wrap an upstream provider and re-derive
//! their items deterministically on every upstream update:
//!
//! - [`ItemsProvider`] - plain list mutated only through explicit calls
//! - [`PagedProvider`] - growing prefix of a fixed backing list
//! - [`FilterProvider`] - predicate over the upstream items
//! - [`TransformProvider`] - pure mapping of the upstream items
//! - [`PrependProvider`] - fixed head list in front of the upstream

mod filter;
mod paged;
mod prepend;
mod transform;

pub use filter::FilterProvider;
pub use paged::PagedProvider;
pub use prepend::PrependProvider;
pub use transform::TransformProvider;

use crate::observable::ObservableValue;

/// An ordered, observable item collection.
///
/// `items` only changes through explicit API calls; no provider silently
/// drops entries.
pub trait DataProvider<T: Clone + Send + Sync + 'static>: Send + Sync {
    /// Observable of the full item list, replaced on every change.
    fn updates(&self) -> &ObservableValue<Vec<T>>;

    /// Snapshot of the current items.
    fn items(&self) -> Vec<T> {
        self.updates().get()
    }

    /// Whether more items can still be loaded.
    fn can_update(&self) -> bool {
        false
    }

    /// Empty only when there are no items *and* nothing left to load.
    fn is_empty(&self) -> bool {
        self.items().is_empty() && !self.can_update()
    }

    /// Requests loading of further items, if any.
    ///
    /// At most one load runs at a time; redundant requests are dropped.
    fn request_update(&self) {}
}

/// Plain ordered list provider.
///
/// Backs history mirrors and the session result list. All mutation is
/// atomic with respect to concurrent callers.
pub struct ItemsProvider<T> {
    items: ObservableValue<Vec<T>>,
}

impl<T: Clone + Send + Sync + 'static> ItemsProvider<T> {
    /// Creates a provider holding `initial`.
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            items: ObservableValue::new(initial),
        }
    }

    /// Replaces the whole list.
    pub fn set_items(&self, items: Vec<T>) {
        self.items.set(items);
    }

    /// Inserts `item` at the front.
    pub fn prepend(&self, item: T) {
        self.items.update(|items| items.insert(0, item));
    }

    /// Inserts `new_items` at the front, preserving their order.
    pub fn prepend_all(&self, new_items: Vec<T>) {
        self.items.update(|items| {
            items.splice(0..0, new_items);
        });
    }

    /// Inserts `item` at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, item: T) {
        self.items.update(|items| {
            let index = index.min(items.len());
            items.insert(index, item);
        });
    }

    /// Removes every item matching `predicate`, returning how many were
    /// removed.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> usize {
        let mut removed = 0;
        self.items.update(|items| {
            let before = items.len();
            items.retain(|item| !predicate(item));
            removed = before - items.len();
        });
        removed
    }
}

impl<T: Clone + Send + PartialEq + 'static> ItemsProvider<T> {
    /// Removes the first occurrence of `item`, returning whether it was
    /// found.
    pub fn remove(&self, item: &T) -> bool {
        let mut found = false;
        self.items.update(|items| {
            if let Some(position) = items.iter().position(|candidate| candidate == item) {
                items.remove(position);
                found = true;
            }
        });
        found
    }

    /// Moves the first item matching `predicate` to the front (MRU
    /// reorder), returning whether a match was found.
    pub fn move_to_front(&self, predicate: impl Fn(&T) -> bool) -> bool {
        let mut found = false;
        self.items.update(|items| {
            if let Some(position) = items.iter().position(|candidate| predicate(candidate)) {
                let item = items.remove(position);
                items.insert(0, item);
                found = true;
            }
        });
        found
    }
}

impl<T: Clone + Send + Sync + 'static> DataProvider<T> for ItemsProvider<T> {
    fn updates(&self) -> &ObservableValue<Vec<T>> {
        &self.items
    }
}
