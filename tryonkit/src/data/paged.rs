//! Paged provider exposing a growing prefix of a fixed backing list.

use crate::data::DataProvider;
use crate::observable::ObservableValue;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exposes a fixed backing list `chunk_size` items at a time.
///
/// `can_update` stays true while the exposed prefix is shorter than the
/// backing list. An atomic pending flag guards `request_update` against
/// re-entrant calls, so at most one page is appended per request.
pub struct PagedProvider<T> {
    backing: Vec<T>,
    chunk_size: usize,
    exposed: ObservableValue<Vec<T>>,
    pending: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> PagedProvider<T> {
    /// Creates a paged provider over `backing`.
    ///
    /// A `chunk_size` of zero is treated as one.
    pub fn new(backing: Vec<T>, chunk_size: usize) -> Self {
        Self {
            backing,
            chunk_size: chunk_size.max(1),
            exposed: ObservableValue::new(Vec::new()),
            pending: AtomicBool::new(false),
        }
    }

    /// Returns the configured page size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn implement_update(&self) {
        self.exposed.update(|items| {
            let next = (items.len() + self.chunk_size).min(self.backing.len());
            items.extend_from_slice(&self.backing[items.len()..next]);
        });
    }
}

impl<T: Clone + Send + Sync + 'static> DataProvider<T> for PagedProvider<T> {
    fn updates(&self) -> &ObservableValue<Vec<T>> {
        &self.exposed
    }

    fn can_update(&self) -> bool {
        self.exposed.get().len() < self.backing.len()
    }

    fn request_update(&self) {
        if !self.can_update() {
            return;
        }
        if self.pending.swap(true, Ordering::SeqCst) {
            return;
        }
        self.implement_update();
        self.pending.store(false, Ordering::SeqCst);
    }
}
