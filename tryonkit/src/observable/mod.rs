//! Thread-safe observable value with linearizable listener delivery.
//!
//! [`ObservableValue`] is a shared container whose only mutation is value
//! replacement. All mutation and listener dispatch are serialized through
//! a dedicated notifier task per instance, so two concurrent `set` calls
//! are applied in issue order and no listener ever observes values out of
//! order or concurrently with another listener of the same instance.
//!
//! # Architecture
//!
//! ```text
//! set(v) ──┐  (lock held across write + send)
//! set(w) ──┼──► unbounded channel ──► notifier task ──► listeners, in order
//! get()  ──┘        │
//!                   └── snapshot mutex answers get() without the task
//! ```
//!
//! Listeners are invoked on the notifier task, never on the caller's
//! thread; hopping onward to a UI context is the consumer's explicit
//! responsibility.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Global counter for generating unique listener IDs.
static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies one registered listener for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Shared listener callback invoked with each new value.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

enum Command<T> {
    Set(T),
    Subscribe {
        id: ListenerId,
        fire_immediately: bool,
        listener: Listener<T>,
    },
    Unsubscribe(ListenerId),
}

struct Inner<T> {
    /// Snapshot for `get()`. Held across the channel send in `set()` so
    /// channel order always matches value order.
    value: Mutex<T>,
    tx: mpsc::UnboundedSender<Command<T>>,
}

/// Thread-safe container broadcasting value changes to subscribers.
///
/// Cloning is cheap and all clones share the same value and listener set.
/// Must be created inside a Tokio runtime; the notifier task exits when
/// the last clone is dropped.
pub struct ObservableValue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ObservableValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> ObservableValue<T> {
    /// Creates a new observable holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command<T>>();
        let mut current = initial.clone();

        tokio::spawn(async move {
            let mut listeners: HashMap<ListenerId, Listener<T>> = HashMap::new();
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Set(value) => {
                        current = value;
                        for listener in listeners.values() {
                            listener(&current);
                        }
                    }
                    Command::Subscribe {
                        id,
                        fire_immediately,
                        listener,
                    } => {
                        if fire_immediately {
                            listener(&current);
                        }
                        listeners.insert(id, listener);
                    }
                    Command::Unsubscribe(id) => {
                        listeners.remove(&id);
                    }
                }
            }
        });

        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(initial),
                tx,
            }),
        }
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    /// Replaces the value and schedules in-order delivery to all listeners.
    pub fn set(&self, value: T) {
        let mut guard = self.inner.value.lock();
        *guard = value.clone();
        let _ = self.inner.tx.send(Command::Set(value));
    }

    /// Mutates the value in place, atomically with respect to other
    /// `set`/`update` calls, then delivers the new value to listeners.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        let mut guard = self.inner.value.lock();
        mutate(&mut guard);
        let _ = self.inner.tx.send(Command::Set(guard.clone()));
    }

    /// Registers a listener.
    ///
    /// With `fire_immediately`, the listener is first invoked once with
    /// the value current at registration time (as seen by the notifier
    /// task), before any subsequent change.
    pub fn subscribe(
        &self,
        fire_immediately: bool,
        listener: impl Fn(&T) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId::next();
        let _ = self.inner.tx.send(Command::Subscribe {
            id,
            fire_immediately,
            listener: Arc::new(listener),
        });
        id
    }

    /// Removes a previously registered listener.
    ///
    /// Removing an unknown id is a no-op.
    pub fn unsubscribe(&self, id: ListenerId) {
        let _ = self.inner.tx.send(Command::Unsubscribe(id));
    }
}

impl<T: Clone + Send + fmt::Debug + 'static> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("value", &self.get())
            .finish()
    }
}
