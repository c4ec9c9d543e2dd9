//! TryOnKit - virtual try-on client SDK core
//!
//! This library provides the concurrency core of a virtual try-on client:
//! the asynchronous generation pipeline (upload, job submission, status
//! polling, result prefetch), a tiered deduplicating image fetch/cache
//! layer, and the observable collection primitives that propagate history
//! and session state to the UI layer.
//!
//! # High-Level API
//!
//! The [`orchestrator`] module drives one try-on request end to end:
//!
//! ```ignore
//! use tryonkit::config::TryOnConfig;
//! use tryonkit::orchestrator::{TryOnOrchestrator, TryOnProgress};
//!
//! let orchestrator = TryOnOrchestrator::new(
//!     uploader,      // Arc<dyn ImageUploader>
//!     gateway,       // Arc<dyn TryOnGateway>
//!     image_fetch,   // Arc<dyn RemoteImageFetch>
//!     history,       // Arc<HistoryStore>
//!     TryOnConfig::default(),
//! );
//!
//! let records = orchestrator
//!     .run(source, "sku-123", |p| println!("{p:?}"))
//!     .await?;
//! ```
//!
//! Rendering, theming and navigation are intentionally out of scope; the
//! collaborator traits in [`backend`] and [`source`] are the only seams
//! to the network and persistence layers.

pub mod backend;
pub mod cache;
pub mod config;
pub mod data;
pub mod history;
pub mod loader;
pub mod logging;
pub mod observable;
pub mod orchestrator;
pub mod source;

/// Version of the TryOnKit library.
///
/// Synchronized with `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
