//! # BioStudio Service Worker
//!
//! Offline-capable request cache for the Biohacking Studio PWA.
//!
//! ## Features
//!
//! - **Lifecycle**: install (precache seeding), activate (stale store cleanup)
//! - **Routing policy**: cache-first, network-first, pass-through per resource class
//! - **Offline fallback**: placeholder page for failed navigations
//! - **Push notifications**: payload parsing, contextual actions, click dispatch
//! - **Clients API**: focus or open controlled pages
//!
//! ## Architecture
//!
//! ```text
//! ServiceWorker
//!     │
//!     ├── install ───→ CacheStorage (one versioned Cache)
//!     ├── activate ──→ delete stale stores, claim Clients
//!     │
//!     └── handle_fetch
//!             │
//!             classify(Request) ──→ Strategy
//!                 ├── PassThrough
//!                 ├── CacheFirst ────────────→ Cache ──(miss)──→ Fetcher
//!                 ├── NetworkFirstWithFallback → Fetcher ──(fail)──→ Cache / offline page
//!                 └── NetworkFirstSilent ─────→ Fetcher ──(fail)──→ Cache / nothing
//! ```

pub mod cache;
pub mod clients;
pub mod config;
pub mod fetch;
pub mod policy;
pub mod push;
pub mod worker;

pub use biostudio_common::{Result, StudioError};
pub use cache::{Cache, CacheEntry, CacheStorage};
pub use clients::{Client, Clients};
pub use config::{NotificationDefaults, WorkerConfig};
pub use fetch::{Fetcher, LoaderConfig, NetworkClient, Request, Response};
pub use policy::{classify, ResourceClass, Strategy};
pub use push::{
    ClickOutcome, Notification, NotificationAction, PushPayload, ACTION_DISMISS, ACTION_VIEW,
    TYPE_CLASS_REMINDER, TYPE_XP_EARNED,
};
pub use worker::{FetchOutcome, ServiceWorker, WorkerState};
