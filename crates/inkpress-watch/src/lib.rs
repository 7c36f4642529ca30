//! Rebuild-on-change watcher for inkpress sites.
//!
//! Watches the source and template directories of a [`StaticBuilder`] and runs a
//! full rebuild whenever a document or template changes. Changes that arrive while
//! a build is running are dropped rather than queued.
//!
//! [`StaticBuilder`]: inkpress_static::StaticBuilder

pub mod watcher;

pub use watcher::{handle_event, should_rebuild, Outcome, SiteWatcher, WatchError};
