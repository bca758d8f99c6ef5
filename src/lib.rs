//! vanced-watch - update watcher for YouTube ReVanced and MicroG
//!
//! Periodically scrapes the source site for the published versions of the two
//! tracked apps, compares them against durably persisted state and hands every
//! detected change to a notification sink.
//!
//! # Modules
//!
//! - [`config`]: constants, data-dir resolution and runtime configuration
//! - [`state`]: persisted name/version store for the tracked apps
//! - [`scrape`]: per-app extraction rules applied to the fetched page
//! - [`fetch`]: page source trait and the HTTP implementation
//! - [`checker`]: the fetch-extract-compare-commit cycle
//! - [`notify`]: notification sinks (Discord webhook, log)
//! - [`watch`]: one-shot and recurring drivers
//! - [`simulator`]: in-process mock source for debugging

pub mod checker;
pub mod config;
pub mod fetch;
pub mod notify;
pub mod scrape;
pub mod simulator;
pub mod state;
pub mod watch;

pub use checker::{UpdateChecker, VersionChange};
pub use fetch::{HttpPageSource, PageSource};
pub use notify::{DiscordNotifier, LogNotifier, Notifier};
pub use state::{AppId, AppInfo, AppStore, VersionUpdate};
