//! Update detection cycle: fetch, extract, compare against stored state
//!
//! One cycle is a single sequential pass: fetch the page once, then for every
//! tracked app in fixed order extract its version and commit it to the store.
//! A failed fetch aborts the whole cycle with an empty result and no store
//! mutation; an extraction miss skips just that app. Callers must not run
//! cycles concurrently against the same store.

use tracing::{error, info, warn};

use crate::fetch::PageSource;
use crate::scrape::ScrapeRule;
use crate::state::{AppInfo, AppStore};

/// A detected version change for one tracked application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub old: AppInfo,
    pub new: AppInfo,
}

/// Orchestrates check cycles over a page source and the version store
pub struct UpdateChecker<S: PageSource> {
    source: S,
    store: AppStore,
    rules: Vec<ScrapeRule>,
}

impl<S: PageSource> UpdateChecker<S> {
    pub fn new(source: S, store: AppStore) -> Self {
        Self {
            source,
            store,
            rules: ScrapeRule::all(),
        }
    }

    /// Run one check cycle and return the detected changes, ordered by the
    /// fixed app processing order.
    ///
    /// An empty result means "no updates": a failed fetch is logged but is
    /// deliberately indistinguishable from an unchanged page at this layer.
    pub async fn check_updates(&mut self) -> Vec<VersionChange> {
        let html = match self.source.fetch_page().await {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to fetch source page: {}", e);
                return Vec::new();
            }
        };

        let mut changes = Vec::new();

        for rule in &self.rules {
            let app = rule.app;

            // A miss leaves the stored version untouched, without even a
            // redundant save.
            let Some(version) = rule.extract(&html) else {
                warn!("No version found for {} on source page", app.display_name());
                continue;
            };

            let update = self.store.update_version(app, &version);
            if update.changed {
                info!(
                    "Update detected for {}: {} -> {}",
                    app.display_name(),
                    update.old.version,
                    update.new.version
                );
                changes.push(VersionChange {
                    old: update.old,
                    new: update.new,
                });
            }
        }

        changes
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppStore {
        &mut self.store
    }
}
