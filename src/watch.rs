//! Driver entry points: one-shot check and the recurring watch loop

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::checker::{UpdateChecker, VersionChange};
use crate::fetch::PageSource;
use crate::notify::Notifier;

/// Run a single check cycle and deliver its changes.
/// Returns the detected changes so callers can report them.
pub async fn run_once<S: PageSource>(
    checker: &mut UpdateChecker<S>,
    notifier: &dyn Notifier,
) -> Vec<VersionChange> {
    let changes = checker.check_updates().await;
    info!("Cycle complete: {} change(s) detected", changes.len());

    deliver(&changes, notifier).await;
    changes
}

/// Check on a fixed period, forever. The first cycle runs immediately.
///
/// Each cycle is awaited to completion before the next tick is taken, so
/// cycles never overlap and the store sees strictly sequential updates.
pub async fn run_loop<S: PageSource>(
    checker: &mut UpdateChecker<S>,
    notifier: &dyn Notifier,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Watching for updates every {:?}", period);

    loop {
        ticker.tick().await;
        run_once(checker, notifier).await;
    }
}

/// Deliver changes in detection order, logging and swallowing sink failures
async fn deliver(changes: &[VersionChange], notifier: &dyn Notifier) {
    for change in changes {
        if let Err(e) = notifier.notify(change).await {
            error!("Failed to deliver notification for {}: {}", change.new.name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use crate::state::{AppId, AppInfo, AppStore};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Sink that records delivered changes and can be told to fail
    struct RecordingNotifier {
        delivered: Mutex<Vec<VersionChange>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, change: &VersionChange) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            self.delivered.lock().unwrap().push(change.clone());
            Ok(())
        }
    }

    fn seeded_checker(
        dir: &TempDir,
        page: &str,
    ) -> UpdateChecker<crate::fetch::MockPageSource> {
        let mut store = AppStore::load(dir.path().join("app_state.json"));
        store.update_version(AppId::YoutubeRevanced, "19.16.39");
        store.update_version(AppId::Microg, "0.3.1.4");

        let mut source = crate::fetch::MockPageSource::new();
        let page = page.to_string();
        source.expect_fetch_page().returning(move || Ok(page.clone()));

        UpdateChecker::new(source, store)
    }

    #[tokio::test]
    async fn run_once_delivers_each_change_in_order() {
        let dir = TempDir::new().unwrap();
        let mut checker = seeded_checker(
            &dir,
            r#"<a href="/youtube-revanced">YouTube ReVanced 19.17.0</a>
               <a href="/gmscore-microg">MicroG 0.3.2.0</a>"#,
        );
        let notifier = RecordingNotifier::new(false);

        let changes = run_once(&mut checker, &notifier).await;

        assert_eq!(changes.len(), 2);
        let delivered = notifier.delivered.lock().unwrap();
        assert_eq!(*delivered, changes);
        assert_eq!(delivered[0].new, AppInfo::new(AppId::YoutubeRevanced, "19.17.0"));
        assert_eq!(delivered[1].new, AppInfo::new(AppId::Microg, "0.3.2.0"));
    }

    #[tokio::test]
    async fn run_once_survives_sink_failures() {
        let dir = TempDir::new().unwrap();
        let mut checker = seeded_checker(
            &dir,
            r#"<a href="/youtube-revanced">YouTube ReVanced 19.17.0</a>"#,
        );
        let notifier = RecordingNotifier::new(true);

        // Delivery fails but the cycle result still reports the change
        let changes = run_once(&mut checker, &notifier).await;

        assert_eq!(changes.len(), 1);
        assert!(notifier.delivered.lock().unwrap().is_empty());
    }
}
