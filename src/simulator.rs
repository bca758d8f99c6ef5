//! In-process update simulator
//!
//! Renders the source site's markup for arbitrary injected versions and
//! drives full check cycles against it, so the whole fetch-extract-commit
//! path can be exercised without touching the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::checker::{UpdateChecker, VersionChange};
use crate::fetch::{FetchError, PageSource};
use crate::state::AppId;

/// Settable page source rendering the same markup as the real site
#[derive(Clone, Default)]
pub struct SimulatedSource {
    versions: Arc<Mutex<HashMap<AppId, String>>>,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&self, app: AppId, version: &str) {
        self.versions
            .lock()
            .expect("simulator version lock poisoned")
            .insert(app, version.to_string());
        info!("Simulator: set {} version to {}", app.display_name(), version);
    }

    pub fn version(&self, app: AppId) -> String {
        self.versions
            .lock()
            .expect("simulator version lock poisoned")
            .get(&app)
            .cloned()
            .unwrap_or_default()
    }

    /// Render the landing page with the currently injected versions
    pub fn render_page(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Vanced.to - Mock</title></head>
<body>
    <div>
        <a href="/youtube-revanced" class="block bg-red-600 text-white">
            YouTube ReVanced {yt}
            <svg width="24" height="24" viewBox="0 0 24 24" fill="none">
                <polyline points="7 10 12 15 17 10"></polyline>
            </svg>
        </a>
    </div>
    <div>
        <a href="/gmscore-microg" class="block bg-green-600 text-white">
            MicroG {microg}
            <svg width="24" height="24" viewBox="0 0 24 24" fill="none">
                <polyline points="7 10 12 15 17 10"></polyline>
            </svg>
        </a>
    </div>
</body>
</html>"#,
            yt = self.version(AppId::YoutubeRevanced),
            microg = self.version(AppId::Microg),
        )
    }
}

#[async_trait::async_trait]
impl PageSource for SimulatedSource {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        Ok(self.render_page())
    }
}

fn print_changes(changes: &[VersionChange]) {
    if changes.is_empty() {
        println!("No updates detected");
        return;
    }

    for change in changes {
        println!("Update detected: {} -> {}", change.old, change.new);
    }
}

/// Run the simulator: apply any initial versions, run a cycle, then take
/// commands from stdin until EOF or quit.
pub async fn run(
    source: SimulatedSource,
    checker: &mut UpdateChecker<SimulatedSource>,
    yt_version: Option<String>,
    microg_version: Option<String>,
) -> std::io::Result<()> {
    if yt_version.is_some() || microg_version.is_some() {
        if let Some(version) = yt_version {
            source.set_version(AppId::YoutubeRevanced, &version);
        }
        if let Some(version) = microg_version {
            source.set_version(AppId::Microg, &version);
        }

        let changes = checker.check_updates().await;
        print_changes(&changes);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("===== update simulator =====");
        println!("1. Set YouTube ReVanced version");
        println!("2. Set MicroG version");
        println!("3. Show current versions");
        println!("4. Reset state file");
        println!("5. Quit");
        println!("Choose (1-5): ");

        let Some(choice) = lines.next_line().await? else {
            break;
        };

        match choice.trim() {
            "1" => {
                println!("New YouTube ReVanced version: ");
                let Some(version) = lines.next_line().await? else {
                    break;
                };
                source.set_version(AppId::YoutubeRevanced, version.trim());
                print_changes(&checker.check_updates().await);
            }
            "2" => {
                println!("New MicroG version: ");
                let Some(version) = lines.next_line().await? else {
                    break;
                };
                source.set_version(AppId::Microg, version.trim());
                print_changes(&checker.check_updates().await);
            }
            "3" => {
                for app in AppId::ALL {
                    println!(
                        "{}: page={:?} stored={:?}",
                        app.display_name(),
                        source.version(app),
                        checker.store().current_version(app)
                    );
                }
            }
            "4" => {
                checker.store_mut().reset();
                println!("State reset");
            }
            "5" => break,
            other => println!("Invalid choice: {:?}. Enter a number from 1 to 5.", other),
        }
    }

    println!("Leaving simulator");
    Ok(())
}
