//! Version extraction from the source page
//!
//! Each tracked app has one rule: an anchor locator (the link pointing at the
//! app's download path) and a version pattern applied to the anchor's visible
//! text. A missing anchor or a non-matching text is a routine miss, never an
//! error; the version token itself must be dotted-numeric.

use std::sync::LazyLock;

use regex::Regex;

use crate::state::AppId;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Extraction rule for one tracked application
pub struct ScrapeRule {
    pub app: AppId,
    anchor: Regex,
    version: Regex,
}

impl ScrapeRule {
    fn new(app: AppId, href: &str, version_pattern: &str) -> Self {
        let anchor_pattern = format!(
            r#"(?is)<a\b[^>]*\bhref\s*=\s*["']{}["'][^>]*>(.*?)</a>"#,
            regex::escape(href)
        );

        Self {
            app,
            anchor: Regex::new(&anchor_pattern).unwrap(),
            version: Regex::new(version_pattern).unwrap(),
        }
    }

    pub fn youtube_revanced() -> Self {
        Self::new(
            AppId::YoutubeRevanced,
            "/youtube-revanced",
            r"YouTube ReVanced (\d+\.\d+\.\d+)",
        )
    }

    pub fn microg() -> Self {
        Self::new(AppId::Microg, "/gmscore-microg", r"MicroG (\d+(?:\.\d+)*)")
    }

    /// All rules, in the fixed order cycles process them
    pub fn all() -> Vec<ScrapeRule> {
        vec![Self::youtube_revanced(), Self::microg()]
    }

    /// Extract the version token from `html`, or `None` when the anchor is
    /// absent or its text does not carry a valid version
    pub fn extract(&self, html: &str) -> Option<String> {
        let inner = self.anchor.captures(html)?.get(1)?.as_str();
        let text = visible_text(inner);

        let captures = self.version.captures(&text)?;
        Some(captures.get(1)?.as_str().to_string())
    }
}

/// Strip markup from an HTML fragment and collapse whitespace
fn visible_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
