//! Toggle controller
//!
//! Orchestrates "flip the script rule for the current page": derive the
//! pattern, read the effective setting, flip it, write the authoritative
//! store, mirror into the cache, reload the page. All dependencies are
//! injected so the whole flow runs against fakes.

use std::sync::Arc;

use njs_core::{derive, SiteRule};

use crate::cache::RuleCache;
use crate::stores::{ContentSettingsStore, StoreError, Tab, TabControl};

pub struct ToggleController {
    settings: Arc<dyn ContentSettingsStore>,
    cache: Arc<RuleCache>,
    tabs: Arc<dyn TabControl>,
}

impl ToggleController {
    pub fn new(
        settings: Arc<dyn ContentSettingsStore>,
        cache: Arc<RuleCache>,
        tabs: Arc<dyn TabControl>,
    ) -> Self {
        Self {
            settings,
            cache,
            tabs,
        }
    }

    /// Flip the rule for the page a user action was invoked on.
    ///
    /// A URL with no derivable pattern is a silent no-op: nothing is
    /// written, nothing reloads, nothing is surfaced. Otherwise the
    /// authoritative store is updated before the reload is requested; the
    /// cache upsert is a UI mirror and may race the reload harmlessly.
    pub async fn toggle(&self, tab: &Tab) -> Result<(), StoreError> {
        let pattern = match derive(&tab.url) {
            Some(pattern) => pattern,
            None => return Ok(()),
        };

        let current = self.settings.get(&tab.url).await?;
        let next = current.flipped();

        self.settings.set(&pattern, next).await?;
        self.cache
            .upsert(SiteRule::new(pattern.clone(), next))
            .await?;
        self.tabs.reload(tab.id);

        log::debug!("toggled {pattern} -> {next}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::{
        MemoryContentSettings, MemoryKeyValueStore, RecordingTabControl,
    };
    use njs_core::Setting;

    struct Fixture {
        settings: Arc<MemoryContentSettings>,
        cache: Arc<RuleCache>,
        tabs: Arc<RecordingTabControl>,
        controller: ToggleController,
    }

    fn fixture() -> Fixture {
        let settings = Arc::new(MemoryContentSettings::new());
        let kv = Arc::new(MemoryKeyValueStore::new());
        let cache = Arc::new(RuleCache::new(kv));
        let tabs = Arc::new(RecordingTabControl::new());
        let controller =
            ToggleController::new(settings.clone(), cache.clone(), tabs.clone());
        Fixture {
            settings,
            cache,
            tabs,
            controller,
        }
    }

    fn tab(url: &str) -> Tab {
        Tab {
            id: 7,
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_toggle_blocks_an_allowed_page() {
        let fx = fixture();
        // Store reports the default (allow) before the first toggle
        fx.controller
            .toggle(&tab("https://sub.example.com/path"))
            .await
            .unwrap();

        let pattern = "*://*.sub.example.com/*";
        assert_eq!(fx.settings.rule_for(pattern), Some(Setting::Block));
        assert_eq!(
            fx.settings.get("https://sub.example.com/path").await.unwrap(),
            Setting::Block
        );
        assert_eq!(
            fx.cache.load_snapshot().await.unwrap(),
            vec![SiteRule::new(pattern, Setting::Block)]
        );
        assert_eq!(fx.tabs.reloads(), vec![7]);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_allow() {
        let fx = fixture();
        let page = tab("https://sub.example.com/path");
        fx.controller.toggle(&page).await.unwrap();
        fx.controller.toggle(&page).await.unwrap();

        let pattern = "*://*.sub.example.com/*";
        assert_eq!(fx.settings.rule_for(pattern), Some(Setting::Allow));
        assert_eq!(
            fx.cache.load_snapshot().await.unwrap(),
            vec![SiteRule::new(pattern, Setting::Allow)]
        );
        // Exactly one cached rule for the pattern, both reloads issued
        assert_eq!(fx.cache.load_snapshot().await.unwrap().len(), 1);
        assert_eq!(fx.tabs.reloads(), vec![7, 7]);
    }

    #[tokio::test]
    async fn test_internal_page_is_a_silent_noop() {
        let fx = fixture();
        fx.controller
            .toggle(&tab("chrome://settings"))
            .await
            .unwrap();

        assert_eq!(fx.settings.rule_count(), 0);
        assert!(fx.cache.load_snapshot().await.unwrap().is_empty());
        assert!(fx.tabs.reloads().is_empty());
    }

    #[tokio::test]
    async fn test_file_url_gets_exact_rule() {
        let fx = fixture();
        let url = "file:///home/user/doc.html";
        fx.controller.toggle(&tab(url)).await.unwrap();

        assert_eq!(fx.settings.rule_for(url), Some(Setting::Block));
        assert_eq!(
            fx.cache.load_snapshot().await.unwrap(),
            vec![SiteRule::new(url, Setting::Block)]
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates_and_skips_reload() {
        let fx = fixture();
        fx.settings.set_failing(true);
        let err = fx
            .controller
            .toggle(&tab("https://example.com/"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(fx.tabs.reloads().is_empty());
        assert!(fx.cache.load_snapshot().await.unwrap().is_empty());
    }
}
