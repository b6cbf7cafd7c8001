//! Persisted content-settings store for the CLI
//!
//! The real authoritative store lives inside the browser; the CLI stands
//! one up on top of the same key-value file the rule cache uses, under its
//! own key, so toggles survive between invocations.

use std::sync::Arc;

use async_trait::async_trait;

use njs_core::pattern::{pattern_matches, specificity};
use njs_core::{Setting, SiteRule};
use njs_runtime::{ContentSettingsStore, KeyValueStore, StoreError};

const SETTINGS_KEY: &str = "contentSettingRules";

pub struct PersistedContentSettings {
    kv: Arc<dyn KeyValueStore>,
}

impl PersistedContentSettings {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read_rules(&self) -> Result<Vec<SiteRule>, StoreError> {
        match self.kv.get(SETTINGS_KEY).await? {
            None => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn write_rules(&self, rules: &[SiteRule]) -> Result<(), StoreError> {
        self.kv
            .set(SETTINGS_KEY, serde_json::to_value(rules)?)
            .await
    }
}

#[async_trait]
impl ContentSettingsStore for PersistedContentSettings {
    async fn get(&self, url: &str) -> Result<Setting, StoreError> {
        let rules = self.read_rules().await?;
        // Most specific matching pattern wins; later install wins ties
        let mut best: Option<(usize, Setting)> = None;
        for rule in &rules {
            if !pattern_matches(&rule.pattern, url) {
                continue;
            }
            let rank = specificity(&rule.pattern);
            if best.map_or(true, |(prev, _)| rank >= prev) {
                best = Some((rank, rule.setting));
            }
        }
        // No matching rule falls through to the default (allow)
        Ok(best.map(|(_, s)| s).unwrap_or_default())
    }

    async fn set(&self, pattern: &str, setting: Setting) -> Result<(), StoreError> {
        let mut rules = self.read_rules().await?;
        match rules.iter_mut().find(|r| r.pattern == pattern) {
            Some(existing) => existing.setting = setting,
            None => rules.push(SiteRule::new(pattern, setting)),
        }
        self.write_rules(&rules).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.kv.remove(SETTINGS_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use njs_runtime::stores::json_file::JsonFileStore;

    #[tokio::test]
    async fn test_set_get_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(JsonFileStore::new(dir.path().join("rules.json")));
        let cs = PersistedContentSettings::new(kv);

        // Before any rule exists the default applies
        assert_eq!(cs.get("https://example.com/").await.unwrap(), Setting::Allow);

        cs.set("*://*.example.com/*", Setting::Block).await.unwrap();
        assert_eq!(
            cs.get("https://sub.example.com/x").await.unwrap(),
            Setting::Block
        );

        cs.set("*://*.example.com/*", Setting::Allow).await.unwrap();
        assert_eq!(
            cs.get("https://example.com/").await.unwrap(),
            Setting::Allow
        );

        cs.clear_all().await.unwrap();
        assert_eq!(cs.get("https://example.com/").await.unwrap(), Setting::Allow);
    }
}
