//! NoJS CLI
//!
//! Exercises the script-toggle core against a JSON rules file: derive the
//! pattern for a URL, toggle a page, render the rule list, clear
//! everything.

mod store;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use njs_core::derive;
use njs_runtime::stores::json_file::JsonFileStore;
use njs_runtime::{
    ContentSettingsStore, OptionsView, RuleCache, Tab, TabControl, ToggleController,
};

use store::PersistedContentSettings;

#[derive(Parser)]
#[command(name = "njs")]
#[command(about = "Per-site script toggle rules over a JSON file")]
struct Cli {
    /// Rules file backing both stores
    #[arg(short, long, default_value = "rules.json", global = true)]
    rules: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rule pattern derived from a URL
    Derive {
        /// Page URL
        url: String,
    },

    /// Flip the script rule for a page
    Toggle {
        /// Page URL
        url: String,
    },

    /// Render the rule list as HTML
    List,

    /// Remove every rule from both stores
    Clear,
}

/// The CLI has no browsing surface to drive; reloads are just announced.
struct AnnouncingTabControl;

impl TabControl for AnnouncingTabControl {
    fn reload(&self, tab_id: i32) {
        println!("Reload requested for tab {tab_id}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Derive { url } => cmd_derive(&url),
        Commands::Toggle { url } => cmd_toggle(&cli.rules, &url).await,
        Commands::List => cmd_list(&cli.rules).await,
        Commands::Clear => cmd_clear(&cli.rules).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

struct Stores {
    settings: Arc<PersistedContentSettings>,
    cache: Arc<RuleCache>,
}

fn open_stores(rules_path: &str) -> Stores {
    let kv = Arc::new(JsonFileStore::new(rules_path));
    let settings = Arc::new(PersistedContentSettings::new(kv.clone()));
    let cache = Arc::new(RuleCache::new(kv));
    Stores { settings, cache }
}

fn cmd_derive(url: &str) -> Result<(), String> {
    match derive(url) {
        Some(pattern) => println!("{pattern}"),
        None => println!("No rule pattern applies to '{url}'"),
    }
    Ok(())
}

async fn cmd_toggle(rules_path: &str, url: &str) -> Result<(), String> {
    let stores = open_stores(rules_path);
    let controller = ToggleController::new(
        stores.settings.clone(),
        stores.cache.clone(),
        Arc::new(AnnouncingTabControl),
    );

    let tab = Tab {
        id: 1,
        url: url.to_string(),
    };
    controller
        .toggle(&tab)
        .await
        .map_err(|e| format!("Toggle failed: {e}"))?;

    match derive(url) {
        Some(pattern) => {
            let snapshot = stores
                .cache
                .load_snapshot()
                .await
                .map_err(|e| format!("Failed to read rules: {e}"))?;
            match snapshot.iter().find(|r| r.pattern == pattern) {
                Some(rule) => println!("{} -> {}", rule.pattern, rule.setting),
                None => println!("No rule recorded for '{pattern}'"),
            }
        }
        None => println!("No rule pattern applies to '{url}'"),
    }
    Ok(())
}

async fn cmd_list(rules_path: &str) -> Result<(), String> {
    let stores = open_stores(rules_path);
    let mut view = OptionsView::new(stores.settings.clone(), stores.cache.clone());
    view.refresh()
        .await
        .map_err(|e| format!("Failed to render rule list: {e}"))?;
    println!("{}", view.surface().to_html());
    Ok(())
}

async fn cmd_clear(rules_path: &str) -> Result<(), String> {
    let stores = open_stores(rules_path);
    stores
        .settings
        .clear_all()
        .await
        .map_err(|e| format!("Failed to clear settings: {e}"))?;
    stores
        .cache
        .clear()
        .await
        .map_err(|e| format!("Failed to clear rule cache: {e}"))?;
    println!("All rules removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use njs_core::Setting;

    #[tokio::test]
    async fn test_toggle_then_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let path = path.to_str().unwrap();

        cmd_toggle(path, "https://example.com/").await.unwrap();
        let stores = open_stores(path);
        assert_eq!(
            stores.settings.get("https://example.com/").await.unwrap(),
            Setting::Block
        );

        cmd_clear(path).await.unwrap();
        assert_eq!(
            stores.settings.get("https://example.com/").await.unwrap(),
            Setting::Allow
        );
        assert!(stores.cache.load_snapshot().await.unwrap().is_empty());
    }
}
