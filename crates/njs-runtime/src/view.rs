//! Reactive rule list view
//!
//! Renders the cached rule snapshot into a table with per-rule toggle
//! buttons and a remove-all control, re-rendering the whole surface on
//! every snapshot change. Button presses post messages onto a single
//! queue the view drains itself, so handlers run to completion one at a
//! time on one event loop.

use std::sync::Arc;

use tokio::sync::mpsc;

use njs_core::{Setting, SiteRule};
use njs_dom::builder::h;
use njs_dom::value::{map, Handler, Value};
use njs_dom::{DomError, Node, Surface};

use crate::cache::RuleCache;
use crate::stores::{ContentSettingsStore, StoreError};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dom(#[from] DomError),
}

// =============================================================================
// Messages
// =============================================================================

/// User actions posted by rendered controls.
#[derive(Debug, Clone)]
pub enum ViewMsg {
    /// Flip the setting of one cached rule.
    Toggle(SiteRule),
    /// Drop every rule from both stores.
    RemoveAll,
}

// =============================================================================
// View
// =============================================================================

pub struct OptionsView {
    settings: Arc<dyn ContentSettingsStore>,
    cache: Arc<RuleCache>,
    surface: Surface,
    tx: mpsc::UnboundedSender<ViewMsg>,
    rx: mpsc::UnboundedReceiver<ViewMsg>,
}

impl OptionsView {
    pub fn new(settings: Arc<dyn ContentSettingsStore>, cache: Arc<RuleCache>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            settings,
            cache,
            surface: Surface::new(),
            tx,
            rx,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Load the current snapshot and render it.
    pub async fn refresh(&mut self) -> Result<(), ViewError> {
        let rules = self.cache.load_snapshot().await?;
        self.render(&rules)
    }

    /// Replace the surface with the tree for `rules`.
    pub fn render(&mut self, rules: &[SiteRule]) -> Result<(), ViewError> {
        let tree = self.gui(rules)?;
        self.surface.replace(Some(tree));
        Ok(())
    }

    /// Subscribe once, then alternate between queued user actions and
    /// snapshot changes until the persistence store goes away.
    pub async fn run(&mut self) -> Result<(), ViewError> {
        let mut changes = self.cache.changes();
        self.refresh().await?;
        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(msg) => self.handle(msg).await?,
                    None => return Ok(()),
                },
                snapshot = changes.next() => match snapshot {
                    Some(rules) => self.render(&rules)?,
                    None => return Ok(()),
                },
            }
        }
    }

    /// Drain and handle every queued message. Returns how many ran.
    pub async fn process_pending(&mut self) -> Result<usize, ViewError> {
        let mut handled = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.handle(msg).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Apply one user action. The per-rule toggle flips the cached entry
    /// and re-writes the authoritative store so the two never diverge.
    pub async fn handle(&mut self, msg: ViewMsg) -> Result<(), ViewError> {
        match msg {
            ViewMsg::Toggle(old) => {
                let next = old.setting.flipped();
                self.settings.set(&old.pattern, next).await?;
                self.cache.upsert(SiteRule::new(old.pattern, next)).await?;
            }
            ViewMsg::RemoveAll => {
                self.settings.clear_all().await?;
                self.cache.clear().await?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tree construction
    // ---------------------------------------------------------------------

    fn gui(&self, rules: &[SiteRule]) -> Result<Node, DomError> {
        if rules.is_empty() {
            return self.empty_state();
        }
        self.rule_table(rules)
    }

    fn empty_state(&self) -> Result<Node, DomError> {
        h(
            "div",
            map([
                ("className", Value::from("padding-0x5 gaps-1-v")),
                ("style", map([("textAlign", "center")])),
            ]),
            vec![
                h(
                    "h1",
                    Value::Null,
                    vec![h("b", Value::Null, vec!["The NoJS rule list is empty".into()])?.into()],
                )?
                .into(),
                h(
                    "div",
                    Value::Null,
                    vec!["Whitelist or blacklist websites by clicking the extension button".into()],
                )?
                .into(),
            ],
        )
    }

    fn rule_table(&self, rules: &[SiteRule]) -> Result<Node, DomError> {
        let mut rows = Vec::with_capacity(rules.len());
        for rule in rules {
            rows.push(Value::from(self.rule_row(rule)?));
        }

        let header = h(
            "tr",
            Value::Null,
            vec![
                Self::header_cell("Pattern")?.into(),
                Self::header_cell("Setting")?.into(),
                Self::header_cell("Toggle")?.into(),
            ],
        )?;

        let remove_all = {
            let tx = self.tx.clone();
            Handler::new(move || {
                let _ = tx.send(ViewMsg::RemoveAll);
            })
        };

        h(
            "div",
            Value::Null,
            vec![
                h(
                    "table",
                    map([("className", "cell-space-0x5")]),
                    vec![
                        h("thead", Value::Null, vec![header.into()])?.into(),
                        h("tbody", Value::Null, vec![Value::List(rows)])?.into(),
                    ],
                )?
                .into(),
                h(
                    "div",
                    map([("className", "padding-0x5")]),
                    vec![h(
                        "button",
                        map([
                            ("type", Value::from("button")),
                            ("className", Value::from("btn")),
                            ("onclick", Value::Handler(remove_all)),
                        ]),
                        vec!["Remove All".into()],
                    )?
                    .into()],
                )?
                .into(),
            ],
        )
    }

    fn rule_row(&self, rule: &SiteRule) -> Result<Node, DomError> {
        let toggle = {
            let tx = self.tx.clone();
            let rule = rule.clone();
            Handler::new(move || {
                let _ = tx.send(ViewMsg::Toggle(rule.clone()));
            })
        };

        h(
            "tr",
            Value::Null,
            vec![
                h(
                    "td",
                    Value::Null,
                    vec![h("code", Value::Null, vec![rule.pattern.as_str().into()])?.into()],
                )?
                .into(),
                h("td", Value::Null, vec![rule.setting.to_string().into()])?.into(),
                h(
                    "td",
                    Value::Null,
                    vec![h(
                        "button",
                        map([
                            ("type", Value::from("button")),
                            ("className", Value::from("btn")),
                            ("onclick", Value::Handler(toggle)),
                        ]),
                        vec!["toggle".into()],
                    )?
                    .into()],
                )?
                .into(),
            ],
        )
    }

    fn header_cell(label: &str) -> Result<Node, DomError> {
        h(
            "td",
            Value::Null,
            vec![h("h1", Value::Null, vec![label.into()])?.into()],
        )
    }
}
