//! Tab group controller

use folio_dom::{Host, Key, NodeId, Property, Query, TransitionEnd};

use crate::nav::{self, NavTarget};
use crate::spec::GroupSpec;
use crate::state::SwapState;
use crate::tab::{read_id, PanelEntry, TabEntry};
use crate::Result;

/// What an activation did to the panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The id was already active
    Unchanged,
    /// The visible panel is fading out; the target follows on completion
    FadingOut,
    /// The target panel was revealed immediately
    Revealed,
    /// No panel matches the id; only the tabs changed
    TabsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub prevent_default: bool,
    pub activation: Option<Activation>,
}

#[derive(Debug, Clone)]
pub struct TabGroup {
    name: String,
    tabs: Vec<TabEntry>,
    panels: Vec<PanelEntry>,
    active_id: Option<String>,
    swap: SwapState,
    active_class: String,
    id_attribute: String,
    initial: Option<Query>,
}

impl TabGroup {
    /// Collect the tabs and panels described by `spec`.
    ///
    /// Returns `None` unless the document has at least one of each.
    pub fn discover(host: &dyn Host, spec: &GroupSpec) -> Option<Self> {
        let doc = host.document();
        let tabs: Vec<TabEntry> = doc
            .query_all(&spec.tabs)
            .into_iter()
            .map(|node| TabEntry::read(doc, node, &spec.id_attribute))
            .collect();
        let panels: Vec<PanelEntry> = doc
            .query_all(&spec.panels)
            .into_iter()
            .map(|node| PanelEntry::read(doc, node, &spec.id_attribute))
            .collect();

        if tabs.is_empty() || panels.is_empty() {
            tracing::debug!(
                group = %spec.name,
                tabs = tabs.len(),
                panels = panels.len(),
                "Tab group not present"
            );
            return None;
        }

        tracing::debug!(
            group = %spec.name,
            tabs = tabs.len(),
            panels = panels.len(),
            "Discovered tab group"
        );

        Some(Self {
            name: spec.name.clone(),
            tabs,
            panels,
            active_id: None,
            swap: SwapState::Settled,
            active_class: spec.active_class.clone(),
            id_attribute: spec.id_attribute.clone(),
            initial: spec.initial.clone(),
        })
    }

    /// Apply the initial selection without any fade: the matching panel is
    /// shown and every other panel hidden.
    ///
    /// The markup's already-active tab wins, else the first tab. Nothing
    /// happens when the chosen tab has no id.
    pub fn initialize(&mut self, host: &mut dyn Host) -> Result<Option<String>> {
        let Some(id) = self.initial_id(host) else {
            tracing::debug!(group = %self.name, "No initial tab id, leaving markup as is");
            return Ok(None);
        };

        self.update_tabs(host, &id)?;
        let doc = host.document_mut();
        for panel in &self.panels {
            let selected = panel.id.as_deref() == Some(id.as_str());
            doc.set_hidden(panel.node, !selected)?;
            doc.toggle_class(panel.node, &self.active_class, selected)?;
        }

        tracing::debug!(group = %self.name, id = %id, "Initial tab applied");

        self.swap = SwapState::Settled;
        self.active_id = Some(id.clone());
        Ok(Some(id))
    }

    /// Select `id`, cross-fading from the visible panel to the matching one
    pub fn activate(&mut self, host: &mut dyn Host, id: &str) -> Result<Activation> {
        if self.active_id.as_deref() == Some(id) {
            return Ok(Activation::Unchanged);
        }

        let current = self
            .panels
            .iter()
            .find(|panel| !host.document().is_hidden(panel.node))
            .map(|panel| panel.node);
        let target = self
            .panels
            .iter()
            .find(|panel| panel.id.as_deref() == Some(id))
            .map(|panel| panel.node);

        self.update_tabs(host, id)?;

        let activation = match current {
            Some(outgoing) if Some(outgoing) != target => {
                host.document_mut()
                    .remove_class(outgoing, &self.active_class)?;
                // Replaces any fade already pending in this group
                self.set_swap(SwapState::FadingOut {
                    outgoing,
                    incoming: target,
                });
                Activation::FadingOut
            }
            _ => {
                self.set_swap(SwapState::Settled);
                match target {
                    Some(panel) => {
                        self.reveal(host, panel)?;
                        Activation::Revealed
                    }
                    None => Activation::TabsOnly,
                }
            }
        };

        tracing::debug!(group = %self.name, id = %id, ?activation, "Tab activated");

        self.active_id = Some(id.to_string());
        Ok(activation)
    }

    /// Pointer activation on a tab; tabs without an id do nothing
    pub fn click(&mut self, host: &mut dyn Host, node: NodeId) -> Result<Option<Activation>> {
        let Some(id) = self.tab(node).and_then(|tab| tab.id.clone()) else {
            return Ok(None);
        };
        self.activate(host, &id).map(Some)
    }

    /// Keyboard input on the tab `node`
    pub fn key_down(&mut self, host: &mut dyn Host, node: NodeId, key: &Key) -> Result<KeyOutcome> {
        let Some(index) = self.tabs.iter().position(|tab| tab.node == node) else {
            return Ok(KeyOutcome::default());
        };

        match nav::resolve(key, index, self.tabs.len()) {
            Some(NavTarget::Move(next)) => {
                let target = &self.tabs[next];
                let (target_node, target_id) = (target.node, target.id.clone());
                let activation = match target_id {
                    Some(id) => {
                        let activation = self.activate(host, &id)?;
                        host.focus(target_node)?;
                        Some(activation)
                    }
                    None => None,
                };
                Ok(KeyOutcome {
                    prevent_default: true,
                    activation,
                })
            }
            Some(NavTarget::Confirm) => match self.tabs[index].id.clone() {
                Some(id) => Ok(KeyOutcome {
                    prevent_default: true,
                    activation: Some(self.activate(host, &id)?),
                }),
                None => Ok(KeyOutcome::default()),
            },
            None => Ok(KeyOutcome::default()),
        }
    }

    /// Completion notification. Returns whether it was consumed.
    ///
    /// Only the `opacity` transition of the panel currently fading out counts.
    pub fn on_transition_end(&mut self, host: &mut dyn Host, end: &TransitionEnd) -> Result<bool> {
        if end.property != Property::Opacity || self.swap.outgoing() != Some(end.target) {
            return Ok(false);
        }
        self.finish_swap(host)?;
        Ok(true)
    }

    /// Finish a pending fade as if its completion had arrived.
    /// Returns `false` when nothing was pending.
    pub fn force_complete(&mut self, host: &mut dyn Host) -> Result<bool> {
        if self.swap.is_settled() {
            return Ok(false);
        }
        tracing::warn!(group = %self.name, swap = %self.swap, "Forcing stalled tab group to settle");
        self.finish_swap(host)?;
        Ok(true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tabs(&self) -> &[TabEntry] {
        &self.tabs
    }

    pub fn panels(&self) -> &[PanelEntry] {
        &self.panels
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn swap(&self) -> SwapState {
        self.swap
    }

    pub fn is_settled(&self) -> bool {
        self.swap.is_settled()
    }

    pub fn tab(&self, node: NodeId) -> Option<&TabEntry> {
        self.tabs.iter().find(|tab| tab.node == node)
    }

    /// Whether `node` is one of this group's tabs
    pub fn contains(&self, node: NodeId) -> bool {
        self.tab(node).is_some()
    }

    fn initial_id(&self, host: &dyn Host) -> Option<String> {
        let doc = host.document();
        let marked = self
            .initial
            .as_ref()
            .and_then(|query| doc.query_first(query));
        match marked {
            Some(node) => read_id(doc, node, &self.id_attribute),
            None => self.tabs.first().and_then(|tab| tab.id.clone()),
        }
    }

    fn update_tabs(&self, host: &mut dyn Host, id: &str) -> Result<()> {
        let doc = host.document_mut();
        for tab in &self.tabs {
            let active = tab.id.as_deref() == Some(id);
            doc.toggle_class(tab.node, &self.active_class, active)?;
            doc.set_attribute(tab.node, "aria-selected", if active { "true" } else { "false" })?;
            doc.set_tab_index(tab.node, if active { 0 } else { -1 })?;
        }
        Ok(())
    }

    fn reveal(&self, host: &mut dyn Host, panel: NodeId) -> Result<()> {
        host.document_mut().set_hidden(panel, false)?;
        // The unhidden, inactive style must be observed before the class lands
        host.flush_layout(panel);
        host.document_mut().add_class(panel, &self.active_class)?;
        Ok(())
    }

    fn finish_swap(&mut self, host: &mut dyn Host) -> Result<()> {
        let SwapState::FadingOut { outgoing, incoming } = self.swap else {
            return Ok(());
        };
        self.set_swap(SwapState::Settled);
        host.document_mut().set_hidden(outgoing, true)?;
        if let Some(panel) = incoming {
            self.reveal(host, panel)?;
        }
        Ok(())
    }

    fn set_swap(&mut self, next: SwapState) {
        if self.swap != next {
            tracing::debug!(group = %self.name, from = %self.swap, to = %next, "Tab group swap");
        }
        self.swap = next;
    }
}
