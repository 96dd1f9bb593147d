//! Page coordinator
//!
//! Owns the document, the controllers and the virtual clock. Every input
//! event and rendering step goes through here:
//!
//! ```text
//! load ── ready pass (wrap sections, discover and initialize tab groups)
//!   │
//!   ├─ click / key_down ── nearest registered ancestor handles it
//!   │
//!   └─ advance ── per frame: transition ends → frame callbacks
//!                            → stall fallback → style commit
//! ```

use std::collections::HashMap;

use folio_disclosure::Section;
use folio_dom::{Document, Host, Key, NodeId, Query, TransitionEnd};
use folio_tabs::TabGroup;

use crate::config::Config;
use crate::error::CoreError;
use crate::render::RenderEngine;
use crate::runtime::Runtime;
use crate::Result;

/// Result of delivering one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// A registered header or tab received the event
    pub handled: bool,
    /// The browser's default action for the event was suppressed
    pub default_prevented: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Owner {
    Section(usize),
    Group(usize),
}

pub struct Page {
    config: Config,
    runtime: Runtime,
    sections: Vec<Section>,
    groups: Vec<TabGroup>,
    /// When each entity began waiting for a completion
    waiting_since: HashMap<Owner, u64>,
}

impl Page {
    /// Parse `html` and run the document-ready pass
    pub fn load(html: &str, config: Config) -> Result<Self> {
        Self::from_document(Document::parse_html(html), config)
    }

    pub fn from_document(doc: Document, config: Config) -> Result<Self> {
        config.validate()?;

        let runtime = Runtime::new(doc, config.line_height, config.transitions.clone());
        let mut page = Self {
            config,
            runtime,
            sections: Vec::new(),
            groups: Vec::new(),
            waiting_since: HashMap::new(),
        };
        page.ready()?;
        Ok(page)
    }

    fn ready(&mut self) -> Result<()> {
        let nodes = self.runtime.doc.query_all(&self.config.disclosure.section);
        for node in nodes {
            if let Some(section) = Section::attach(&mut self.runtime, node, &self.config.disclosure)? {
                self.sections.push(section);
            }
        }

        for spec in &self.config.tab_groups {
            if let Some(mut group) = TabGroup::discover(&self.runtime, spec) {
                group.initialize(&mut self.runtime)?;
                self.groups.push(group);
            }
        }

        // First paint: establishes starting styles without animating
        self.runtime.commit();

        tracing::info!(
            sections = self.sections.len(),
            groups = self.groups.len(),
            "Page ready"
        );
        Ok(())
    }

    // === Input ===

    /// Pointer click on `target`; bubbles to the nearest section header or tab
    pub fn click(&mut self, target: NodeId) -> Result<Dispatch> {
        self.ensure_node(target)?;

        let mut dispatch = Dispatch::default();
        for node in self.path(target) {
            if let Some(section) = self.sections.iter_mut().find(|s| s.header() == node) {
                // The native toggle is always suppressed, even while animating
                let outcome = section.toggle(&mut self.runtime)?;
                tracing::debug!(section = %section.node(), ?outcome, "Header clicked");
                dispatch = Dispatch {
                    handled: true,
                    default_prevented: true,
                };
                break;
            }
            if let Some(group) = self.groups.iter_mut().find(|g| g.contains(node)) {
                group.click(&mut self.runtime, node)?;
                dispatch.handled = true;
                break;
            }
        }

        self.track_waiting();
        Ok(dispatch)
    }

    /// Key press with `target` as the event target
    pub fn key_down(&mut self, target: NodeId, key: Key) -> Result<Dispatch> {
        self.ensure_node(target)?;

        let mut dispatch = Dispatch::default();
        for node in self.path(target) {
            if let Some(group) = self.groups.iter_mut().find(|g| g.contains(node)) {
                let outcome = group.key_down(&mut self.runtime, node, &key)?;
                dispatch = Dispatch {
                    handled: true,
                    default_prevented: outcome.prevent_default,
                };
                break;
            }
        }

        self.track_waiting();
        Ok(dispatch)
    }

    /// Key press on whatever element has focus
    pub fn press_key(&mut self, key: Key) -> Result<Dispatch> {
        match self.runtime.doc.active_element() {
            Some(focused) => self.key_down(focused, key),
            None => Ok(Dispatch::default()),
        }
    }

    /// Move focus the way sequential navigation would land on `node`
    pub fn focus(&mut self, node: NodeId) -> Result<()> {
        self.ensure_node(node)?;
        self.runtime.focus(node)?;
        Ok(())
    }

    // === Time ===

    /// Let `ms` milliseconds pass, running every frame that falls inside.
    ///
    /// After the first frame, stretches with no frame callbacks queued jump
    /// straight to the frame of the next transition end or stall deadline.
    pub fn advance(&mut self, ms: u64) -> Result<()> {
        let target = self.runtime.now_ms.saturating_add(ms);
        let mut observed = false;
        loop {
            let next = if observed && self.runtime.frames.is_empty() {
                match self.next_deadline() {
                    Some(due) => self.frame_at_or_after(due),
                    None => break,
                }
            } else {
                self.next_frame_at()
            };
            if next > target || next <= self.runtime.now_ms {
                break;
            }
            self.runtime.now_ms = next;
            self.run_frame()?;
            observed = true;
        }
        self.runtime.now_ms = target;
        Ok(())
    }

    /// Run frames until nothing is left to happen. Returns the elapsed time.
    ///
    /// Always runs at least one frame so pending style changes get observed.
    pub fn settle(&mut self) -> Result<u64> {
        let start = self.runtime.now_ms;
        let mut frames = 0;
        loop {
            frames += 1;
            if frames > self.config.settle_frame_limit {
                return Err(CoreError::SettleLimit(self.config.settle_frame_limit));
            }
            self.runtime.now_ms = self.next_frame_at();
            self.run_frame()?;
            if !self.has_pending_work() {
                break;
            }
        }
        Ok(self.runtime.now_ms - start)
    }

    fn next_frame_at(&self) -> u64 {
        let interval = self.config.frame_interval_ms;
        (self.runtime.now_ms / interval)
            .saturating_add(1)
            .saturating_mul(interval)
    }

    fn frame_at_or_after(&self, ms: u64) -> u64 {
        let interval = self.config.frame_interval_ms;
        ms.div_ceil(interval)
            .saturating_mul(interval)
            .max(self.next_frame_at())
    }

    /// Earliest time a frame without callbacks could change anything
    fn next_deadline(&self) -> Option<u64> {
        let end = self.runtime.engine.running().iter().map(|running| running.end_ms).min();
        let stall = self.config.stall_timeout_ms.and_then(|timeout| {
            self.waiting_since
                .values()
                .map(|since| since.saturating_add(timeout))
                .min()
        });
        end.into_iter().chain(stall).min()
    }

    fn has_pending_work(&self) -> bool {
        !self.runtime.frames.is_empty()
            || self.runtime.engine.has_running()
            || (self.config.stall_timeout_ms.is_some() && !self.waiting_since.is_empty())
    }

    fn run_frame(&mut self) -> Result<()> {
        let now = self.runtime.now_ms;

        for end in self.runtime.engine.advance(now) {
            self.deliver(&end)?;
        }

        let owners = std::mem::take(&mut self.runtime.frames);
        for owner in owners {
            if let Some(section) = self.sections.iter_mut().find(|s| s.node() == owner) {
                section.on_animation_frame(&mut self.runtime)?;
            }
        }

        self.force_stalled()?;
        self.runtime.commit();
        self.track_waiting();
        Ok(())
    }

    fn deliver(&mut self, end: &TransitionEnd) -> Result<bool> {
        for section in &mut self.sections {
            if section.on_transition_end(&mut self.runtime, end)? {
                return Ok(true);
            }
        }
        for group in &mut self.groups {
            if group.on_transition_end(&mut self.runtime, end)? {
                return Ok(true);
            }
        }
        tracing::trace!(node = %end.target, property = %end.property, "Unobserved transition end");
        Ok(false)
    }

    // === Stall fallback ===

    fn track_waiting(&mut self) {
        let now = self.runtime.now_ms;
        let waiting = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.awaits_completion())
            .map(|(index, _)| Owner::Section(index))
            .chain(
                self.groups
                    .iter()
                    .enumerate()
                    .filter(|(_, group)| !group.is_settled())
                    .map(|(index, _)| Owner::Group(index)),
            )
            .collect::<Vec<_>>();

        self.waiting_since.retain(|owner, _| waiting.contains(owner));
        for owner in waiting {
            self.waiting_since.entry(owner).or_insert(now);
        }
    }

    fn force_stalled(&mut self) -> Result<()> {
        let Some(timeout) = self.config.stall_timeout_ms else {
            return Ok(());
        };
        let now = self.runtime.now_ms;

        let mut stalled: Vec<Owner> = self
            .waiting_since
            .iter()
            .filter(|(_, since)| now.saturating_sub(**since) >= timeout)
            .map(|(owner, _)| *owner)
            .collect();
        stalled.sort_by_key(|owner| match owner {
            Owner::Section(index) => (0, *index),
            Owner::Group(index) => (1, *index),
        });

        for owner in stalled {
            match owner {
                Owner::Section(index) => {
                    self.sections[index].force_complete(&mut self.runtime)?;
                }
                Owner::Group(index) => {
                    self.groups[index].force_complete(&mut self.runtime)?;
                }
            }
            self.waiting_since.remove(&owner);
        }
        Ok(())
    }

    // === Inspection ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.runtime.doc
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.runtime.engine
    }

    pub fn now_ms(&self) -> u64 {
        self.runtime.now_ms
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section whose element or header is `node`
    pub fn section(&self, node: NodeId) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.node() == node || section.header() == node)
    }

    pub fn groups(&self) -> &[TabGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&TabGroup> {
        self.groups.iter().find(|group| group.name() == name)
    }

    /// First element matching `selector`, in document order
    pub fn find(&self, selector: &str) -> Result<Option<NodeId>> {
        let query = Query::parse(selector)?;
        Ok(self.runtime.doc.query_first(&query))
    }

    pub fn find_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let query = Query::parse(selector)?;
        Ok(self.runtime.doc.query_all(&query))
    }

    /// Whether nothing is animating, waiting for a frame or waiting for a
    /// completion
    pub fn is_idle(&self) -> bool {
        self.runtime.frames.is_empty()
            && !self.runtime.engine.has_running()
            && self.sections.iter().all(|section| !section.is_animating())
            && self.groups.iter().all(|group| group.is_settled())
    }

    fn ensure_node(&self, node: NodeId) -> Result<()> {
        if self.runtime.doc.contains(node) {
            Ok(())
        } else {
            Err(CoreError::UnknownNode(node))
        }
    }

    /// `target` followed by its ancestors, the order an event bubbles in
    fn path(&self, target: NodeId) -> Vec<NodeId> {
        std::iter::once(target)
            .chain(self.runtime.doc.ancestors(target))
            .collect()
    }
}
