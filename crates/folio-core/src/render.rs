//! Headless rendering engine
//!
//! Tracks the last style value the engine observed for every animated
//! (element, property) pair. When a commit sees a different value on an
//! element that is rendered, a transition starts from whatever is currently
//! on screen; when it finishes, a [`TransitionEnd`] is produced. An element
//! that stops being rendered drops its transition without notification.

use std::collections::HashMap;

use folio_dom::{is_rendered, Document, Layout, Length, NodeId, Property, Query, TransitionEnd};
use serde::{Deserialize, Serialize};

/// Which computed value a rule animates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "lowercase")]
pub enum Animated {
    /// Used height; `auto` resolves to the natural height
    Height,
    /// 1 while the element carries `shown_class`, 0 otherwise
    Opacity { shown_class: String },
}

impl Animated {
    pub fn property(&self) -> Property {
        match self {
            Animated::Height => Property::Height,
            Animated::Opacity { .. } => Property::Opacity,
        }
    }

    fn value(&self, doc: &Document, layout: &dyn Layout, node: NodeId) -> f64 {
        match self {
            Animated::Height => match doc.height(node) {
                Some(Length::Px(px)) => f64::from(px),
                Some(Length::Auto) | None => f64::from(layout.natural_height(doc, node)),
            },
            Animated::Opacity { shown_class } => {
                if doc.has_class(node, shown_class) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// A `transition` declaration: elements matching `target` animate one
/// property over `duration_ms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub target: Query,
    #[serde(flatten)]
    pub animated: Animated,
    pub duration_ms: u64,
}

impl TransitionRule {
    pub fn height(target: Query, duration_ms: u64) -> Self {
        Self {
            target,
            animated: Animated::Height,
            duration_ms,
        }
    }

    pub fn opacity(target: Query, shown_class: &str, duration_ms: u64) -> Self {
        Self {
            target,
            animated: Animated::Opacity {
                shown_class: shown_class.to_string(),
            },
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunningTransition {
    pub node: NodeId,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl RunningTransition {
    /// Linearly interpolated value at `now_ms`
    pub fn value_at(&self, now_ms: u64) -> f64 {
        if now_ms >= self.end_ms || self.end_ms <= self.start_ms {
            return self.to;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f64;
        let progress = elapsed / (self.end_ms - self.start_ms) as f64;
        self.from + (self.to - self.from) * progress
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderEngine {
    rules: Vec<TransitionRule>,
    committed: HashMap<(NodeId, Property), f64>,
    running: Vec<RunningTransition>,
}

impl RenderEngine {
    pub fn new(rules: Vec<TransitionRule>) -> Self {
        Self {
            rules,
            committed: HashMap::new(),
            running: Vec::new(),
        }
    }

    /// Observe the current styles of every animated element
    pub fn commit(&mut self, doc: &Document, layout: &dyn Layout, now_ms: u64) {
        for rule in &self.rules {
            let property = rule.animated.property();

            for node in doc.query_all(&rule.target) {
                let key = (node, property.clone());

                if !is_rendered(doc, node) {
                    self.committed.remove(&key);
                    if let Some(index) = position(&self.running, node, &property) {
                        self.running.remove(index);
                        tracing::debug!(node = %node, property = %property, "Transition cancelled");
                    }
                    continue;
                }

                let value = rule.animated.value(doc, layout, node);
                // First sighting establishes the starting style, nothing animates
                let Some(previous) = self.committed.insert(key, value) else {
                    continue;
                };

                let running = position(&self.running, node, &property);
                let heading_to = running.map_or(previous, |index| self.running[index].to);
                if heading_to == value {
                    continue;
                }

                let from = match running {
                    Some(index) => self.running.remove(index).value_at(now_ms),
                    None => previous,
                };
                if rule.duration_ms == 0 || from == value {
                    continue;
                }

                tracing::debug!(
                    node = %node,
                    property = %property,
                    from,
                    to = value,
                    duration_ms = rule.duration_ms,
                    "Transition started"
                );
                self.running.push(RunningTransition {
                    node,
                    property: property.clone(),
                    from,
                    to: value,
                    start_ms: now_ms,
                    end_ms: now_ms.saturating_add(rule.duration_ms),
                });
            }
        }

        // Detached elements never render again
        self.running.retain(|running| is_rendered(doc, running.node));
        self.committed.retain(|(node, _), _| is_rendered(doc, *node));
    }

    /// Remove and report every transition finished by `now_ms`, earliest first
    pub fn advance(&mut self, now_ms: u64) -> Vec<TransitionEnd> {
        let mut finished: Vec<RunningTransition> = Vec::new();
        self.running.retain(|running| {
            if running.end_ms <= now_ms {
                finished.push(running.clone());
                false
            } else {
                true
            }
        });
        finished.sort_by_key(|running| running.end_ms);

        finished
            .into_iter()
            .map(|running| TransitionEnd {
                target: running.node,
                property: running.property,
            })
            .collect()
    }

    pub fn running(&self) -> &[RunningTransition] {
        &self.running
    }

    pub fn is_running(&self, node: NodeId, property: &Property) -> bool {
        position(&self.running, node, property).is_some()
    }

    pub fn has_running(&self) -> bool {
        !self.running.is_empty()
    }

    /// Value currently on screen, if the element has been observed
    pub fn displayed(&self, node: NodeId, property: &Property, now_ms: u64) -> Option<f64> {
        match position(&self.running, node, property) {
            Some(index) => Some(self.running[index].value_at(now_ms)),
            None => self.committed.get(&(node, property.clone())).copied(),
        }
    }
}

fn position(running: &[RunningTransition], node: NodeId, property: &Property) -> Option<usize> {
    running
        .iter()
        .position(|r| r.node == node && &r.property == property)
}
