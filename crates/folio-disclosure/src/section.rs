//! Animated collapsible section

use folio_dom::{Host, Length, NodeId, Property, TransitionEnd};

use crate::error::DisclosureError;
use crate::markup::DisclosureMarkup;
use crate::motion::{Motion, Stage};
use crate::Result;

/// Outcome of a header activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// A transition is already in flight; nothing changed
    Ignored,
    Opening,
    Closing,
}

#[derive(Debug, Clone)]
pub struct Section {
    /// The collapsible element itself
    node: NodeId,
    /// Clickable trigger
    header: NodeId,
    /// Generated container holding the original body
    wrapper: NodeId,
    open: bool,
    motion: Motion,
    open_attribute: String,
    animating_attribute: String,
}

impl Section {
    /// Wrap the body of `node` and take over its toggle behavior.
    ///
    /// Returns `None` when the section has no header; such markup is left
    /// untouched.
    pub fn attach(
        host: &mut dyn Host,
        node: NodeId,
        markup: &DisclosureMarkup,
    ) -> Result<Option<Self>> {
        let doc = host.document_mut();
        let Some(header) = doc.query_first_within(node, &markup.header) else {
            tracing::debug!(section = %node, "Skipping section without header");
            return Ok(None);
        };

        let wrapper = doc.create_element(&markup.wrapper_tag);
        doc.add_class(wrapper, &markup.wrapper_class)?;

        let body: Vec<NodeId> = doc
            .children(node)
            .iter()
            .copied()
            .filter(|child| *child != header && !doc.is_ancestor_of(*child, header))
            .collect();
        for child in body {
            doc.append_child(wrapper, child)?;
        }
        doc.append_child(node, wrapper)?;

        // Closed sections start at the same size mode a completed close leaves behind
        let open = doc.has_attribute(node, &markup.open_attribute);
        let initial = if open { Length::Auto } else { Length::Px(0) };
        doc.set_height(wrapper, initial)?;

        tracing::debug!(section = %node, open, "Attached collapsible section");

        Ok(Some(Self {
            node,
            header,
            wrapper,
            open,
            motion: Motion::Idle,
            open_attribute: markup.open_attribute.clone(),
            animating_attribute: markup.animating_attribute.clone(),
        }))
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn header(&self) -> NodeId {
        self.header
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_animating()
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Whether a completion notification is currently being waited for.
    /// At most one per section.
    pub fn awaits_completion(&self) -> bool {
        self.motion.is_animating()
    }

    /// Header activation. The caller suppresses the default action
    /// regardless of the outcome.
    pub fn toggle(&mut self, host: &mut dyn Host) -> Result<Toggle> {
        if self.is_animating() {
            tracing::debug!(section = %self.node, motion = %self.motion, "Toggle ignored while animating");
            return Ok(Toggle::Ignored);
        }

        let outcome = if self.open {
            // Pin the current size so the collapse has a numeric start value
            let natural = host.measure_height(self.wrapper);
            host.document_mut()
                .set_height(self.wrapper, Length::Px(natural))?;
            self.transition_to(Motion::Closing(Stage::AwaitingFrame))?;
            Toggle::Closing
        } else {
            // Open before measuring so the body is rendered
            self.set_open(host, true)?;
            host.document_mut().set_height(self.wrapper, Length::Px(0))?;
            self.transition_to(Motion::Opening(Stage::AwaitingFrame))?;
            Toggle::Opening
        };

        self.mirror_animating(host)?;
        host.request_animation_frame(self.node);
        Ok(outcome)
    }

    /// Next-frame callback requested by [`toggle`](Self::toggle)
    pub fn on_animation_frame(&mut self, host: &mut dyn Host) -> Result<()> {
        match self.motion {
            Motion::Opening(Stage::AwaitingFrame) => {
                let target = host.measure_height(self.wrapper);
                host.document_mut()
                    .set_height(self.wrapper, Length::Px(target))?;
                self.transition_to(Motion::Opening(Stage::AwaitingTransition))
            }
            Motion::Closing(Stage::AwaitingFrame) => {
                host.document_mut().set_height(self.wrapper, Length::Px(0))?;
                self.transition_to(Motion::Closing(Stage::AwaitingTransition))
            }
            _ => Ok(()),
        }
    }

    /// Completion notification. Returns whether it was consumed.
    ///
    /// Only `height` transitions on the wrapper count; anything else that
    /// happens to finish at the same time is ignored.
    pub fn on_transition_end(&mut self, host: &mut dyn Host, end: &TransitionEnd) -> Result<bool> {
        if end.target != self.wrapper || end.property != Property::Height {
            return Ok(false);
        }
        if self.motion.stage() != Some(Stage::AwaitingTransition) {
            return Ok(false);
        }

        self.finish(host)?;
        Ok(true)
    }

    /// Finalize an in-flight toggle as if its completion had arrived.
    /// Returns `false` when nothing was in flight.
    pub fn force_complete(&mut self, host: &mut dyn Host) -> Result<bool> {
        if !self.is_animating() {
            return Ok(false);
        }
        tracing::warn!(section = %self.node, motion = %self.motion, "Forcing stalled section to settle");
        self.finish(host)?;
        Ok(true)
    }

    fn finish(&mut self, host: &mut dyn Host) -> Result<()> {
        match self.motion {
            Motion::Opening(_) => {
                // Intrinsic sizing so later content changes are not clipped
                host.document_mut().set_height(self.wrapper, Length::Auto)?;
            }
            Motion::Closing(_) => {
                host.document_mut().set_height(self.wrapper, Length::Px(0))?;
                self.set_open(host, false)?;
            }
            Motion::Idle => return Ok(()),
        }

        self.transition_to(Motion::Idle)?;
        self.mirror_animating(host)
    }

    fn transition_to(&mut self, next: Motion) -> Result<()> {
        if !self.motion.can_transition_to(next) {
            return Err(DisclosureError::InvalidTransition {
                from: self.motion.to_string(),
                to: next.to_string(),
            });
        }

        tracing::debug!(
            section = %self.node,
            from = %self.motion,
            to = %next,
            "Section motion"
        );

        self.motion = next;
        Ok(())
    }

    fn set_open(&mut self, host: &mut dyn Host, open: bool) -> Result<()> {
        let doc = host.document_mut();
        if open {
            doc.set_attribute(self.node, &self.open_attribute, "")?;
        } else {
            doc.remove_attribute(self.node, &self.open_attribute)?;
        }
        self.open = open;
        Ok(())
    }

    fn mirror_animating(&self, host: &mut dyn Host) -> Result<()> {
        let value = if self.is_animating() { "true" } else { "false" };
        host.document_mut()
            .set_attribute(self.node, &self.animating_attribute, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dom::{Document, Query, RecordingHost};

    const CLOSED: &str = r#"
        <details id="faq">
          <summary>Question</summary>
          <p>Answer one</p>
          <p>Answer two</p>
        </details>
    "#;

    fn attach(html: &str) -> (RecordingHost, Section) {
        let doc = Document::parse_html(html);
        let mut host = RecordingHost::new(doc);
        let node = host
            .document()
            .query_first(&Query::tag("details"))
            .unwrap();
        let section = Section::attach(&mut host, node, &DisclosureMarkup::default())
            .unwrap()
            .unwrap();
        (host, section)
    }

    fn height(host: &RecordingHost, section: &Section) -> Option<Length> {
        host.document().height(section.wrapper())
    }

    fn height_end(section: &Section) -> TransitionEnd {
        TransitionEnd {
            target: section.wrapper(),
            property: Property::Height,
        }
    }

    #[test]
    fn test_attach_moves_body_into_wrapper() {
        let (host, section) = attach(CLOSED);
        let doc = host.document();

        let element_children = doc.element_children(section.node());
        assert_eq!(element_children, vec![section.header(), section.wrapper()]);
        assert!(doc.has_class(section.wrapper(), "details-content"));
        assert_eq!(doc.query_all_within(section.wrapper(), &Query::tag("p")).len(), 2);
        assert!(!section.is_open());
        assert_eq!(height(&host, &section), Some(Length::Px(0)));
    }

    #[test]
    fn test_attach_open_section_is_auto() {
        let (host, section) = attach("<details open><summary>Q</summary><p>A</p></details>");
        assert!(section.is_open());
        assert_eq!(height(&host, &section), Some(Length::Auto));
    }

    #[test]
    fn test_attach_skips_section_without_header() {
        let doc = Document::parse_html("<details><p>orphan</p></details>");
        let mut host = RecordingHost::new(doc);
        let node = host.document().query_first(&Query::tag("details")).unwrap();
        let before = host.document().outer_html(node);

        let section = Section::attach(&mut host, node, &DisclosureMarkup::default()).unwrap();
        assert!(section.is_none());
        assert_eq!(host.document().outer_html(node), before);
    }

    #[test]
    fn test_opening_sequence() {
        let (mut host, mut section) = attach(CLOSED);
        host.set_natural_height(section.wrapper(), 120);

        assert_eq!(section.toggle(&mut host).unwrap(), Toggle::Opening);
        // Marker set before any size change is observed
        assert!(host.document().has_attribute(section.node(), "open"));
        assert_eq!(height(&host, &section), Some(Length::Px(0)));
        assert_eq!(
            host.document().attribute(section.node(), "data-animating"),
            Some("true")
        );
        assert_eq!(host.take_frame_requests(), vec![section.node()]);

        section.on_animation_frame(&mut host).unwrap();
        assert_eq!(height(&host, &section), Some(Length::Px(120)));

        assert!(section.on_transition_end(&mut host, &height_end(&section)).unwrap());
        assert_eq!(height(&host, &section), Some(Length::Auto));
        assert!(section.is_open());
        assert!(!section.is_animating());
        assert_eq!(
            host.document().attribute(section.node(), "data-animating"),
            Some("false")
        );
    }

    #[test]
    fn test_closing_sequence() {
        let (mut host, mut section) = attach("<details open><summary>Q</summary><p>A</p></details>");
        host.set_natural_height(section.wrapper(), 80);

        assert_eq!(section.toggle(&mut host).unwrap(), Toggle::Closing);
        assert_eq!(height(&host, &section), Some(Length::Px(80)));
        assert!(host.document().has_attribute(section.node(), "open"));

        section.on_animation_frame(&mut host).unwrap();
        assert_eq!(height(&host, &section), Some(Length::Px(0)));
        assert!(section.is_open());

        assert!(section.on_transition_end(&mut host, &height_end(&section)).unwrap());
        assert!(!host.document().has_attribute(section.node(), "open"));
        assert!(!section.is_open());
        assert_eq!(height(&host, &section), Some(Length::Px(0)));
    }

    #[test]
    fn test_toggle_ignored_while_animating() {
        let (mut host, mut section) = attach(CLOSED);
        section.toggle(&mut host).unwrap();
        host.take_frame_requests();
        let snapshot = host.document().outer_html(section.node());

        assert_eq!(section.toggle(&mut host).unwrap(), Toggle::Ignored);
        assert_eq!(section.toggle(&mut host).unwrap(), Toggle::Ignored);
        assert_eq!(host.document().outer_html(section.node()), snapshot);
        assert!(host.take_frame_requests().is_empty());
        assert!(section.awaits_completion());
    }

    #[test]
    fn test_unrelated_transitions_are_filtered() {
        let (mut host, mut section) = attach(CLOSED);
        section.toggle(&mut host).unwrap();
        section.on_animation_frame(&mut host).unwrap();

        let padding = TransitionEnd {
            target: section.wrapper(),
            property: Property::Other("padding-top".to_string()),
        };
        assert!(!section.on_transition_end(&mut host, &padding).unwrap());

        let elsewhere = TransitionEnd {
            target: section.header(),
            property: Property::Height,
        };
        assert!(!section.on_transition_end(&mut host, &elsewhere).unwrap());
        assert!(section.is_animating());

        assert!(section.on_transition_end(&mut host, &height_end(&section)).unwrap());
        // Listener is consumed
        assert!(!section.on_transition_end(&mut host, &height_end(&section)).unwrap());
    }

    #[test]
    fn test_double_toggle_round_trip() {
        let (mut host, mut section) = attach(CLOSED);
        host.set_natural_height(section.wrapper(), 40);
        let end = height_end(&section);
        let initial = host.document().outer_html(section.node());

        for _ in 0..2 {
            section.toggle(&mut host).unwrap();
            section.on_animation_frame(&mut host).unwrap();
            section.on_transition_end(&mut host, &end).unwrap();
        }

        assert!(!host.document().has_attribute(section.node(), "open"));
        assert_eq!(height(&host, &section), Some(Length::Px(0)));
        assert_eq!(section.motion(), Motion::Idle);
        // Only the animating mirror differs from the freshly attached markup
        host.document_mut()
            .remove_attribute(section.node(), "data-animating")
            .unwrap();
        assert_eq!(host.document().outer_html(section.node()), initial);
    }

    #[test]
    fn test_force_complete() {
        let (mut host, mut section) = attach(CLOSED);
        assert!(!section.force_complete(&mut host).unwrap());

        section.toggle(&mut host).unwrap();
        assert!(section.force_complete(&mut host).unwrap());
        assert!(section.is_open());
        assert_eq!(height(&host, &section), Some(Length::Auto));

        // A late frame callback after settling is a no-op
        section.on_animation_frame(&mut host).unwrap();
        assert_eq!(height(&host, &section), Some(Length::Auto));
    }
}
