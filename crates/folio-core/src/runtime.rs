//! Rendering environment seen by the controllers

use folio_dom::{BlockLayout, Document, Host, Layout, NodeId};

use crate::render::{RenderEngine, TransitionRule};

pub(crate) struct Runtime {
    pub(crate) doc: Document,
    pub(crate) layout: BlockLayout,
    pub(crate) engine: RenderEngine,
    /// Owners waiting for the next frame, in request order
    pub(crate) frames: Vec<NodeId>,
    pub(crate) now_ms: u64,
}

impl Runtime {
    pub(crate) fn new(doc: Document, line_height: u32, rules: Vec<TransitionRule>) -> Self {
        Self {
            doc,
            layout: BlockLayout::new(line_height),
            engine: RenderEngine::new(rules),
            frames: Vec::new(),
            now_ms: 0,
        }
    }

    pub(crate) fn commit(&mut self) {
        self.engine.commit(&self.doc, &self.layout, self.now_ms);
    }
}

impl Host for Runtime {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    fn measure_height(&mut self, node: NodeId) -> u32 {
        self.commit();
        self.layout.natural_height(&self.doc, node)
    }

    fn flush_layout(&mut self, _node: NodeId) {
        self.commit();
    }

    fn request_animation_frame(&mut self, owner: NodeId) {
        if !self.frames.contains(&owner) {
            self.frames.push(owner);
        }
    }
}
