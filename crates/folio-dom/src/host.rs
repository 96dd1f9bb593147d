//! Environment seam for controllers
//!
//! A controller mutates the document directly, but anything that depends on
//! the rendering engine (measuring, forcing a style flush, scheduling work for
//! the next frame) is requested through [`Host`].

use std::collections::HashMap;

use crate::document::{Document, NodeId};
use crate::layout::{BlockLayout, Layout};
use crate::Result;

pub trait Host {
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// Flush pending style changes, then report the natural height of `node`
    fn measure_height(&mut self, node: NodeId) -> u32;

    /// Force a synchronous layout so the current styles become the starting
    /// point of any transition started afterwards
    fn flush_layout(&mut self, node: NodeId);

    /// Ask for a one-shot callback on the next frame, keyed by the node that
    /// owns the requesting entity
    fn request_animation_frame(&mut self, owner: NodeId);

    fn focus(&mut self, node: NodeId) -> Result<()> {
        self.document_mut().focus(node)
    }
}

/// Minimal host without a rendering engine.
///
/// Measurements come from a [`Layout`] (with optional per-node overrides),
/// frame requests and flushes are only recorded. Useful for driving a
/// controller step by step.
pub struct RecordingHost {
    doc: Document,
    layout: Box<dyn Layout>,
    heights: HashMap<NodeId, u32>,
    frames: Vec<NodeId>,
    flushes: Vec<NodeId>,
}

impl RecordingHost {
    pub fn new(doc: Document) -> Self {
        Self::with_layout(doc, Box::new(BlockLayout::default()))
    }

    pub fn with_layout(doc: Document, layout: Box<dyn Layout>) -> Self {
        Self {
            doc,
            layout,
            heights: HashMap::new(),
            frames: Vec::new(),
            flushes: Vec::new(),
        }
    }

    /// Pin the natural height reported for `node`
    pub fn set_natural_height(&mut self, node: NodeId, px: u32) {
        self.heights.insert(node, px);
    }

    /// Frame requests made since the last call
    pub fn take_frame_requests(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.frames)
    }

    pub fn pending_frames(&self) -> &[NodeId] {
        &self.frames
    }

    pub fn flushes(&self) -> &[NodeId] {
        &self.flushes
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl Host for RecordingHost {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    fn measure_height(&mut self, node: NodeId) -> u32 {
        self.flushes.push(node);
        match self.heights.get(&node) {
            Some(px) => *px,
            None => self.layout.natural_height(&self.doc, node),
        }
    }

    fn flush_layout(&mut self, node: NodeId) {
        self.flushes.push(node);
    }

    fn request_animation_frame(&mut self, owner: NodeId) {
        self.frames.push(owner);
    }
}
