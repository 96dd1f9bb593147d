//! Keyboard navigation within a tab strip

use folio_dom::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    /// Move focus and selection to the tab at this index
    Move(usize),
    /// Activate the focused tab in place
    Confirm,
}

/// Resolve a key pressed on the tab at `index` in a strip of `len` tabs.
/// Keys without a meaning in the strip resolve to `None`.
pub fn resolve(key: &Key, index: usize, len: usize) -> Option<NavTarget> {
    if len == 0 || index >= len {
        return None;
    }

    match key {
        Key::ArrowRight | Key::ArrowDown => Some(NavTarget::Move((index + 1) % len)),
        Key::ArrowLeft | Key::ArrowUp => Some(NavTarget::Move((index + len - 1) % len)),
        Key::Home => Some(NavTarget::Move(0)),
        Key::End => Some(NavTarget::Move(len - 1)),
        Key::Enter | Key::Space => Some(NavTarget::Confirm),
        Key::Other(_) => None,
    }
}
