//! Shared page handle
//!
//! The page is single-threaded by nature; the handle lets an embedding
//! application hand it to several owners (an event pump, an inspector)
//! without giving up exclusive mutation.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::page::Page;
use crate::Result;

pub struct PageHandle {
    page: Arc<RwLock<Page>>,
}

impl PageHandle {
    pub fn new(page: Page) -> Self {
        Self {
            page: Arc::new(RwLock::new(page)),
        }
    }

    pub fn with_page<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Page) -> Result<T>,
    {
        let guard = self.page.read();
        f(&guard)
    }

    pub fn with_page_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Page) -> Result<T>,
    {
        let mut guard = self.page.write();
        f(&mut guard)
    }
}

impl Clone for PageHandle {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    const HTML: &str = r#"
        <details><summary>Q</summary><p>A</p></details>
    "#;

    #[test]
    fn test_clones_share_one_page() {
        let handle = PageHandle::new(Page::load(HTML, Config::default()).unwrap());
        let other = handle.clone();

        let summary = handle
            .with_page(|page| Ok(page.find("summary")?.unwrap()))
            .unwrap();
        other.with_page_mut(|page| page.click(summary)).unwrap();
        other.with_page_mut(|page| page.settle()).unwrap();

        let open = handle
            .with_page(|page| Ok(page.sections()[0].is_open()))
            .unwrap();
        assert!(open);
    }

    #[test]
    fn test_handle_is_send() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PageHandle>();
    }
}
