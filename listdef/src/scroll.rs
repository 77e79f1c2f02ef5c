use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::key::KeySet;
use crate::tree::{DefinitionTree, RowKey};
use crate::{IndexPath, ViewId};

/// A scroll position change reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollEvent {
    /// Offset along the scroll axis. Negative while over-scrolled at the top.
    pub offset: f32,
    /// Total length of the scrollable content.
    pub content_extent: f32,
    /// Visible length of the surface.
    pub viewport_extent: f32,
}

impl ScrollEvent {
    pub fn new(offset: f32, content_extent: f32, viewport_extent: f32) -> Self {
        Self {
            offset,
            content_extent,
            viewport_extent,
        }
    }
}

/// Identifies the subscribed row a scroll callback runs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollContext {
    pub row: RowKey,
    pub index_path: IndexPath,
    pub bound_view: Option<ViewId>,
}

pub type ScrollHandler = Box<dyn FnMut(&ScrollEvent, &ScrollContext)>;

/// Rows that asked for scroll events, collected lazily as the data source resolves them.
///
/// Subscribing is idempotent. Iteration order is unspecified.
#[derive(Debug, Default)]
pub struct ScrollRegistry {
    rows: RefCell<KeySet<RowKey>>,
}

impl ScrollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `row` was not subscribed before.
    pub fn subscribe(&self, row: RowKey) -> bool {
        self.rows.borrow_mut().insert(row)
    }

    pub fn unsubscribe(&self, row: RowKey) -> bool {
        self.rows.borrow_mut().remove(&row)
    }

    pub fn contains(&self, row: RowKey) -> bool {
        self.rows.borrow().contains(&row)
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.rows.borrow_mut().clear();
    }

    /// Runs every subscribed row's handler with `event`. Returns how many ran.
    ///
    /// Subscribers that are gone from `tree` (or lost their handler) are dropped.
    pub fn dispatch<V>(&self, tree: &mut DefinitionTree<V>, event: &ScrollEvent) -> usize {
        let keys: Vec<RowKey> = self.rows.borrow().iter().copied().collect();
        let mut ran = 0usize;
        for key in keys {
            let Some(index_path) = tree.index_path(key) else {
                ltrace!("scroll subscriber no longer in tree");
                self.unsubscribe(key);
                continue;
            };
            let Some(row) = tree.row_mut(key) else {
                self.unsubscribe(key);
                continue;
            };
            let cx = ScrollContext {
                row: key,
                index_path,
                bound_view: row.bound_view,
            };
            let Some(handler) = row.on_scroll.as_mut() else {
                self.unsubscribe(key);
                continue;
            };
            handler(event, &cx);
            ran = ran.saturating_add(1);
        }
        ran
    }
}
