//! Decoded envelope types

use crate::types::OptionStringExt;

/// One server round trip worth of items plus the continuation cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Opaque token for the next page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Create a page, normalizing a blank cursor to `None`
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.none_if_blank(),
        }
    }

    /// A terminal page without items
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
