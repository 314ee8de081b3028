//! Recency ordering for cached pages.

use crate::types::PageId;
use std::collections::HashMap;

/// Doubly-linked recency list over page IDs.
///
/// The head is the most recently used page, the tail the least recently
/// used one. Nodes live in a vector and are linked by index, with freed
/// nodes recycled.
pub struct LruList {
    /// Maps page ID to its node index
    positions: HashMap<PageId, usize>,
    /// Node storage
    nodes: Vec<LruNode>,
    /// Most recently used node
    head: Option<usize>,
    /// Least recently used node
    tail: Option<usize>,
    /// Node indices available for reuse
    free_slots: Vec<usize>,
}

#[derive(Clone, Copy)]
struct LruNode {
    page_id: PageId,
    prev: Option<usize>,
    next: Option<usize>,
}

impl LruList {
    /// Create an empty list sized for `capacity` pages
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_slots: Vec::new(),
        }
    }

    /// Mark a page as most recently used, adding it if absent
    pub fn touch(&mut self, page_id: PageId) {
        match self.positions.get(&page_id) {
            Some(&pos) => self.move_to_front(pos),
            None => self.push_front(page_id),
        }
    }

    /// Remove a page from the ordering
    pub fn remove(&mut self, page_id: PageId) {
        if let Some(pos) = self.positions.remove(&page_id) {
            self.unlink(pos);
            self.free_slots.push(pos);
        }
    }

    /// The least recently used page
    pub fn lru(&self) -> Option<PageId> {
        self.tail.map(|pos| self.nodes[pos].page_id)
    }

    /// Number of pages in the ordering
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Page IDs from most to least recently used
    pub fn iter(&self) -> impl Iterator<Item = PageId> + '_ {
        std::iter::successors(self.head, move |&pos| self.nodes[pos].next)
            .map(move |pos| self.nodes[pos].page_id)
    }

    fn push_front(&mut self, page_id: PageId) {
        let node = LruNode {
            page_id,
            prev: None,
            next: self.head,
        };
        let pos = match self.free_slots.pop() {
            Some(pos) => {
                self.nodes[pos] = node;
                pos
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(pos);
        }
        self.head = Some(pos);
        if self.tail.is_none() {
            self.tail = Some(pos);
        }

        self.positions.insert(page_id, pos);
    }

    fn move_to_front(&mut self, pos: usize) {
        if self.head == Some(pos) {
            return;
        }

        self.unlink(pos);

        self.nodes[pos].prev = None;
        self.nodes[pos].next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(pos);
        }
        self.head = Some(pos);
        if self.tail.is_none() {
            self.tail = Some(pos);
        }
    }

    fn unlink(&mut self, pos: usize) {
        let node = self.nodes[pos];

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
    }
}
