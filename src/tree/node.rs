//! B-tree node
//!
//! A node holds an ordered run of items and, when internal, one more owned
//! child than it has items. All structural algorithms (split, borrow, merge)
//! live here; the tree only handles the root.

use std::cmp::Ordering;
use std::mem;

/// A single key-value pair stored in a node
#[derive(Debug, Clone)]
pub(crate) struct Item<V> {
    pub(crate) key: Vec<u8>,
    pub(crate) value: V,
}

/// A tree node. Leaf iff `children` is empty.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) items: Vec<Item<V>>,
    pub(crate) children: Vec<Box<Node<V>>>,
}

/// Bounds a node must respect, used by [`Node::check`]
pub(crate) struct Limits {
    pub(crate) height: usize,
    pub(crate) min_items: usize,
    pub(crate) max_items: usize,
}

impl<V> Node<V> {
    /// Create a leaf holding one item
    pub(crate) fn leaf(key: Vec<u8>, value: V) -> Self {
        Self {
            items: vec![Item { key, value }],
            children: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `Ok(i)` if `items[i]` holds `key`, otherwise `Err(gap)` where the key
    /// would be inserted (and the child to descend into)
    #[inline]
    pub(crate) fn search(&self, key: &[u8]) -> Result<usize, usize> {
        self.items
            .binary_search_by(|item| item.key.as_slice().cmp(key))
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub(crate) fn get(&self, key: &[u8]) -> Option<&V> {
        let mut node = self;
        loop {
            match node.search(key) {
                Ok(i) => return Some(&node.items[i].value),
                Err(_) if node.is_leaf() => return None,
                Err(i) => node = &node.children[i],
            }
        }
    }

    pub(crate) fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        match self.search(key) {
            Ok(i) => Some(&mut self.items[i].value),
            Err(_) if self.is_leaf() => None,
            Err(i) => self.children[i].get_mut(key),
        }
    }

    pub(crate) fn first(&self) -> Option<&Item<V>> {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.items.first()
    }

    pub(crate) fn last(&self) -> Option<&Item<V>> {
        let mut node = self;
        while let Some(child) = node.children.last() {
            node = child;
        }
        node.items.last()
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Insert or replace `key`. Returns the replaced value, if any.
    ///
    /// Children that overflow `max_items` are split before returning; the
    /// caller is responsible for splitting `self`.
    pub(crate) fn insert(&mut self, key: Vec<u8>, value: V, max_items: usize) -> Option<V> {
        match self.search(&key) {
            Ok(i) => Some(mem::replace(&mut self.items[i].value, value)),
            Err(i) if self.is_leaf() => {
                self.items.insert(i, Item { key, value });
                None
            }
            Err(i) => {
                let previous = self.children[i].insert(key, value, max_items);
                if self.children[i].items.len() > max_items {
                    self.split_child(i);
                }
                previous
            }
        }
    }

    /// Split `self` around its median item.
    ///
    /// `self` keeps the lesser half; the median and a new node holding the
    /// greater half are returned for the parent to adopt.
    pub(crate) fn split(&mut self) -> (Item<V>, Node<V>) {
        let mid = self.items.len() / 2;
        let mut greater = self.items.split_off(mid);
        let median = greater.remove(0);
        let children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };
        (
            median,
            Node {
                items: greater,
                children,
            },
        )
    }

    fn split_child(&mut self, i: usize) {
        let (median, right) = self.children[i].split();
        self.items.insert(i, median);
        self.children.insert(i + 1, Box::new(right));
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove `key` from this subtree.
    ///
    /// Items in internal nodes are replaced by their in-order predecessor, so
    /// the physical removal always happens in a leaf. Underflowing children are
    /// rebalanced on the way back up; `self` may be left underflowing.
    pub(crate) fn remove(&mut self, key: &[u8], min_items: usize) -> Option<Item<V>> {
        match self.search(key) {
            Ok(i) if self.is_leaf() => Some(self.items.remove(i)),
            Ok(i) => {
                let predecessor = self.children[i].pop_last(min_items)?;
                let removed = mem::replace(&mut self.items[i], predecessor);
                self.fix_child(i, min_items);
                Some(removed)
            }
            Err(_) if self.is_leaf() => None,
            Err(i) => {
                let removed = self.children[i].remove(key, min_items)?;
                self.fix_child(i, min_items);
                Some(removed)
            }
        }
    }

    /// Remove the greatest item of this subtree
    pub(crate) fn pop_last(&mut self, min_items: usize) -> Option<Item<V>> {
        if self.is_leaf() {
            return self.items.pop();
        }
        let last = self.children.len() - 1;
        let item = self.children[last].pop_last(min_items)?;
        self.fix_child(last, min_items);
        Some(item)
    }

    /// Remove the smallest item of this subtree
    pub(crate) fn pop_first(&mut self, min_items: usize) -> Option<Item<V>> {
        if self.is_leaf() {
            if self.items.is_empty() {
                return None;
            }
            return Some(self.items.remove(0));
        }
        let item = self.children[0].pop_first(min_items)?;
        self.fix_child(0, min_items);
        Some(item)
    }

    #[inline]
    fn fix_child(&mut self, i: usize, min_items: usize) {
        if self.children[i].items.len() < min_items {
            self.rebalance(i, min_items);
        }
    }

    /// Restore `children[i]` to at least `min_items`: borrow from the left
    /// sibling, then the right, and merge only when neither can lend.
    fn rebalance(&mut self, i: usize, min_items: usize) {
        if i > 0 && self.children[i - 1].items.len() > min_items {
            self.rotate_right(i - 1);
        } else if i + 1 < self.children.len() && self.children[i + 1].items.len() > min_items {
            self.rotate_left(i);
        } else if i > 0 {
            self.merge_children(i - 1);
        } else {
            self.merge_children(i);
        }
    }

    /// Move the last item of `children[i]` up into the separator slot and the
    /// old separator down to the front of `children[i + 1]`
    fn rotate_right(&mut self, i: usize) {
        let left = &mut self.children[i];
        let Some(borrowed) = left.items.pop() else {
            return;
        };
        let borrowed_child = left.children.pop();

        let separator = mem::replace(&mut self.items[i], borrowed);

        let right = &mut self.children[i + 1];
        right.items.insert(0, separator);
        if let Some(child) = borrowed_child {
            right.children.insert(0, child);
        }
    }

    /// Mirror of [`rotate_right`](Self::rotate_right): `children[i + 1]` lends
    /// its first item to `children[i]`
    fn rotate_left(&mut self, i: usize) {
        let right = &mut self.children[i + 1];
        if right.items.is_empty() {
            return;
        }
        let borrowed = right.items.remove(0);
        let borrowed_child = if right.is_leaf() {
            None
        } else {
            Some(right.children.remove(0))
        };

        let separator = mem::replace(&mut self.items[i], borrowed);

        let left = &mut self.children[i];
        left.items.push(separator);
        if let Some(child) = borrowed_child {
            left.children.push(child);
        }
    }

    /// Fold `children[i + 1]` and the separator `items[i]` into `children[i]`
    fn merge_children(&mut self, i: usize) {
        let right = *self.children.remove(i + 1);
        let separator = self.items.remove(i);

        let left = &mut self.children[i];
        left.items.push(separator);
        left.items.extend(right.items);
        left.children.extend(right.children);
    }

    // =========================================================================
    // Ordered visits
    // =========================================================================

    /// Visit items `>= pivot` in ascending order until `f` returns false.
    /// Returns false if the visit was stopped.
    pub(crate) fn ascend<F>(&self, pivot: Option<&[u8]>, f: &mut F) -> bool
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        let (start, exact) = match pivot.map(|p| self.search(p)) {
            Some(Ok(i)) => (i, true),
            Some(Err(i)) => (i, false),
            None => (0, false),
        };

        // The gap child may still hold keys above the pivot
        if !exact && !self.is_leaf() && !self.children[start].ascend(pivot, f) {
            return false;
        }

        for i in start..self.items.len() {
            let item = &self.items[i];
            if !f(item.key.as_slice(), &item.value) {
                return false;
            }
            if !self.is_leaf() && !self.children[i + 1].ascend(None, f) {
                return false;
            }
        }
        true
    }

    /// Visit items `<= pivot` in descending order until `f` returns false.
    /// Returns false if the visit was stopped.
    pub(crate) fn descend<F>(&self, pivot: Option<&[u8]>, f: &mut F) -> bool
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        let (end, exact) = match pivot.map(|p| self.search(p)) {
            Some(Ok(i)) => (i + 1, true),
            Some(Err(i)) => (i, false),
            None => (self.items.len(), false),
        };

        if !exact && !self.is_leaf() && !self.children[end].descend(pivot, f) {
            return false;
        }

        for i in (0..end).rev() {
            let item = &self.items[i];
            if !f(item.key.as_slice(), &item.value) {
                return false;
            }
            if !self.is_leaf() && !self.children[i].descend(None, f) {
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Structural check
    // =========================================================================

    /// Check every invariant of this subtree, which must lie strictly between
    /// `lower` and `upper`. Returns the number of items found.
    pub(crate) fn check(
        &self,
        lower: Option<&[u8]>,
        upper: Option<&[u8]>,
        depth: usize,
        limits: &Limits,
    ) -> Result<usize, String> {
        let count = self.items.len();

        if count > limits.max_items {
            return Err(format!(
                "node at depth {} holds {} items (max {})",
                depth, count, limits.max_items
            ));
        }
        if depth == 0 && count == 0 {
            return Err("root node holds no items".to_string());
        }
        if depth > 0 && count < limits.min_items {
            return Err(format!(
                "node at depth {} holds {} items (min {})",
                depth, count, limits.min_items
            ));
        }

        for pair in self.items.windows(2) {
            if pair[0].key.cmp(&pair[1].key) != Ordering::Less {
                return Err(format!(
                    "keys out of order at depth {}: {:?} before {:?}",
                    depth,
                    String::from_utf8_lossy(&pair[0].key),
                    String::from_utf8_lossy(&pair[1].key)
                ));
            }
        }
        if let (Some(lower), Some(first)) = (lower, self.items.first()) {
            if first.key.as_slice() <= lower {
                return Err(format!(
                    "key {:?} at depth {} is not greater than its separator",
                    String::from_utf8_lossy(&first.key),
                    depth
                ));
            }
        }
        if let (Some(upper), Some(last)) = (upper, self.items.last()) {
            if last.key.as_slice() >= upper {
                return Err(format!(
                    "key {:?} at depth {} is not less than its separator",
                    String::from_utf8_lossy(&last.key),
                    depth
                ));
            }
        }

        if self.is_leaf() {
            if depth != limits.height {
                return Err(format!(
                    "leaf at depth {} but tree height is {}",
                    depth, limits.height
                ));
            }
            return Ok(count);
        }

        if depth >= limits.height {
            return Err(format!(
                "internal node at depth {} but tree height is {}",
                depth, limits.height
            ));
        }
        if self.children.len() != count + 1 {
            return Err(format!(
                "node at depth {} has {} items but {} children",
                depth,
                count,
                self.children.len()
            ));
        }

        let mut total = count;
        for (i, child) in self.children.iter().enumerate() {
            let lo = if i == 0 {
                lower
            } else {
                Some(self.items[i - 1].key.as_slice())
            };
            let hi = if i == count {
                upper
            } else {
                Some(self.items[i].key.as_slice())
            };
            total += child.check(lo, hi, depth + 1, limits)?;
        }
        Ok(total)
    }
}
