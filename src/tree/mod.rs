//! Tree Module
//!
//! Ordered map from byte-string keys to opaque values, backed by a B-tree.
//!
//! ## Responsibilities
//! - Ordered point lookups, inserts and deletes in O(log n)
//! - Keep every node between `min_items` and `max_items` items
//! - Grow the tree at the root on split, shrink it at the root on merge
//! - Track the item count so `len()` is O(1)
//!
//! ## Structure
//! ```text
//!                 ┌───────────────┐
//!                 │   [k4 | k8]   │          height = 2
//!                 └──┬────┬────┬──┘
//!          ┌─────────┘    │    └─────────┐
//!     ┌────▼────┐    ┌────▼────┐    ┌────▼─────┐
//!     │ [k2]    │    │ [k6]    │    │ [k10]    │
//!     └─┬─────┬─┘    └─┬─────┬─┘    └─┬──────┬─┘
//!       ▼     ▼        ▼     ▼        ▼      ▼
//!     [k1]  [k3]     [k5]  [k7]     [k9]   [k11]     leaves, all at depth 2
//! ```
//!
//! The tree is not internally synchronized; wrap it in a lock to share it.

mod iter;
pub(crate) mod node;

pub use iter::Iter;

use crate::config::Config;
use crate::error::{AtlasError, Result};
use node::{Item, Limits, Node};

/// An ordered map over byte-string keys
#[derive(Debug, Clone)]
pub struct BTree<V> {
    pub(crate) config: Config,
    /// Edges from the root to every leaf; 0 for a single leaf or empty tree
    pub(crate) height: usize,
    /// Number of key-value pairs
    pub(crate) length: usize,
    /// `None` iff the tree is empty
    pub(crate) root: Option<Box<Node<V>>>,
}

impl<V> BTree<V> {
    /// Create an empty tree with the default fan-out
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty tree with a custom configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            height: 0,
            length: 0,
            root: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of key-value pairs
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Edges from the root to any leaf
    pub fn height(&self) -> usize {
        self.height
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.root = None;
        self.height = 0;
        self.length = 0;
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Insert `value` under `key`.
    ///
    /// Returns the previous value if the key already existed; the length is
    /// unchanged in that case and grows by one otherwise.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: V) -> Option<V> {
        let key = key.into();
        let max_items = self.config.max_items();

        let Some(root) = self.root.as_mut() else {
            self.root = Some(Box::new(Node::leaf(key, value)));
            self.length = 1;
            return None;
        };

        let previous = root.insert(key, value, max_items);

        if root.items.len() > max_items {
            let (median, right) = root.split();
            if let Some(left) = self.root.take() {
                self.root = Some(Box::new(Node {
                    items: vec![median],
                    children: vec![left, Box::new(right)],
                }));
                self.height += 1;
                tracing::trace!("Root split, height now {}", self.height);
            }
        }

        if previous.is_none() {
            self.length += 1;
        }
        previous
    }

    /// Look up the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.root.as_ref()?.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.root.as_mut()?.get_mut(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value if it existed.
    ///
    /// Deleting an absent key leaves the tree untouched.
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        let min_items = self.config.min_items();
        let removed = self.root.as_mut()?.remove(key, min_items)?;
        self.after_remove();
        Some(removed.value)
    }

    // =========================================================================
    // Ordered Operations
    // =========================================================================

    /// Smallest key and its value
    pub fn min(&self) -> Option<(&[u8], &V)> {
        let item = self.root.as_ref()?.first()?;
        Some((item.key.as_slice(), &item.value))
    }

    /// Largest key and its value
    pub fn max(&self) -> Option<(&[u8], &V)> {
        let item = self.root.as_ref()?.last()?;
        Some((item.key.as_slice(), &item.value))
    }

    /// Remove and return the smallest item
    pub fn pop_min(&mut self) -> Option<(Vec<u8>, V)> {
        let min_items = self.config.min_items();
        let Item { key, value } = self.root.as_mut()?.pop_first(min_items)?;
        self.after_remove();
        Some((key, value))
    }

    /// Remove and return the largest item
    pub fn pop_max(&mut self) -> Option<(Vec<u8>, V)> {
        let min_items = self.config.min_items();
        let Item { key, value } = self.root.as_mut()?.pop_last(min_items)?;
        self.after_remove();
        Some((key, value))
    }

    /// Iterate over all items in ascending key order
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.root.as_deref(), self.length)
    }

    /// Visit items with key `>= pivot` (all items if `None`) in ascending
    /// order, stopping as soon as `f` returns `false`
    pub fn ascend<F>(&self, pivot: Option<&[u8]>, mut f: F)
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.ascend(pivot, &mut f);
        }
    }

    /// Visit items with key `<= pivot` (all items if `None`) in descending
    /// order, stopping as soon as `f` returns `false`
    pub fn descend<F>(&self, pivot: Option<&[u8]>, mut f: F)
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.descend(pivot, &mut f);
        }
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Walk the whole tree and check every structural invariant: key order,
    /// node fill bounds, child counts, uniform leaf depth and the length
    /// counter.
    pub fn verify(&self) -> Result<()> {
        self.check().map_err(AtlasError::Invariant)
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        let Some(root) = self.root.as_ref() else {
            if self.length != 0 || self.height != 0 {
                return Err(format!(
                    "empty tree reports length {} and height {}",
                    self.length, self.height
                ));
            }
            return Ok(());
        };

        let limits = Limits {
            height: self.height,
            min_items: self.config.min_items(),
            max_items: self.config.max_items(),
        };
        let counted = root.check(None, None, 0, &limits)?;
        if counted != self.length {
            return Err(format!(
                "length is {} but the tree holds {} items",
                self.length, counted
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Bookkeeping after one item left the tree: shrink the root if it ran out
    /// of items.
    fn after_remove(&mut self) {
        self.length -= 1;

        let root_is_empty = self.root.as_ref().is_some_and(|root| root.items.is_empty());
        if !root_is_empty {
            return;
        }

        // An empty internal root has exactly one child left after the merge
        self.root = self.root.take().and_then(|mut root| root.children.pop());
        if self.root.is_some() {
            self.height -= 1;
            tracing::trace!("Root collapsed, height now {}", self.height);
        } else {
            self.height = 0;
        }
    }
}

impl<V> Default for BTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a BTree<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<Vec<u8>>, V> Extend<(K, V)> for BTree<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<Vec<u8>>, V> FromIterator<(K, V)> for BTree<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
