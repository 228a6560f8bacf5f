//! In-order iterator over a tree

use std::iter::FusedIterator;

use super::node::Node;

/// Borrowing iterator yielding `(key, value)` pairs in ascending key order
pub struct Iter<'a, V> {
    /// Path from the root: each node paired with the next item index to yield
    stack: Vec<(&'a Node<V>, usize)>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.push_leftmost(root);
        }
        iter
    }

    fn push_leftmost(&mut self, mut node: &'a Node<V>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let node: &'a Node<V> = top.0;
            let idx = top.1;

            if idx < node.items.len() {
                top.1 += 1;
                if !node.is_leaf() {
                    self.push_leftmost(&node.children[idx + 1]);
                }
                self.remaining -= 1;
                let item = &node.items[idx];
                return Some((item.key.as_slice(), &item.value));
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}
