//! Tree writer
//!
//! Walks the tree in pre-order and emits the stream format.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::codec::ValueCodec;
use crate::error::{AtlasError, Result};
use crate::tree::node::Node;
use crate::tree::BTree;

use super::HEADER_SIZE;

impl<V> BTree<V> {
    /// Serialize the tree, shape included, to `writer`.
    ///
    /// Value bytes are produced by `codec`. On error the stream holds a
    /// partial tree and must be discarded.
    pub fn save<W: Write, C: ValueCodec<V>>(&self, writer: &mut W, codec: &C) -> Result<()> {
        tracing::debug!(
            "Saving tree: height={}, length={}",
            self.height,
            self.length
        );

        let mut header = BytesMut::with_capacity(HEADER_SIZE);
        header.put_u64(self.height as u64);
        header.put_u64(self.length as u64);
        writer.write_all(&header)?;

        if let Some(root) = self.root.as_ref() {
            write_node(writer, codec, root, self.height)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn write_node<V, W: Write, C: ValueCodec<V>>(
    writer: &mut W,
    codec: &C,
    node: &Node<V>,
    height: usize,
) -> Result<()> {
    let item_count = u8::try_from(node.items.len()).map_err(|_| {
        AtlasError::Format(format!(
            "node holds {} items, more than an item count can describe",
            node.items.len()
        ))
    })?;
    writer.write_all(&[item_count])?;

    for item in &node.items {
        writer.write_all(&(item.key.len() as u64).to_be_bytes())?;
        writer.write_all(&item.key)?;
        codec
            .encode(&item.value, writer)
            .map_err(|e| AtlasError::from_codec(&item.key, e))?;
    }
    tracing::trace!("Wrote node with {} items at height {}", item_count, height);

    if height > 0 {
        for child in &node.children {
            write_node(writer, codec, child, height - 1)?;
        }
    }

    Ok(())
}
