//! Tree reader
//!
//! Rebuilds a tree node by node from the stream format. No balancing logic
//! runs: the decoded shape is the shape that was saved.

use std::io::{self, Read};

use crate::codec::ValueCodec;
use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::tree::node::{Item, Node};
use crate::tree::BTree;

use super::MAX_HEIGHT;

impl<V> BTree<V> {
    /// Deserialize a tree written by [`save`](BTree::save), using the default
    /// configuration
    pub fn load<R: Read, C: ValueCodec<V>>(reader: &mut R, codec: &C) -> Result<Self> {
        Self::load_with_config(reader, codec, Config::default())
    }

    /// Deserialize a tree written by [`save`](BTree::save).
    ///
    /// `config.max_items()` bounds the item count accepted per node. The
    /// stream is trusted to describe a balanced tree unless
    /// `config.verify_on_load()` is set. Any failure discards everything read
    /// so far.
    pub fn load_with_config<R: Read, C: ValueCodec<V>>(
        reader: &mut R,
        codec: &C,
        config: Config,
    ) -> Result<Self> {
        let height = read_u64(reader, "tree height")?;
        let length = read_u64(reader, "tree length")?;
        tracing::debug!("Loading tree: height={}, length={}", height, length);

        if length == 0 {
            if height != 0 {
                return Err(AtlasError::Format(format!(
                    "empty tree declares height {}",
                    height
                )));
            }
            return Ok(Self::with_config(config));
        }

        if height > MAX_HEIGHT {
            return Err(AtlasError::Format(format!(
                "tree height {} exceeds the maximum of {}",
                height, MAX_HEIGHT
            )));
        }
        let height = height as usize;
        let length = usize::try_from(length).map_err(|_| {
            AtlasError::Format(format!("tree length {} does not fit in memory", length))
        })?;

        let mut loader = NodeLoader {
            reader,
            codec,
            max_items: config.max_items(),
            items_read: 0,
        };
        let root = loader.read_node(height)?;

        if loader.items_read != length {
            return Err(AtlasError::Format(format!(
                "header declares {} items but the stream holds {}",
                length, loader.items_read
            )));
        }

        let tree = Self {
            config,
            height,
            length,
            root: Some(Box::new(root)),
        };

        if config.verify_on_load() {
            tree.check().map_err(AtlasError::Format)?;
        }

        tracing::debug!("Loaded {} items", tree.length);
        Ok(tree)
    }
}

/// Recursive decoder state for one `load` call
struct NodeLoader<'a, R, C> {
    reader: &'a mut R,
    codec: &'a C,
    max_items: usize,
    /// Running item count, checked against the header
    items_read: usize,
}

impl<R: Read, C> NodeLoader<'_, R, C> {
    fn read_node<V>(&mut self, height: usize) -> Result<Node<V>>
    where
        C: ValueCodec<V>,
    {
        let mut count = [0u8; 1];
        read_exact(self.reader, &mut count, "item count")?;
        let item_count = count[0] as usize;

        if item_count == 0 {
            return Err(AtlasError::Format("node with zero items".to_string()));
        }
        if item_count > self.max_items {
            return Err(AtlasError::Format(format!(
                "node holds {} items, more than the configured maximum of {}",
                item_count, self.max_items
            )));
        }

        // Leave room for one insert before the node has to split
        let mut items = Vec::with_capacity(item_count + 1);
        for _ in 0..item_count {
            let key = self.read_key()?;
            let value = self
                .codec
                .decode(&mut *self.reader)
                .map_err(|e| AtlasError::from_codec(&key, e))?;
            items.push(Item { key, value });
        }
        self.items_read += item_count;
        tracing::trace!("Read node with {} items at height {}", item_count, height);

        let mut children = Vec::new();
        if height > 0 {
            children.reserve(item_count + 2);
            for _ in 0..=item_count {
                children.push(Box::new(self.read_node(height - 1)?));
            }
        }

        Ok(Node { items, children })
    }

    fn read_key(&mut self) -> Result<Vec<u8>> {
        let key_len = read_u64(self.reader, "key length")?;

        // Bounded by the bytes actually present, not by the declared length
        let mut key = Vec::new();
        self.reader.by_ref().take(key_len).read_to_end(&mut key)?;
        if key.len() as u64 != key_len {
            return Err(AtlasError::Format(format!(
                "unexpected end of stream in key: expected {} bytes, got {}",
                key_len,
                key.len()
            )));
        }
        Ok(key)
    }
}

fn read_u64<R: Read>(reader: &mut R, what: &str) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf, what)?;
    Ok(u64::from_be_bytes(buf))
}

/// `read_exact` that reports a short stream as a format error
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            AtlasError::Format(format!("unexpected end of stream while reading {}", what))
        }
        _ => AtlasError::Io(e),
    })
}
