//! File helpers
//!
//! Save to and load from a path with buffered I/O.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use crate::codec::ValueCodec;
use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::tree::BTree;

impl<V> BTree<V> {
    /// Write the tree to `path`, replacing any existing file, and fsync it
    pub fn save_to_path<C: ValueCodec<V>>(&self, path: &Path, codec: &C) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        self.save(&mut writer, codec)?;

        let file = writer.into_inner().map_err(|e| AtlasError::Io(e.into_error()))?;
        file.sync_all()?;

        tracing::debug!("Saved {} items to {}", self.length, path.display());
        Ok(())
    }

    /// Load a tree from `path` with the default configuration
    pub fn load_from_path<C: ValueCodec<V>>(path: &Path, codec: &C) -> Result<Self> {
        Self::load_from_path_with_config(path, codec, Config::default())
    }

    /// Load a tree from `path`.
    ///
    /// The file must hold exactly one tree; trailing bytes are a format error.
    pub fn load_from_path_with_config<C: ValueCodec<V>>(
        path: &Path,
        codec: &C,
        config: Config,
    ) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let tree = Self::load_with_config(&mut reader, codec, config)?;

        let mut probe = [0u8; 1];
        if reader.read(&mut probe)? != 0 {
            return Err(AtlasError::Format(format!(
                "trailing bytes after tree in {}",
                path.display()
            )));
        }

        tracing::debug!("Loaded {} items from {}", tree.length, path.display());
        Ok(tree)
    }
}
