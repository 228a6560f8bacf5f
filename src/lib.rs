//! # AtlasTree
//!
//! An in-memory ordered map with:
//! - Byte-string keys and opaque values
//! - A bounded-fan-out B-tree (split on insert, borrow/merge on delete)
//! - O(1) length, O(log n) point operations, ordered iteration
//! - A binary persistence format that preserves the exact tree shape
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BTree<V>                              │
//! │          set / get / delete / len / iter / ascend            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ owns (Box)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Node                                 │
//! │        items: [(key, value)]   children: [Box<Node>]         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ pre-order walk
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Persist   │ ───────▶ │ ValueCodec  │
//!   │ (save/load) │          │ (caller's)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Read/Write  │
//!   │  (stream)   │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use atlastree::{BTree, BytesCodec};
//! use bytes::Bytes;
//!
//! let mut tree = BTree::new();
//! tree.set("alpha", Bytes::from_static(b"1"));
//! tree.set("beta", Bytes::from_static(b"2"));
//!
//! let mut buf = Vec::new();
//! tree.save(&mut buf, &BytesCodec).unwrap();
//!
//! let loaded: BTree<Bytes> = BTree::load(&mut buf.as_slice(), &BytesCodec).unwrap();
//! assert_eq!(loaded.get(b"beta"), Some(&Bytes::from_static(b"2")));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod tree;
pub mod codec;
pub mod persist;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, CodecError, Result};
pub use config::Config;
pub use tree::{BTree, Iter};
pub use codec::{read_bytes, write_bytes, BincodeCodec, BytesCodec, FnCodec, ValueCodec};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasTree
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
