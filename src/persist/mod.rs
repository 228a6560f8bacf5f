//! Persist Module
//!
//! Shape-preserving binary serialization of a [`BTree`](crate::BTree).
//!
//! The exact node structure is written, so loading rebuilds the same tree
//! without re-inserting anything.
//!
//! ## Stream Format (all integers big-endian)
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (16 bytes)                                       │
//! │   Height: u64 (8) | Length: u64 (8)                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Root Node (present iff Length > 0), pre-order:          │
//! │   ItemCount: u8                                         │
//! │   [KeyLen: u64][Key][Value bytes from codec]            │
//! │   ... repeated ItemCount times ...                      │
//! │   Child nodes, left to right (ItemCount + 1 of them),   │
//! │   only when the node sits above the leaf level          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The format has a single version and no magic; it is meant to be wrapped by
//! whatever container the caller stores it in.

mod file;
mod reader;
mod writer;

// =============================================================================
// Shared Constants (used by writer and reader)
// =============================================================================

/// Header size: Height (8) + Length (8) = 16 bytes
pub const HEADER_SIZE: usize = 16;

/// Deepest tree `load` accepts; bounds recursion on corrupt input
pub const MAX_HEIGHT: u64 = 64;
