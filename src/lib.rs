//! An in-memory B-tree index with a configurable order.
//!
//! This crate provides [`BTree`], an ordered set of keys kept in a classic
//! (Knuth-style) B-tree: every key lives in exactly one node, nodes hold
//! between `ceil(order / 2) - 1` and `order - 1` keys, and all leaves are at
//! the same depth. It is the indexing primitive a storage engine uses to keep
//! sorted keys with bounded fan-out and low height.
//!
//! - **Insert** descends to a leaf and splits overflowing nodes around their
//!   lower median, growing a new root when the old one splits.
//! - **Delete** reduces internal deletions to leaf deletions via the in-order
//!   successor, then repairs underflow by borrowing from a sibling or merging
//!   with one, collapsing the root when it empties.
//! - **Search** and **walk** never modify the tree.
//!
//! # Example
//!
//! ```
//! use btree_index::BTree;
//!
//! let mut tree = BTree::new(4)?;
//! for key in [1, 5, 7, 4, 16, 35, 24, 42, 21, 17, 18] {
//!     tree.insert(key);
//! }
//!
//! // Inspect the shape.
//! let root = tree.root().unwrap();
//! assert_eq!(root.keys(), &[7]);
//! assert_eq!(root.child(1).unwrap().keys(), &[17, 24]);
//!
//! // Delete with rebalancing.
//! for key in [35, 42, 24] {
//!     tree.delete(&key);
//! }
//! let leaf = tree.root().unwrap().child(1).unwrap().child(1).unwrap();
//! assert_eq!(leaf.keys(), &[18, 21]);
//!
//! // In-order traversal.
//! let mut keys = Vec::new();
//! tree.walk(None, |_, &key| keys.push(key));
//! assert_eq!(keys, [1, 4, 5, 7, 16, 17, 18, 21]);
//! # Ok::<(), btree_index::Error>(())
//! ```
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index, so parent links
//! are plain back-references that never own anything. Mutations record the
//! path of ancestors on the way down and repair the tree bottom-up over that
//! path, without recursion.
//!
//! # Logging
//!
//! Structural changes (splits, borrows, merges, root changes) are reported
//! through [`tracing`] at `TRACE` level. Install any subscriber to see them.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order;
mod raw;

pub mod btree;

pub use btree::{BTree, NodeRef};
pub use error::{Error, Result};
pub use order::Order;
