use core::fmt;

use crate::error::{Error, Result};

/// The order of a B-tree: the maximum number of children any node may have.
///
/// A node holds at most `order - 1` keys and splits when an insert pushes it
/// past that. Every node other than the root keeps at least
/// `ceil(order / 2) - 1` keys. Orders below [`Order::MIN`] are rejected
/// because a node that drops to zero keys could then never be repaired by
/// merging with a sibling.
///
/// # Examples
///
/// ```
/// use btree_index::Order;
///
/// let order = Order::new(4).unwrap();
/// assert_eq!(order.max_keys(), 3);
/// assert_eq!(order.min_keys(), 1);
///
/// assert!(Order::new(2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(usize);

impl Order {
    /// Smallest order a tree can be built with.
    pub const MIN: usize = 3;

    /// Order used by [`BTree::default`](crate::BTree::default).
    pub const DEFAULT: Order = Order(16);

    /// Validates `order`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order < Order::MIN`.
    pub const fn new(order: usize) -> Result<Self> {
        if order < Self::MIN {
            return Err(Error::InvalidOrder { order, min: Self::MIN });
        }
        Ok(Order(order))
    }

    /// The raw order value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Maximum number of keys a node may hold once an operation completes.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        self.0 - 1
    }

    /// Maximum number of children of an internal node.
    #[must_use]
    pub const fn max_children(self) -> usize {
        self.0
    }

    /// Minimum number of keys a non-root node must keep.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.min_children() - 1
    }

    /// Minimum number of children of a non-root internal node.
    #[must_use]
    pub const fn min_children(self) -> usize {
        self.0.div_ceil(2)
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::DEFAULT
    }
}

impl TryFrom<usize> for Order {
    type Error = Error;

    fn try_from(order: usize) -> Result<Self> {
        Order::new(order)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
