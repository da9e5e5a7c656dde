use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::order::Order;
use crate::raw::{RawBTree, RawIter};

mod node_ref;

pub use node_ref::NodeRef;

/// An ordered set of keys stored in a B-tree of configurable order.
///
/// Every node keeps its keys sorted and has at most [`Order::max_keys`] of
/// them; every node except the root keeps at least [`Order::min_keys`]. All
/// leaves sit at the same depth. Inserts split full nodes from the bottom up,
/// and deletes borrow from or merge with a sibling on the way back up, so the
/// height stays logarithmic in the number of keys.
///
/// Inserting a key that is already present is a no-op, as is deleting one
/// that is absent.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the tree. The behavior resulting from such a logic
/// error is not specified, but will be encapsulated to the `BTree` that
/// observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(4).unwrap();
/// for key in [1, 5, 7, 4, 16, 35, 24, 42, 21, 17, 18] {
///     tree.insert(key);
/// }
///
/// assert_eq!(tree.search(&16), Some(&16));
/// assert!(tree.delete(&16));
/// assert_eq!(tree.search(&16), None);
///
/// let root = tree.root().unwrap();
/// assert_eq!(root.keys(), &[7]);
///
/// let sorted: Vec<_> = tree.iter().copied().collect();
/// assert_eq!(sorted, [1, 4, 5, 7, 17, 18, 21, 24, 35, 42]);
/// ```
pub struct BTree<K> {
    raw: RawBTree<K>,
}

/// An iterator over the keys of a `BTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BTree`].
/// See its documentation for more.
///
/// [`iter`]: BTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K: 'a> {
    inner: RawIter<'a, K>,
}

/// An owning iterator over the keys of a `BTree`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`BTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: BTree#method.into_iter
pub struct IntoIter<K> {
    inner: alloc::vec::IntoIter<K>,
}

impl<K> BTree<K> {
    /// Makes a new, empty `BTree` of the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`](crate::Error::InvalidOrder) if
    /// `order < 3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Error};
    ///
    /// let tree: BTree<u32> = BTree::new(5).unwrap();
    /// assert!(tree.is_empty());
    ///
    /// assert_eq!(
    ///     BTree::<u32>::new(2).err(),
    ///     Some(Error::InvalidOrder { order: 2, min: 3 })
    /// );
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn new(order: usize) -> Result<BTree<K>> {
        let order = Order::new(order)?;
        Ok(BTree::with_order(order))
    }

    /// Makes a new, empty `BTree` from an already validated [`Order`].
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn with_order(order: Order) -> BTree<K> {
        tracing::debug!(order = order.get(), "created B-tree");
        BTree {
            raw: RawBTree::new(order),
        }
    }

    /// Returns the order this tree was built with.
    #[must_use]
    pub fn order(&self) -> Order {
        self.raw.order()
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of levels in the tree, zero when it is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert_eq!(tree.height(), 0);
    /// tree.extend([1, 2]);
    /// assert_eq!(tree.height(), 1);
    /// tree.insert(3);
    /// assert_eq!(tree.height(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns a view of the root node, or `None` if the tree is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.raw.root().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// Removes every key.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest key, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// assert_eq!(tree.first(), None);
    /// tree.extend([3, 1, 2]);
    /// assert_eq!(tree.first(), Some(&1));
    /// assert_eq!(tree.last(), Some(&3));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key, if any.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Looks `key` up and returns the stored key equal to it.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// tree.insert(String::from("kiwi"));
    /// assert_eq!(tree.search("kiwi").map(String::as_str), Some("kiwi"));
    /// assert_eq!(tree.search("lime"), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) node visits, O(log order) comparisons per node.
    #[must_use]
    pub fn search<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns `true` if the tree holds a key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Adds a key to the tree.
    ///
    /// Returns whether the key was newly inserted. If an equal key is already
    /// present the tree is left untouched and `false` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        self.raw.insert(key)
    }

    /// Removes the key equal to `key`. Returns whether such a key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// tree.insert(2);
    /// assert!(tree.delete(&2));
    /// assert!(!tree.delete(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).is_some()
    }

    /// Removes and returns the key equal to `key`, if any.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let tree: BTree<i32> = [3, 1, 2].into_iter().collect();
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(n) to exhaust it.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: RawIter::new(&self.raw),
        }
    }
}

impl<K: Clone> Clone for BTree<K> {
    fn clone(&self) -> Self {
        BTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Two trees are equal when they hold the same keys, whatever their shape.
impl<K: PartialEq> PartialEq for BTree<K> {
    fn eq(&self, other: &BTree<K>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for BTree<K> {}

impl<K> Default for BTree<K> {
    /// Creates an empty tree of order [`Order::DEFAULT`].
    fn default() -> Self {
        BTree::with_order(Order::DEFAULT)
    }
}

impl<K: Ord> FromIterator<K> for BTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = BTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy> Extend<&'a K> for BTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        for &key in iter {
            self.insert(key);
        }
    }
}

impl<K> IntoIterator for BTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    /// Gets an iterator for moving out the tree's keys in ascending order.
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let tree: BTree<_> = [3, 1, 2].into_iter().collect();
    /// let keys: Vec<_> = tree.into_iter().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    fn into_iter(mut self) -> IntoIter<K> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {
    fn len(&self) -> usize {
        self.inner.remaining()
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K> FusedIterator for IntoIter<K> {}

impl<K: fmt::Debug> fmt::Debug for IntoIter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}
