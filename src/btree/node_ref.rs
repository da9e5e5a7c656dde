use core::fmt;

use super::BTree;
use crate::raw::{Handle, Node, RawBTree};

/// A read-only view of one node of a [`BTree`].
///
/// Obtained from [`BTree::root`] or by navigating from another `NodeRef`.
/// Useful for inspecting the shape of a tree and as the starting point of a
/// [`BTree::walk`].
///
/// # Examples
///
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(4).unwrap();
/// tree.extend([1, 2, 3, 4]);
///
/// let root = tree.root().unwrap();
/// assert_eq!(root.keys(), &[2]);
///
/// let right = root.child(1).unwrap();
/// assert_eq!(right.keys(), &[3, 4]);
/// assert!(right.is_leaf());
/// assert_eq!(right.parent(), Some(root));
/// ```
pub struct NodeRef<'a, K> {
    tree: &'a RawBTree<K>,
    handle: Handle,
}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(tree: &'a RawBTree<K>, handle: Handle) -> Self {
        NodeRef { tree, handle }
    }

    fn node(self) -> &'a Node<K> {
        self.tree.node(self.handle)
    }

    /// The keys held by this node, in ascending order.
    #[must_use]
    pub fn keys(self) -> &'a [K] {
        self.node().keys()
    }

    /// Number of children; zero for a leaf, otherwise `keys().len() + 1`.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.node().child_count()
    }

    /// The child at `index`, or `None` if this is a leaf or `index` is out of
    /// range. Keys of `child(i)` lie strictly between `keys()[i - 1]` and
    /// `keys()[i]`.
    #[must_use]
    pub fn child(self, index: usize) -> Option<NodeRef<'a, K>> {
        let handle = self.node().children().get(index).copied()?;
        Some(NodeRef::new(self.tree, handle))
    }

    /// Iterates over the children from left to right.
    pub fn children(self) -> impl ExactSizeIterator<Item = NodeRef<'a, K>> + 'a {
        let tree = self.tree;
        self.node().children().iter().map(move |&handle| NodeRef::new(tree, handle))
    }

    /// The node owning this one, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a, K>> {
        self.node().parent().map(|handle| NodeRef::new(self.tree, handle))
    }

    #[must_use]
    pub fn is_leaf(self) -> bool {
        self.node().is_leaf()
    }

    #[must_use]
    pub fn is_root(self) -> bool {
        self.node().parent().is_none()
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

/// Two views are equal when they name the same node of the same tree.
impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.handle == other.handle
    }
}

impl<K> Eq for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("handle", &self.handle)
            .field("keys", &self.keys())
            .field("children", &self.child_count())
            .finish()
    }
}

impl<K> BTree<K> {
    /// Visits the keys of a subtree in order: `child(0)`, `keys()[0]`,
    /// `child(1)`, `keys()[1]`, ... down to the last child.
    ///
    /// With `start` set to `None` the whole tree is walked. `visit` receives
    /// each key together with the node holding it. Every call is independent;
    /// no cursor state is kept between walks.
    ///
    /// # Panics
    ///
    /// Panics if `start` belongs to a different tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend([1, 4, 5, 7, 16, 35, 24, 42, 21, 17, 18]);
    ///
    /// let mut keys = Vec::new();
    /// tree.walk(None, |_, &key| keys.push(key));
    /// assert_eq!(keys, [1, 4, 5, 7, 16, 17, 18, 21, 24, 35, 42]);
    ///
    /// // Only the right half of the tree.
    /// let right = tree.root().unwrap().child(1).unwrap();
    /// keys.clear();
    /// tree.walk(Some(right), |_, &key| keys.push(key));
    /// assert_eq!(keys, [16, 17, 18, 21, 24, 35, 42]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n) for the visited subtree.
    pub fn walk<'a, F>(&'a self, start: Option<NodeRef<'a, K>>, mut visit: F)
    where
        F: FnMut(NodeRef<'a, K>, &'a K),
    {
        let start = match start {
            Some(node) => {
                assert!(
                    core::ptr::eq(node.tree, &self.raw),
                    "`BTree::walk()` - `start` belongs to another tree!"
                );
                node.handle
            }
            None => match self.raw.root() {
                Some(root) => root,
                None => return,
            },
        };

        let tree = &self.raw;
        self.raw.walk(start, &mut |handle, key| visit(NodeRef::new(tree, handle), key));
    }
}
