use alloc::vec::Vec;
use core::borrow::Borrow;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Children, Node, SearchResult};
use crate::order::Order;

/// The core B-tree backing [`BTree`](crate::BTree).
#[derive(Clone)]
pub(crate) struct RawBTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    order: Order,
    /// Total number of keys in the tree.
    len: usize,
}

/// One step of a root-to-node descent.
struct PathElement {
    /// The ancestor we passed through.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Ancestors collected on the way down, nearest last.
type Path = SmallVec<[PathElement; 16]>;

impl<K> RawBTree<K> {
    pub(crate) const fn new(order: Order) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            order,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Number of levels; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            let node = self.nodes.get(handle);
            current = node.children().first().copied();
        }
        height
    }

    pub(crate) fn first(&self) -> Option<&K> {
        let mut node = self.nodes.get(self.root?);
        while !node.is_leaf() {
            node = self.nodes.get(node.child(0));
        }
        node.keys().first()
    }

    pub(crate) fn last(&self) -> Option<&K> {
        let mut node = self.nodes.get(self.root?);
        while !node.is_leaf() {
            node = self.nodes.get(node.child(node.child_count() - 1));
        }
        node.keys().last()
    }

    /// Locates the node and index holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => return Some((current, idx)),
                SearchResult::GoDown(_) if node.is_leaf() => return None,
                SearchResult::GoDown(idx) => current = node.child(idx),
            }
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|(handle, idx)| self.nodes.get(handle).key(idx))
    }

    /// Inserts `key`. Returns `false`, leaving the tree untouched, if an equal
    /// key is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            let mut leaf = Node::new(None);
            leaf.insert_key(0, key);
            self.root = Some(self.nodes.alloc(leaf));
            self.len = 1;
            return true;
        };

        let mut path: Path = SmallVec::new();
        let mut current = root;

        // Keys only ever enter at a leaf.
        loop {
            let node = self.nodes.get(current);
            match node.search(&key) {
                SearchResult::Found(_) => return false,
                SearchResult::GoDown(idx) if node.is_leaf() => {
                    self.nodes.get_mut(current).insert_key(idx, key);
                    break;
                }
                SearchResult::GoDown(idx) => {
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        }

        self.len += 1;
        self.split_and_propagate(current, &mut path);
        true
    }

    /// Splits `current` while it overflows, walking up `path`. A split of the
    /// root grows the tree by one level.
    fn split_and_propagate(&mut self, mut current: Handle, path: &mut Path) {
        let max_keys = self.order.max_keys();

        while self.nodes.get(current).key_count() > max_keys {
            let (median, right) = self.nodes.get_mut(current).split();
            let right_handle = self.nodes.alloc(right);
            self.adopt_children(right_handle);

            tracing::trace!(
                node = ?current,
                sibling = ?right_handle,
                left_keys = self.nodes.get(current).key_count(),
                right_keys = self.nodes.get(right_handle).key_count(),
                "split node"
            );

            if let Some(PathElement { node: parent, child_index }) = path.pop() {
                self.nodes.get_mut(parent).insert_separator(child_index, median, right_handle);
                self.nodes.get_mut(right_handle).set_parent(Some(parent));
                current = parent;
            } else {
                let new_root = self.nodes.alloc(Node::new_root(current, median, right_handle));
                self.nodes.get_mut(current).set_parent(Some(new_root));
                self.nodes.get_mut(right_handle).set_parent(Some(new_root));
                self.root = Some(new_root);
                tracing::trace!(root = ?new_root, height = self.height(), "grew new root");
                return;
            }
        }
    }

    /// Points every child of `parent` back at it.
    fn adopt_children(&mut self, parent: Handle) {
        let children: Children = self.nodes.get(parent).children().iter().copied().collect();
        for child in children {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Removes `key` and returns it, or `None` if it was absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root?;

        let idx = loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => break idx,
                SearchResult::GoDown(_) if node.is_leaf() => return None,
                SearchResult::GoDown(idx) => {
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        };

        let removed = if self.nodes.get(current).is_leaf() {
            self.nodes.get_mut(current).remove_key(idx)
        } else {
            // Replace with the in-order successor, then remove that from its leaf.
            let holder = current;
            path.push(PathElement {
                node: holder,
                child_index: idx + 1,
            });
            current = self.nodes.get(holder).child(idx + 1);
            loop {
                let node = self.nodes.get(current);
                if node.is_leaf() {
                    break;
                }
                path.push(PathElement {
                    node: current,
                    child_index: 0,
                });
                current = node.child(0);
            }

            let successor = self.nodes.get_mut(current).remove_key(0);
            self.nodes.get_mut(holder).replace_key(idx, successor)
        };

        self.len -= 1;
        self.rebalance(current, &mut path);
        Some(removed)
    }

    /// Restores minimum occupancy from `current` upwards after a key left it.
    fn rebalance(&mut self, mut current: Handle, path: &mut Path) {
        let min_keys = self.order.min_keys();

        loop {
            let Some(PathElement { node: parent, child_index }) = path.pop() else {
                self.collapse_root(current);
                return;
            };

            if self.nodes.get(current).key_count() >= min_keys {
                return;
            }

            let parent_node = self.nodes.get(parent);
            let last = parent_node.key_count();
            let left = (child_index > 0).then(|| parent_node.child(child_index - 1));
            let right = (child_index < last).then(|| parent_node.child(child_index + 1));

            // Right sibling first; the rightmost child can only look left.
            if let Some(right) = right.filter(|&r| self.nodes.get(r).key_count() > min_keys) {
                self.borrow_from_right(current, right, parent, child_index);
                return;
            }
            if let Some(left) = left.filter(|&l| self.nodes.get(l).key_count() > min_keys) {
                self.borrow_from_left(current, left, parent, child_index);
                return;
            }

            match (left, right) {
                (Some(left), _) => self.merge(left, current, parent, child_index - 1),
                (None, Some(right)) => self.merge(current, right, parent, child_index),
                (None, None) => unreachable!("non-root node {current:?} has no siblings"),
            }
            current = parent;
        }
    }

    /// Rotates the right sibling's first key up into the parent and the
    /// parent's separator down into `node`.
    fn borrow_from_right(&mut self, node: Handle, right: Handle, parent: Handle, child_index: usize) {
        let (key, child) = self.nodes.get_mut(right).pop_front();
        let separator = self.nodes.get_mut(parent).replace_key(child_index, key);
        self.nodes.get_mut(node).push_back(separator, child);
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(node));
        }
        tracing::trace!(node = ?node, sibling = ?right, "borrowed from right sibling");
    }

    /// Mirror image of [`Self::borrow_from_right`].
    fn borrow_from_left(&mut self, node: Handle, left: Handle, parent: Handle, child_index: usize) {
        let (key, child) = self.nodes.get_mut(left).pop_back();
        let separator = self.nodes.get_mut(parent).replace_key(child_index - 1, key);
        self.nodes.get_mut(node).push_front(separator, child);
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(node));
        }
        tracing::trace!(node = ?node, sibling = ?left, "borrowed from left sibling");
    }

    /// Folds `right` and the separator at `separator_idx` into `left`, then
    /// frees `right`.
    fn merge(&mut self, left: Handle, right: Handle, parent: Handle, separator_idx: usize) {
        let (separator, removed) = self.nodes.get_mut(parent).remove_separator(separator_idx);
        debug_assert_eq!(removed, right, "separator does not guard the merged sibling");

        let right_node = self.nodes.take(right);
        let moved: Children = right_node.children().iter().copied().collect();
        self.nodes.get_mut(left).merge_with_right(separator, right_node);
        for child in moved {
            self.nodes.get_mut(child).set_parent(Some(left));
        }

        tracing::trace!(
            node = ?left,
            freed = ?right,
            keys = self.nodes.get(left).key_count(),
            "merged siblings"
        );
    }

    /// An empty root either hands over to its only child or empties the tree.
    fn collapse_root(&mut self, root: Handle) {
        let node = self.nodes.get(root);
        if node.key_count() > 0 {
            return;
        }

        if node.is_leaf() {
            self.nodes.free(root);
            self.root = None;
            debug_assert_eq!(self.nodes.len(), 0, "empty tree still owns nodes");
            tracing::trace!("tree emptied");
        } else {
            let child = node.child(0);
            self.nodes.free(root);
            self.nodes.get_mut(child).set_parent(None);
            self.root = Some(child);
            tracing::trace!(root = ?child, "collapsed root");
        }
    }

    /// In-order traversal of the subtree at `handle`.
    pub(crate) fn walk<'a, F>(&'a self, handle: Handle, visit: &mut F)
    where
        F: FnMut(Handle, &'a K),
    {
        let node = self.nodes.get(handle);
        for (i, key) in node.keys().iter().enumerate() {
            if !node.is_leaf() {
                self.walk(node.child(i), visit);
            }
            visit(handle, key);
        }
        if !node.is_leaf() {
            self.walk(node.child(node.key_count()), visit);
        }
    }

    /// Moves every key out in ascending order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<K> {
        fn drain_node<K>(nodes: &mut Arena<Node<K>>, handle: Handle, out: &mut Vec<K>) {
            let (keys, children) = nodes.take(handle).into_parts();
            if children.is_empty() {
                out.extend(keys);
                return;
            }

            let mut children = children.into_iter();
            for key in keys {
                if let Some(child) = children.next() {
                    drain_node(nodes, child, out);
                }
                out.push(key);
            }
            if let Some(child) = children.next() {
                drain_node(nodes, child, out);
            }
        }

        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            drain_node(&mut self.nodes, root, &mut out);
        }
        self.clear();
        out
    }
}

/// Lazy ascending traversal over a [`RawBTree`].
pub(crate) struct RawIter<'a, K> {
    tree: &'a RawBTree<K>,
    /// Nodes still being visited, with the index of their next key.
    stack: SmallVec<[(Handle, usize); 16]>,
    remaining: usize,
}

impl<'a, K> RawIter<'a, K> {
    pub(crate) fn new(tree: &'a RawBTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len,
        };
        if let Some(root) = tree.root {
            iter.descend_leftmost(root);
        }
        iter
    }

    fn descend_leftmost(&mut self, mut handle: Handle) {
        loop {
            self.stack.push((handle, 0));
            let node = self.tree.nodes.get(handle);
            if node.is_leaf() {
                return;
            }
            handle = node.child(0);
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<K> Clone for RawIter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for RawIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        while let Some(&(handle, index)) = self.stack.last() {
            let node = tree.nodes.get(handle);
            if index < node.key_count() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                if !node.is_leaf() {
                    self.descend_leftmost(node.child(index + 1));
                }
                self.remaining -= 1;
                return Some(node.key(index));
            }
            self.stack.pop();
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
