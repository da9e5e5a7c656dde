use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;

/// Keys held inline before a node spills to the heap. Nodes of larger orders
/// still work, they just allocate.
const INLINE_KEYS: usize = 15;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS + 1]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_KEYS + 2]>;

/// A B-tree node. Unlike a B+tree, every key lives in exactly one node,
/// internal or leaf.
///
/// `children` is either empty (leaf) or one longer than `keys`. Both vectors
/// may transiently hold one element too many while a split is pending.
#[derive(Clone)]
pub(crate) struct Node<K> {
    parent: Option<Handle>,
    keys: Keys<K>,
    children: Children,
}

/// Outcome of looking for a key inside a single node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// The key sits at this index.
    Found(usize),
    /// The key is absent here; this is both its insertion index and the
    /// index of the child whose interval would contain it.
    GoDown(usize),
}

impl<K> Node<K> {
    pub(crate) fn new(parent: Option<Handle>) -> Self {
        Self {
            parent,
            keys: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Builds a root holding one separator and its two children.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut root = Self::new(None);
        root.keys.push(separator);
        root.children.push(left);
        root.children.push(right);
        root
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::GoDown(idx),
        }
    }

    pub(crate) fn insert_key(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    /// Inserts `key` at `index` with `child` as its right-hand neighbour.
    pub(crate) fn insert_separator(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes the key at `index` together with its right-hand child.
    pub(crate) fn remove_separator(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    pub(crate) fn remove_key(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Takes the first key, and the first child if this node is internal.
    pub(crate) fn pop_front(&mut self) -> (K, Option<Handle>) {
        let key = self.keys.remove(0);
        let child = (!self.children.is_empty()).then(|| self.children.remove(0));
        (key, child)
    }

    /// Takes the last key, and the last child if this node is internal.
    pub(crate) fn pop_back(&mut self) -> (K, Option<Handle>) {
        let key = self.keys.pop().expect("`Node::pop_back()` - node has no keys!");
        let child = self.children.pop();
        (key, child)
    }

    pub(crate) fn push_front(&mut self, key: K, child: Option<Handle>) {
        self.keys.insert(0, key);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    pub(crate) fn push_back(&mut self, key: K, child: Option<Handle>) {
        self.keys.push(key);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Splits an overflowing node around its lower median.
    ///
    /// With `n` keys the median sits at `ceil(n/2) - 1`. Keys and children to
    /// its left stay here; the rest move into the returned sibling, whose
    /// parent is left unset.
    pub(crate) fn split(&mut self) -> (K, Node<K>) {
        let mid = self.keys.len().div_ceil(2) - 1;

        let mut right = Node::new(None);
        right.keys = self.keys.drain(mid + 1..).collect();
        if !self.children.is_empty() {
            right.children = self.children.drain(mid + 1..).collect();
        }

        let median = self.keys.pop().expect("`Node::split()` - node has no median!");
        (median, right)
    }

    /// Appends `separator` and then everything in `right`.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: Node<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }

    pub(crate) fn into_parts(self) -> (Keys<K>, Children) {
        (self.keys, self.children)
    }
}
