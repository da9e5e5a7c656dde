use std::collections::BTreeSet;
use std::fmt::Debug;

use btree_index::{BTree, Error, NodeRef, Order};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

const REFERENCE_KEYS: [i32; 11] = [1, 5, 7, 4, 16, 35, 24, 42, 21, 17, 18];

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tree_of<K: Ord + Copy>(order: usize, keys: &[K]) -> BTree<K> {
    let mut tree = BTree::new(order).unwrap();
    tree.extend(keys);
    tree
}

/// Keys of the node reached by following child indexes from the root.
fn keys_at<K: Clone>(tree: &BTree<K>, path: &[usize]) -> Vec<K> {
    let mut node = tree.root().expect("tree is empty");
    for &i in path {
        node = node.child(i).expect("no such child");
    }
    node.keys().to_vec()
}

/// Checks every structural invariant through the public node views.
fn check_invariants<K: Ord + Debug>(tree: &BTree<K>) {
    let Some(root) = tree.root() else {
        assert!(tree.is_empty(), "no root but len is {}", tree.len());
        assert_eq!(tree.height(), 0);
        return;
    };

    assert!(root.is_root());
    assert!(!root.keys().is_empty(), "root has no keys");

    let mut leaf_depths = Vec::new();
    let count = check_node(root, tree.order(), 0, &mut leaf_depths);
    assert_eq!(count, tree.len(), "len disagrees with the keys stored");
    assert!(
        leaf_depths.iter().all(|&d| d == leaf_depths[0]),
        "leaves at different depths: {leaf_depths:?}"
    );
    assert_eq!(leaf_depths[0] + 1, tree.height());

    let walked: Vec<&K> = tree.iter().collect();
    assert!(walked.windows(2).all(|w| w[0] < w[1]), "walk is not strictly ascending");
}

fn check_node<K: Ord + Debug>(node: NodeRef<'_, K>, order: Order, depth: usize, leaf_depths: &mut Vec<usize>) -> usize {
    let keys = node.keys();
    assert!(keys.len() <= order.max_keys(), "{node:?} overflows");
    if !node.is_root() {
        assert!(keys.len() >= order.min_keys(), "{node:?} underflows");
    }
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "{node:?} keys out of order");

    if node.is_leaf() {
        leaf_depths.push(depth);
        return keys.len();
    }

    assert_eq!(node.child_count(), keys.len() + 1, "{node:?} child count");
    let mut count = keys.len();
    for (i, child) in node.children().enumerate() {
        assert_eq!(child.parent(), Some(node), "stale parent link under {node:?}");
        if i > 0 {
            assert!(child.keys().iter().all(|k| *k > keys[i - 1]), "{child:?} below its separator");
        }
        if i < keys.len() {
            assert!(child.keys().iter().all(|k| *k < keys[i]), "{child:?} above its separator");
        }
        count += check_node(child, order, depth + 1, leaf_depths);
    }
    count
}

// ─── Construction ────────────────────────────────────────────────────────────

#[test]
fn order_below_three_is_rejected() {
    for order in 0..3 {
        assert_eq!(BTree::<i32>::new(order).err(), Some(Error::InvalidOrder { order, min: 3 }));
    }
    assert!(BTree::<i32>::new(3).is_ok());
}

#[test]
fn default_tree_uses_default_order() {
    let tree: BTree<u8> = BTree::default();
    assert_eq!(tree.order(), Order::DEFAULT);
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
}

// ─── Reference scenarios ─────────────────────────────────────────────────────

#[test]
fn order_four_insert_shape() {
    init_tracing();
    let tree = tree_of(4, &REFERENCE_KEYS);
    check_invariants(&tree);

    assert_eq!(keys_at(&tree, &[]), [7]);
    assert_eq!(keys_at(&tree, &[0]), [4]);
    assert_eq!(keys_at(&tree, &[1]), [17, 24]);
    assert_eq!(keys_at(&tree, &[1, 2]), [35, 42]);
    assert_eq!(tree.height(), 3);
}

#[test]
fn order_five_insert_shape() {
    let tree = tree_of(5, &[22, 5, 11, 36, 45, 1, 3, 6, 8, 9, 13, 15, 30, 35, 40, 42, 47, 48, 50, 56]);
    check_invariants(&tree);

    assert_eq!(keys_at(&tree, &[]), [22]);
    assert_eq!(keys_at(&tree, &[1]), [36, 45]);
    assert_eq!(keys_at(&tree, &[1, 2]), [47, 48, 50, 56]);
}

#[test]
fn order_four_delete_shape() {
    init_tracing();
    let mut tree = tree_of(4, &[1, 4, 5, 7, 16, 35, 24, 42, 21, 17, 18]);

    assert!(tree.delete(&35));
    check_invariants(&tree);
    assert_eq!(keys_at(&tree, &[1, 1]), [18, 21]);

    assert!(tree.delete(&42));
    check_invariants(&tree);
    assert_eq!(keys_at(&tree, &[1, 1]), [18]);

    assert!(tree.delete(&24));
    check_invariants(&tree);
    assert_eq!(keys_at(&tree, &[1, 1]), [18, 21]);

    assert!(tree.delete(&7));
    check_invariants(&tree);
    assert_eq!(keys_at(&tree, &[]), [16]);

    assert!(tree.delete(&17));
    check_invariants(&tree);
    assert_eq!(keys_at(&tree, &[]), [4, 16]);
    assert_eq!(tree.height(), 2);
}

#[test]
fn walk_yields_sorted_keys() {
    let tree = tree_of(4, &[1, 4, 5, 7, 16, 35, 24, 42, 21, 17, 18]);

    let mut keys = Vec::new();
    tree.walk(None, |_, &key| keys.push(key));
    assert_eq!(keys, [1, 4, 5, 7, 16, 17, 18, 21, 24, 35, 42]);
}

// ─── Traversal ───────────────────────────────────────────────────────────────

#[test]
fn walk_reports_the_node_holding_each_key() {
    let tree = tree_of(3, &(0..50).collect::<Vec<_>>());
    let mut visited = 0;
    tree.walk(None, |node, key| {
        assert!(node.keys().contains(key));
        visited += 1;
    });
    assert_eq!(visited, 50);
}

#[test]
fn walk_from_subtree_stays_inside_it() {
    let tree = tree_of(4, &REFERENCE_KEYS);
    let left = tree.root().unwrap().child(0).unwrap();

    let mut keys = Vec::new();
    tree.walk(Some(left), |_, &key| keys.push(key));
    assert_eq!(keys, [1, 4, 5]);

    let leaf = left.child(1).unwrap();
    keys.clear();
    tree.walk(Some(leaf), |_, &key| keys.push(key));
    assert_eq!(keys, [5]);
}

#[test]
fn walk_is_restartable() {
    let tree = tree_of(3, &[3, 1, 2]);
    let mut first = Vec::new();
    let mut second = Vec::new();
    tree.walk(None, |_, &key| first.push(key));
    tree.walk(None, |_, &key| second.push(key));
    assert_eq!(first, second);
}

#[test]
#[should_panic(expected = "`BTree::walk()` - `start` belongs to another tree!")]
fn walk_rejects_foreign_node() {
    let a = tree_of(3, &[1]);
    let b = tree_of(3, &[1]);
    b.walk(a.root(), |_, _| {});
}

#[test]
fn walk_on_empty_tree_visits_nothing() {
    let tree: BTree<i32> = BTree::new(3).unwrap();
    tree.walk(None, |_, _| panic!("visited a key in an empty tree"));
}

#[test]
fn iterators_agree_with_walk() {
    let tree = tree_of(5, &(0..300).rev().collect::<Vec<_>>());
    let mut walked = Vec::new();
    tree.walk(None, |_, &key| walked.push(key));

    let iter = tree.iter();
    assert_eq!(iter.len(), 300);
    assert_eq!(iter.copied().collect::<Vec<_>>(), walked);
    assert_eq!((&tree).into_iter().count(), 300);
    assert_eq!(tree.into_iter().collect::<Vec<_>>(), walked);
}

// ─── Mutation properties ─────────────────────────────────────────────────────

#[test]
fn search_round_trip() {
    let mut tree = BTree::new(4).unwrap();
    for key in REFERENCE_KEYS {
        tree.insert(key);
        assert_eq!(tree.search(&key), Some(&key));
    }
    for key in REFERENCE_KEYS {
        assert!(tree.delete(&key));
        assert_eq!(tree.search(&key), None);
        assert!(!tree.contains(&key));
        check_invariants(&tree);
    }
    assert!(tree.root().is_none());
}

#[test]
fn duplicate_insert_leaves_tree_unchanged() {
    let mut tree = tree_of(4, &REFERENCE_KEYS);
    let before: Vec<_> = tree.iter().copied().collect();
    let height = tree.height();

    for key in REFERENCE_KEYS {
        assert!(!tree.insert(key));
    }

    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), before);
    assert_eq!(tree.height(), height);
    assert_eq!(tree.len(), REFERENCE_KEYS.len());
    check_invariants(&tree);
}

#[test]
fn deleting_absent_key_is_a_no_op() {
    let mut tree = tree_of(4, &REFERENCE_KEYS);
    let snapshot = tree.clone();

    assert!(!tree.delete(&100));
    assert_eq!(tree.take(&-1), None);
    assert_eq!(tree, snapshot);
    assert_eq!(keys_at(&tree, &[1]), keys_at(&snapshot, &[1]));
}

#[test]
fn bulk_insert_then_delete_empties_tree() {
    init_tracing();
    for order in [3, 4, 5, 8, 16, 64] {
        let n = 1_000;
        let mut tree = BTree::new(order).unwrap();
        for key in 0..n {
            assert!(tree.insert(key));
        }
        check_invariants(&tree);
        assert_eq!(tree.len(), n as usize);
        for key in 0..n {
            assert!(tree.delete(&key), "order {order}: lost {key}");
        }
        assert!(tree.root().is_none(), "order {order}: root survived");
        assert!(tree.is_empty());
    }
}

#[test]
fn delete_from_the_right_and_middle() {
    let mut tree = BTree::new(3).unwrap();
    tree.extend(0..200);
    for key in (0..200).rev().step_by(2) {
        assert_eq!(tree.take(&key), Some(key));
        check_invariants(&tree);
    }
    for key in (0..200).filter(|k| k % 2 == 0) {
        assert!(tree.delete(&key));
        check_invariants(&tree);
    }
    assert!(tree.is_empty());
}

#[test]
fn string_keys_search_by_str() {
    let mut tree = BTree::new(3).unwrap();
    for word in ["pear", "apple", "fig", "kiwi", "banana", "cherry"] {
        tree.insert(word.to_string());
    }
    check_invariants(&tree);

    assert_eq!(tree.search("fig").map(String::as_str), Some("fig"));
    assert!(tree.delete("apple"));
    assert_eq!(tree.first().map(String::as_str), Some("banana"));
    assert_eq!(tree.last().map(String::as_str), Some("pear"));
}

#[test]
fn clear_resets_tree() {
    let mut tree = tree_of(4, &REFERENCE_KEYS);
    tree.clear();
    check_invariants(&tree);
    assert!(tree.is_empty());
    assert!(tree.insert(1));
    assert_eq!(tree.len(), 1);
}

#[test]
fn clone_is_independent() {
    let mut tree = tree_of(4, &REFERENCE_KEYS);
    let copy = tree.clone();
    tree.delete(&7);
    check_invariants(&copy);
    assert!(copy.contains(&7));
    assert!(!tree.contains(&7));
}

#[test]
fn debug_formats_as_set() {
    let tree = tree_of(3, &[2, 1, 3]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

// ─── Randomized ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i32),
    Delete(i32),
    Search(i32),
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        5 => (-500i32..500).prop_map(TreeOp::Insert),
        4 => (-500i32..500).prop_map(TreeOp::Delete),
        2 => (-500i32..500).prop_map(TreeOp::Search),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Replays random operations on both BTree and BTreeSet, checking
    /// results and invariants after every step.
    #[test]
    fn ops_match_btreeset(
        order in 3usize..10,
        ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE),
    ) {
        let mut tree = BTree::new(order).unwrap();
        let mut model = BTreeSet::new();

        for op in &ops {
            match op {
                TreeOp::Insert(k) => prop_assert_eq!(tree.insert(*k), model.insert(*k), "insert({})", k),
                TreeOp::Delete(k) => prop_assert_eq!(tree.delete(k), model.remove(k), "delete({})", k),
                TreeOp::Search(k) => prop_assert_eq!(tree.search(k), model.get(k), "search({})", k),
            }
            check_invariants(&tree);
            prop_assert_eq!(tree.len(), model.len());
        }

        let keys: Vec<i32> = tree.iter().copied().collect();
        let expected: Vec<i32> = model.into_iter().collect();
        prop_assert_eq!(keys, expected);
    }

    /// Any permutation of the same keys walks to the same sequence.
    #[test]
    fn walk_is_order_independent(
        keys in proptest::collection::btree_set(any::<i16>(), 0..400)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
        order in 3usize..12,
    ) {
        let tree = tree_of(order, &keys);
        check_invariants(&tree);

        let mut walked = Vec::new();
        tree.walk(None, |_, &key| walked.push(key));

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(walked, sorted);
    }

    /// Trees of different orders compare equal when they hold the same keys.
    #[test]
    fn equality_ignores_shape(keys in proptest::collection::vec(any::<u16>(), 0..300)) {
        let narrow = tree_of(3, &keys);
        let wide = tree_of(32, &keys);
        prop_assert_eq!(&narrow, &wide);
        prop_assert!(narrow.height() >= wide.height());
    }
}
