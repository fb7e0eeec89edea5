use std::{cmp::Ordering, fmt::Debug};

use proptest::prelude::*;

use crate::{policy::TreePolicy, span::Interval, tree::BalancedTree};

pub(crate) const COORD_MAX: usize = 20;

/// Generate spans with coordinates drawn from [0, [`COORD_MAX`]).
///
/// The small coordinate domain encourages overlap between generated spans.
pub(crate) fn arbitrary_span() -> impl Strategy<Value = Interval<usize>> {
    (0..COORD_MAX, 0..COORD_MAX).prop_map(|(a, b)| Interval::new(a.min(b), a.max(b)))
}

pub(crate) fn arbitrary_coord() -> impl Strategy<Value = usize> {
    0..COORD_MAX
}

/// Assert the search and AVL properties of the tree nodes, ensuring the tree
/// is well-formed.
pub(crate) fn validate_tree_structure<K, P>(t: &BalancedTree<K, P>)
where
    K: Debug,
    P: TreePolicy<K>,
{
    let root = match t.root() {
        Some(v) => v,
        None => {
            assert_eq!(t.len(), 0);
            return;
        }
    };

    let mut nodes = 0;

    // Perform a pre-order traversal of the tree.
    let mut stack = vec![root];
    while let Some(n) = stack.pop() {
        nodes += 1;

        // Prepare to visit the children
        stack.extend(n.left().iter().chain(n.right().iter()));

        // Invariant 1: the left child always holds an anchor ordered
        // strictly before this node's.
        if let Some(l) = n.left() {
            assert_eq!(
                t.policy().cmp(l.anchor(), n.anchor()),
                Ordering::Less,
                "left child {:?} not ordered before {:?}",
                l.anchor(),
                n.anchor(),
            );
        }

        // Invariant 2: the right child always holds an anchor ordered
        // strictly after this node's.
        if let Some(r) = n.right() {
            assert_eq!(
                t.policy().cmp(r.anchor(), n.anchor()),
                Ordering::Greater,
                "right child {:?} not ordered after {:?}",
                r.anchor(),
                n.anchor(),
            );
        }

        // Invariant 3: the height of this node is always +1 of the maximum
        // child height.
        let left_height = n.left().map(|v| v.height());
        let right_height = n.right().map(|v| v.height());
        let want_height = left_height
            .max(right_height)
            .map(|v| v + 1) // This node is +1 of the child, if any
            .unwrap_or_default(); // Otherwise it is at height 0

        assert_eq!(
            n.height(),
            want_height,
            "expect node with anchor {:?} to have height {}, has {}",
            n.anchor(),
            want_height,
            n.height(),
        );

        // Invariant 4: the absolute height difference between the left
        // subtree and right subtree (the "balance factor") cannot exceed 1.
        let balance = left_height
            .and_then(|l| right_height.map(|r| l as i64 - r as i64))
            .unwrap_or_default()
            .abs();
        assert!(balance <= 1, "balance={balance}, anchor={:?}", n.anchor());
    }

    // Invariant 5: the node counter tracks the reachable node count.
    assert_eq!(t.len(), nodes);
}
