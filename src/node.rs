use std::cmp::Ordering;

use crate::policy::{BucketRemoval, TreePolicy};

/// Steering input for one removal descent.
///
/// [`Target::Probe`] follows the policy ordering and consults the matched
/// node's bucket. [`Target::Min`] is the degenerate ordering that always
/// signals "descend left" until it no longer can, bottoming out on (and
/// seizing) the subtree minimum. Both run through the same removal routine,
/// which is what lets two-child deletion reuse it for in-order successor
/// extraction instead of needing a separate search.
#[derive(Debug)]
pub(crate) enum Target<'a, K> {
    Probe(&'a K),
    Min,
}

// `Target` only ever holds a shared reference (or nothing), so it is `Copy`
// regardless of `K`. The derived impls would spuriously require `K: Copy`.
impl<K> Clone for Target<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Target<'_, K> {}

impl<K> Target<'_, K> {
    /// Evaluate the descent ordering at `node`.
    fn steer<B, P>(&self, node: &Node<K, B>, policy: &P) -> Ordering
    where
        P: TreePolicy<K, Bucket = B>,
    {
        match self {
            Target::Probe(probe) => policy.cmp(probe, &node.anchor),
            Target::Min if node.left.is_some() => Ordering::Less,
            Target::Min => Ordering::Equal,
        }
    }
}

/// Outcome of one removal descent.
#[derive(Debug)]
pub(crate) enum RemoveResult<K, B> {
    /// An occurrence was removed from a bucket that still holds members; the
    /// tree shape is unchanged.
    Thinned,
    /// A node was unlinked. Its anchor and bucket are surfaced to the
    /// caller, and subtree heights along the path may have shrunk.
    Unlinked(K, B),
    /// The matched node holds no children and must be unlinked by the
    /// parent.
    ParentUnlink,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, B> {
    /// Child node pointers.
    left: Option<Box<Node<K, B>>>,
    right: Option<Box<Node<K, B>>>,

    /// The node's AVL height.
    ///
    /// A leaf has a height of 0.
    ///
    /// A u8 holds a maximum value of 255, meaning it can represent the
    /// height of a balanced tree of up to 5.78*10⁷⁶ entries.
    height: u8,

    /// The representative key every descent comparison runs against.
    anchor: K,

    /// Policy-defined state for the members mapped to this anchor.
    bucket: B,
}

impl<K, B> Node<K, B> {
    pub(crate) fn new(anchor: K, bucket: B) -> Self {
        Self {
            left: None,
            right: None,
            height: 0,
            anchor,
            bucket,
        }
    }

    /// Insert `key` into the subtree rooted at `self`.
    ///
    /// Returns true iff a new node was allocated; an anchor-equal key is
    /// absorbed into the matched node's bucket instead.
    pub(crate) fn insert<P>(self: &mut Box<Self>, key: K, policy: &P) -> bool
    where
        P: TreePolicy<K, Bucket = B>,
    {
        let child = match policy.cmp(&key, &self.anchor) {
            Ordering::Less => &mut self.left,
            Ordering::Equal => {
                policy.bucket_insert(&mut self.bucket, key);
                return false;
            }
            Ordering::Greater => &mut self.right,
        };

        let created = match child {
            Some(v) => v.insert(key, policy),
            None => {
                // Insert the key as a new immediate descendent of self.
                let (anchor, bucket) = policy.new_node(key);
                *child = Some(Box::new(Self::new(anchor, bucket)));

                // Adding this new child node cannot skew the tree in the
                // direction of the new addition such that it requires a
                // rebalance, as at most it creates an absolute height
                // difference of 1 in this direction.
                //
                // Update this node's height and aggregate state and skip the
                // rebalancing checks.
                update_height(self);
                merge_node(self, policy);
                return true;
            }
        };

        if !created {
            // The key was absorbed into a descendent bucket. The tree
            // structure is unchanged, so neither heights nor aggregates on
            // this path require maintenance.
            return false;
        }

        update_height(self);
        rebalance(self, policy);

        true
    }

    /// Remove the entry selected by `target` from the subtree rooted at
    /// `self`, if any.
    ///
    /// If the matched node's bucket reports it still holds members, no
    /// structural change occurs. Otherwise the node is unlinked: a leaf is
    /// handed to the parent via [`RemoveResult::ParentUnlink`], a one-child
    /// node is replaced by its child, and a two-child node has its in-order
    /// successor hoisted into its place by re-entering this same routine
    /// steered hard left.
    pub(super) fn remove<P>(
        self: &mut Box<Self>,
        target: Target<'_, K>,
        policy: &P,
    ) -> Option<RemoveResult<K, B>>
    where
        P: TreePolicy<K, Bucket = B>,
    {
        match target.steer(self, policy) {
            Ordering::Less => return remove_recurse(&mut self.left, target, policy),
            Ordering::Greater => return remove_recurse(&mut self.right, target, policy),
            Ordering::Equal => {}
        }

        // This node holds the target.
        if let Target::Probe(probe) = target {
            match policy.bucket_remove(&mut self.bucket, probe) {
                BucketRemoval::Missing => return None,
                BucketRemoval::Removed => return Some(RemoveResult::Thinned),
                BucketRemoval::Emptied => {
                    // The bucket is drained; the node itself must go.
                }
            }
        }

        // This node may have 0, 1 or 2 child node(s):
        //
        //                          +----------+
        //                          |  parent  |
        //                          +----------+
        //                                |
        //                                v
        //                          +----------+
        //                     +----|   self   |----+
        //                     |    +----------+    |
        //                     |                    |
        //                     v                    v
        //               +-----------+       +------------+
        //               | self.left |       | self.right |
        //               +-----------+       +------------+
        //
        // With two children, the in-order successor (the minimum of the
        // right subtree) is extracted and its anchor and bucket take this
        // node's place. With one child, the child is spliced into this
        // node's slot. With none, the parent unlinks this node.
        let (anchor, bucket) = if self.left.is_some() && self.right.is_some() {
            let (anchor, bucket) = match remove_recurse(&mut self.right, Target::Min, policy) {
                Some(RemoveResult::Unlinked(anchor, bucket)) => (anchor, bucket),
                _ => unreachable!("a non-empty subtree always yields its minimum"),
            };

            (
                std::mem::replace(&mut self.anchor, anchor),
                std::mem::replace(&mut self.bucket, bucket),
            )
        } else if let Some(child) = self.left.take().or_else(|| self.right.take()) {
            debug_assert_ne!(self.height, 0);

            let old = std::mem::replace(self, child);

            // Invariant: the node being unlinked carries no subtree.
            debug_assert!(old.left.is_none());
            debug_assert!(old.right.is_none());

            let Node { anchor, bucket, .. } = *old;
            (anchor, bucket)
        } else {
            debug_assert_eq!(self.height, 0);

            // Parent will unlink this node and harvest its contents.
            return Some(RemoveResult::ParentUnlink);
        };

        Some(RemoveResult::Unlinked(anchor, bucket))
    }

    pub(crate) fn anchor(&self) -> &K {
        &self.anchor
    }

    pub(crate) fn bucket(&self) -> &B {
        &self.bucket
    }

    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    pub(crate) fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// The anchor and an exclusive borrow of the bucket, together.
    fn anchor_bucket_mut(&mut self) -> (&K, &mut B) {
        (&self.anchor, &mut self.bucket)
    }
}

/// Recurse into `node`, removing the entry selected by `target` from the
/// subtree rooted there, if present.
///
/// Returns [`None`] if nothing matched.
///
/// Clears the `node` pointer if the [`Node::remove()`] call returns
/// [`RemoveResult::ParentUnlink`], surfacing the unlinked node's contents as
/// [`RemoveResult::Unlinked`]. On any structural change the node is
/// rebalanced and its aggregate state re-established; a [`Target::Min`]
/// unwind additionally gathers onto the extracted minimum every bucket
/// member that must accompany its anchor upward.
pub(crate) fn remove_recurse<K, B, P>(
    node: &mut Option<Box<Node<K, B>>>,
    target: Target<'_, K>,
    policy: &P,
) -> Option<RemoveResult<K, B>>
where
    P: TreePolicy<K, Bucket = B>,
{
    let ret = node.as_mut().and_then(|v| {
        let mut ret = v.remove(target, policy)?;

        if let RemoveResult::Unlinked(anchor, bucket) = &mut ret {
            if matches!(target, Target::Min) {
                // The minimum's anchor is being hoisted over this node to
                // replace a removed ancestor; members of this node's bucket
                // covering the hoisted anchor must travel with it, or a
                // later descent would terminate above them.
                let (v_anchor, v_bucket) = v.anchor_bucket_mut();
                policy.hoist(anchor, bucket, v_anchor, v_bucket);
            }

            // A node was unlinked somewhere below: recompute the height of
            // this node and restore the balance invariant, which a height
            // decrease can violate anywhere up to the root.
            update_height(v);
            rebalance(v, policy);
        }

        Some(ret)
    })?;

    match ret {
        RemoveResult::ParentUnlink => {
            // The matched node is a childless direct descendent; unlink it
            // here in the parent.
            let n = node.take().unwrap();
            let Node { anchor, bucket, .. } = *n;
            Some(RemoveResult::Unlinked(anchor, bucket))
        }
        v => Some(v),
    }
}

fn height<K, B>(n: Option<&Node<K, B>>) -> u8 {
    n.map(|v| v.height()).unwrap_or_default()
}

fn update_height<K, B>(n: &mut Node<K, B>) {
    n.height = n
        .left()
        .map(|v| v.height() + 1)
        .max(n.right().map(|v| v.height() + 1))
        .unwrap_or_default()
}

/// Compute the "balance factor" of the subtree rooted at `n`.
///
/// Returns the subtree height skew, positive when left heavy and negative
/// when right heavy.
fn balance<K, B>(n: &Node<K, B>) -> i8 {
    // Correctness: the height is a u8, the maximal value of which fits in an
    // i16 without truncation or sign inversion.
    (height(n.left()) as i16 - height(n.right()) as i16) as i8
}

/// Invoke the policy merge hook for `n` against its current children.
fn merge_node<K, B, P>(n: &mut Node<K, B>, policy: &P)
where
    P: TreePolicy<K, Bucket = B>,
{
    let left = n.left.as_deref_mut().map(|v| {
        let Node { anchor, bucket, .. } = v;
        (&*anchor, bucket)
    });
    let right = n.right.as_deref_mut().map(|v| {
        let Node { anchor, bucket, .. } = v;
        (&*anchor, bucket)
    });

    policy.merge(&n.anchor, &mut n.bucket, left, right);
}

/// Correct an out-of-range balance factor at `n` with one of the four
/// rotation shapes, then re-establish aggregate state for every node whose
/// children changed.
///
/// The caller must have updated the height of `n` first.
fn rebalance<K, B, P>(n: &mut Box<Node<K, B>>, policy: &P)
where
    P: TreePolicy<K, Bucket = B>,
{
    match balance(n) {
        // Left-heavy
        (2..) if n.left().map(balance).unwrap_or_default() >= 0 => {
            rotate_right(n, policy);
        }
        (2..) => {
            rotate_left(n.left.as_mut().unwrap(), policy);
            rotate_right(n, policy);
        }
        // Right-heavy
        (..=-2) if n.right().map(balance).unwrap_or_default() <= 0 => {
            rotate_left(n, policy);
        }
        (..=-2) => {
            rotate_right(n.right.as_mut().unwrap(), policy);
            rotate_left(n, policy);
        }
        -1..=1 => {
            // The subtree is well balanced, but a child subtree may have
            // been replaced underneath; re-establish this node's aggregate
            // state regardless.
            merge_node(n, policy);
        }
    }

    // Invariant: the absolute difference between subtree heights (the
    // "balance factor") cannot exceed 1 once rebalanced.
    debug_assert!(balance(n).abs() <= 1);
}

/// Left rotate the given subtree rooted at `x` around the pivot point `P`.
///
/// ```text
///
///      x
///     / \                               P
///    1   P         Rotate Left        /   \
///       / \      --------------->    x     y
///      2   y                        / \   / \
///         / \                      1   2 3   4
///        3   4
/// ```
///
/// Both pivots have their heights and aggregate state re-established,
/// demoted node first.
///
/// # Panics
///
/// Panics if `x` has no right pointer (cannot be rotated).
fn rotate_left<K, B, P>(x: &mut Box<Node<K, B>>, policy: &P)
where
    P: TreePolicy<K, Bucket = B>,
{
    let mut p = x.right.take().unwrap();
    std::mem::swap(x, &mut p);

    p.right = x.left.take();
    update_height(&mut p);
    merge_node(&mut p, policy);

    x.left = Some(p);
    update_height(x);
    merge_node(x, policy);
}

/// Right rotate the given subtree rooted at `y` around the pivot point `P`.
///
/// ```text
///          y
///         / \                           P
///        P   4     Rotate Right       /   \
///       / \      --------------->    x     y
///      x   3                        / \   / \
///     / \                          1   2 3   4
///    1   2
/// ```
///
/// Both pivots have their heights and aggregate state re-established,
/// demoted node first.
///
/// # Panics
///
/// Panics if `y` has no left pointer (cannot be rotated).
fn rotate_right<K, B, P>(y: &mut Box<Node<K, B>>, policy: &P)
where
    P: TreePolicy<K, Bucket = B>,
{
    let mut p = y.left.take().unwrap();
    std::mem::swap(y, &mut p);

    p.left = y.right.take();
    update_height(&mut p);
    merge_node(&mut p, policy);

    y.right = Some(p);
    update_height(y);
    merge_node(y, policy);
}
