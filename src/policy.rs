use std::cmp::Ordering;

/// Outcome of a bucket-level removal reported by
/// [`TreePolicy::bucket_remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketRemoval {
    /// The probe is not a member of the bucket; nothing was removed.
    Missing,
    /// One occurrence was removed and the bucket still holds members.
    Removed,
    /// The last member was removed; the node must be structurally unlinked.
    Emptied,
}

/// The strategy a [`BalancedTree`] is parameterised over: the descent
/// ordering, the per-node bucket of members, and the redistribution of
/// derived state performed after structural changes.
///
/// The tree owns the shape; everything stored *in* it is defined here. One
/// node exists per distinct anchor key, holding a bucket of all members the
/// ordering routed to it.
///
/// [`merge`] runs bottom-up on every node of a path touched by a structural
/// mutation — including both pivots of every rotation — so derived per-node
/// state can be kept consistent with the current shape even when heights and
/// balance factors did not change.
///
/// The tree assumes [`cmp`] is a consistent total order over the anchors it
/// produces; supplying an inconsistent ordering leaves the structure in an
/// unspecified (but memory-safe) state.
///
/// [`BalancedTree`]: crate::BalancedTree
/// [`merge`]: Self::merge
/// [`cmp`]: Self::cmp
pub trait TreePolicy<K> {
    /// Per-node payload tracking the members mapped to one anchor key.
    type Bucket;

    /// The total order steering descent. `Equal` routes a probe to the
    /// node's bucket.
    fn cmp(&self, probe: &K, anchor: &K) -> Ordering;

    /// The anchor key and initial bucket for a node created from the first
    /// insertion of `key`.
    fn new_node(&self, key: K) -> (K, Self::Bucket);

    /// A probe landed on an anchor-equal node; absorb it into the bucket.
    fn bucket_insert(&self, bucket: &mut Self::Bucket, key: K);

    /// Remove one occurrence of `probe` from the bucket.
    ///
    /// Reporting [`BucketRemoval::Emptied`] triggers structural removal of
    /// the node.
    fn bucket_remove(&self, bucket: &mut Self::Bucket, probe: &K) -> BucketRemoval;

    /// Does the bucket hold at least one occurrence of `probe`?
    fn bucket_contains(&self, bucket: &Self::Bucket, probe: &K) -> bool;

    /// The number of occurrences of `probe` held in the bucket.
    fn bucket_count(&self, bucket: &Self::Bucket, probe: &K) -> usize;

    /// Re-establish the node's derived state after its children changed.
    ///
    /// Invoked with the node's anchor and bucket plus the anchor and bucket
    /// of each present child, with mutable access to all three buckets so
    /// members can be re-homed across the changed parent/child boundary.
    fn merge(
        &self,
        anchor: &K,
        bucket: &mut Self::Bucket,
        left: Option<(&K, &mut Self::Bucket)>,
        right: Option<(&K, &mut Self::Bucket)>,
    ) {
        let _ = (anchor, bucket, left, right);
    }

    /// An anchor is being hoisted over this node to replace a removed
    /// ancestor; move the bucket members that must accompany it.
    ///
    /// Invoked on every node of the successor-extraction spine, bottom-up,
    /// while a two-child removal lifts the in-order successor into the
    /// removed node's place.
    fn hoist(
        &self,
        hoisted_anchor: &K,
        hoisted_bucket: &mut Self::Bucket,
        anchor: &K,
        bucket: &mut Self::Bucket,
    ) {
        let _ = (hoisted_anchor, hoisted_bucket, anchor, bucket);
    }
}

/// The plain multiset policy: anchors are the stored keys themselves and
/// each bucket is an occurrence count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counting;

impl<K: Ord> TreePolicy<K> for Counting {
    type Bucket = usize;

    fn cmp(&self, probe: &K, anchor: &K) -> Ordering {
        probe.cmp(anchor)
    }

    fn new_node(&self, key: K) -> (K, usize) {
        (key, 1)
    }

    fn bucket_insert(&self, bucket: &mut usize, _key: K) {
        *bucket += 1;
    }

    fn bucket_remove(&self, bucket: &mut usize, _probe: &K) -> BucketRemoval {
        debug_assert_ne!(*bucket, 0);

        *bucket -= 1;
        if *bucket == 0 {
            BucketRemoval::Emptied
        } else {
            BucketRemoval::Removed
        }
    }

    fn bucket_contains(&self, bucket: &usize, _probe: &K) -> bool {
        *bucket > 0
    }

    fn bucket_count(&self, bucket: &usize, _probe: &K) -> usize {
        *bucket
    }
}
