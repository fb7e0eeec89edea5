use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
    iter::NodeIter,
    node::Node,
    policy::{BucketRemoval, TreePolicy},
    span::{overlap_cmp, ByEnd, ByStart, Span},
    tree::{BalancedTree, Removed},
};

/// The two co-located orderings over one node's interval multiset.
///
/// Membership and occurrence counts are always identical between the two
/// maps; only the iteration order differs. The dual ordering is what lets a
/// stabbing walk emit the members overlapping a probe as a prefix scan in
/// whichever direction it is descending.
#[derive(Debug, Clone)]
pub(crate) struct Buckets<I> {
    /// By start ascending (ties: end descending, then identity descending).
    asc: BTreeMap<ByStart<I>, usize>,
    /// By end descending (ties: start ascending, then identity descending).
    desc: BTreeMap<ByEnd<I>, usize>,
}

impl<I> Buckets<I>
where
    I: Span + Ord + Clone,
{
    fn with(interval: I) -> Self {
        let mut this = Self {
            asc: BTreeMap::new(),
            desc: BTreeMap::new(),
        };
        this.add(interval);
        this
    }

    fn add(&mut self, interval: I) {
        self.push_n(interval, 1);
    }

    fn push_n(&mut self, interval: I, n: usize) {
        *self.asc.entry(ByStart(interval.clone())).or_default() += n;
        *self.desc.entry(ByEnd(interval)).or_default() += n;
    }

    fn remove(&mut self, interval: &I) -> BucketRemoval {
        let start = ByStart(interval.clone());
        match self.asc.get_mut(&start) {
            None => return BucketRemoval::Missing,
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                self.asc.remove(&start);
            }
        }

        let end = ByEnd(interval.clone());
        match self.desc.get_mut(&end) {
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                self.desc.remove(&end);
            }
            None => debug_assert!(false, "bucket orderings diverged"),
        }

        if self.asc.is_empty() {
            BucketRemoval::Emptied
        } else {
            BucketRemoval::Removed
        }
    }

    fn contains(&self, interval: &I) -> bool {
        self.asc.contains_key(&ByStart(interval.clone()))
    }

    fn count(&self, interval: &I) -> usize {
        self.asc
            .get(&ByStart(interval.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// All members ascending, each occurrence yielded once.
    fn iter(&self) -> impl Iterator<Item = &I> {
        self.asc
            .iter()
            .flat_map(|(k, n)| std::iter::repeat(&k.0).take(*n))
    }

    /// Visit the members starting at or before `at`.
    ///
    /// Qualifying members form a prefix of the ascending ordering, so the
    /// scan stops at the first miss.
    fn emit_from<F>(&self, at: &I::Endpoint, visit: &mut F)
    where
        F: FnMut(&I),
    {
        for (k, n) in self.asc.iter() {
            if k.0.lo() > at {
                break;
            }
            for _ in 0..*n {
                visit(&k.0);
            }
        }
    }

    /// Visit the members ending at or after `at`.
    fn emit_to<F>(&self, at: &I::Endpoint, visit: &mut F)
    where
        F: FnMut(&I),
    {
        for (k, n) in self.desc.iter() {
            if k.0.hi() < at {
                break;
            }
            for _ in 0..*n {
                visit(&k.0);
            }
        }
    }

    /// Visit every member.
    fn emit_all<F>(&self, visit: &mut F)
    where
        F: FnMut(&I),
    {
        for (k, n) in self.asc.iter() {
            for _ in 0..*n {
                visit(&k.0);
            }
        }
    }

    /// Move into `self` every member of a left child's bucket whose span
    /// reaches up to `at`.
    ///
    /// Members of a left child start below `at`, so those ending at or
    /// beyond it cover it — a prefix of the descending ordering.
    fn pull_left(&mut self, child: &mut Self, at: &I::Endpoint) {
        loop {
            match child.desc.first_entry() {
                Some(e) if e.key().0.hi() >= at => {
                    let (ByEnd(i), n) = e.remove_entry();
                    child.asc.remove(&ByStart(i.clone()));
                    self.push_n(i, n);
                }
                _ => break,
            }
        }
    }

    /// Move into `self` every member of a right child's bucket whose span
    /// reaches down to `at` — the mirror of [`Buckets::pull_left`].
    fn pull_right(&mut self, child: &mut Self, at: &I::Endpoint) {
        loop {
            match child.asc.first_entry() {
                Some(e) if e.key().0.lo() <= at => {
                    let (ByStart(i), n) = e.remove_entry();
                    child.desc.remove(&ByEnd(i.clone()));
                    self.push_n(i, n);
                }
                _ => break,
            }
        }
    }

    /// Move into `target` every member covering `at`, a coordinate below
    /// this bucket's own anchor.
    ///
    /// Every member reaches at least this bucket's anchor on the right, so
    /// covering `at` reduces to starting at or before it — a prefix of the
    /// ascending ordering.
    fn drain_covering(&mut self, target: &mut Self, at: &I::Endpoint) {
        loop {
            match self.asc.first_entry() {
                Some(e) if e.key().0.lo() <= at => {
                    let (ByStart(i), n) = e.remove_entry();
                    self.desc.remove(&ByEnd(i.clone()));
                    target.push_n(i, n);
                }
                _ => break,
            }
        }
    }
}

/// The [`TreePolicy`] that specialises the engine into an interval overlap
/// index.
///
/// Descent classifies an interval against each node's degenerate anchor span
/// with the overlap ordering: an interval covering the anchor coordinate
/// joins that node's buckets, anything else falls strictly to one side. The
/// merge and hoist hooks re-home members whenever restructuring makes a node
/// an ancestor of buckets holding members that cover its anchor.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StabPolicy;

impl<I> TreePolicy<I> for StabPolicy
where
    I: Span + Ord + Clone,
{
    type Bucket = Buckets<I>;

    fn cmp(&self, probe: &I, anchor: &I) -> Ordering {
        // Anchors are zero-width; their lower endpoint is the coordinate.
        overlap_cmp(probe, anchor.lo())
    }

    fn new_node(&self, key: I) -> (I, Buckets<I>) {
        let anchor = I::point(key.lo().clone());
        (anchor, Buckets::with(key))
    }

    fn bucket_insert(&self, bucket: &mut Buckets<I>, key: I) {
        bucket.add(key);
    }

    fn bucket_remove(&self, bucket: &mut Buckets<I>, probe: &I) -> BucketRemoval {
        bucket.remove(probe)
    }

    fn bucket_contains(&self, bucket: &Buckets<I>, probe: &I) -> bool {
        bucket.contains(probe)
    }

    fn bucket_count(&self, bucket: &Buckets<I>, probe: &I) -> usize {
        bucket.count(probe)
    }

    fn merge(
        &self,
        anchor: &I,
        bucket: &mut Buckets<I>,
        left: Option<(&I, &mut Buckets<I>)>,
        right: Option<(&I, &mut Buckets<I>)>,
    ) {
        // A member that lands in a child's bucket can cover this node's
        // anchor once a rotation makes this node its ancestor; a stabbing
        // walk would then terminate here without reporting it. Pull such
        // members up across the changed boundary.
        let at = anchor.lo();
        if let Some((_, l)) = left {
            bucket.pull_left(l, at);
        }
        if let Some((_, r)) = right {
            bucket.pull_right(r, at);
        }
    }

    fn hoist(
        &self,
        hoisted_anchor: &I,
        hoisted_bucket: &mut Buckets<I>,
        _anchor: &I,
        bucket: &mut Buckets<I>,
    ) {
        bucket.drain_covering(hoisted_bucket, hoisted_anchor.lo());
    }
}

/// A dynamic index of (multi)sets of closed intervals answering stabbing
/// queries: which stored intervals cover a probe coordinate?
///
/// Built on [`BalancedTree`]: every node is anchored at a coordinate and its
/// bucket holds the stored intervals covering that coordinate, kept in two
/// orderings (by start and by end). [`stab`] walks root-to-leaf emitting
/// directional bucket prefixes, visiting O(log n) nodes plus one bucket
/// entry per reported interval.
///
/// ```
/// use stabtree::{Interval, IntervalIndex};
///
/// let mut index = IntervalIndex::default();
/// index.insert(Interval::new(2, 3));
/// index.insert(Interval::new(2, 7));
/// index.insert(Interval::new(5, 6));
///
/// // Which intervals cover the coordinate 4?
/// let mut hits = Vec::new();
/// index.stab(&4, |v| hits.push(*v));
/// assert_eq!(hits, [Interval::new(2, 7)]);
/// ```
///
/// [`stab`]: IntervalIndex::stab
#[derive(Debug, Clone)]
pub struct IntervalIndex<I>
where
    I: Span + Ord + Clone,
{
    tree: BalancedTree<I, StabPolicy>,

    /// Total stored occurrences, across all buckets.
    members: usize,
}

impl<I> Default for IntervalIndex<I>
where
    I: Span + Ord + Clone,
{
    fn default() -> Self {
        Self {
            tree: BalancedTree::default(),
            members: 0,
        }
    }
}

impl<I> IntervalIndex<I>
where
    I: Span + Ord + Clone,
{
    /// Store one occurrence of `interval`.
    ///
    /// Storing the same value multiple times is supported; each occurrence
    /// is tracked (and later reported) separately.
    pub fn insert(&mut self, interval: I) {
        debug_assert!(
            interval.lo() <= interval.hi(),
            "span upper endpoint precedes lower endpoint"
        );

        self.tree.insert(interval);
        self.members += 1;
    }

    /// Remove one occurrence of `interval`, returning true iff it was
    /// stored.
    pub fn remove(&mut self, interval: &I) -> bool {
        match self.tree.remove_inner(interval) {
            Removed::No => false,
            Removed::Member | Removed::Node => {
                self.members -= 1;
                true
            }
        }
    }

    /// Returns true if at least one occurrence of `interval` is stored.
    pub fn contains(&self, interval: &I) -> bool {
        self.tree.contains(interval)
    }

    /// The number of stored occurrences of `interval`.
    pub fn count(&self, interval: &I) -> usize {
        self.tree.count(interval)
    }

    /// The total number of stored intervals, counting every occurrence.
    pub fn len(&self) -> usize {
        self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members == 0
    }

    /// Call `visit` with every stored interval covering the coordinate
    /// `at`.
    ///
    /// Each stored occurrence is reported exactly once; the order is
    /// unspecified.
    pub fn stab<F>(&self, at: &I::Endpoint, mut visit: F)
    where
        F: FnMut(&I),
    {
        let mut cur = self.tree.root();

        while let Some(n) = cur {
            cur = match at.cmp(n.anchor().lo()) {
                Ordering::Less => {
                    // Every member here ends at or beyond the anchor, so the
                    // ones covering the probe are exactly those starting at
                    // or before it.
                    n.bucket().emit_from(at, &mut visit);
                    n.left()
                }
                Ordering::Greater => {
                    n.bucket().emit_to(at, &mut visit);
                    n.right()
                }
                Ordering::Equal => {
                    // The probe sits exactly on this anchor: the entire
                    // bucket covers it, and no descendant bucket can hold a
                    // member covering an ancestor's anchor.
                    n.bucket().emit_all(&mut visit);
                    return;
                }
            };
        }
    }

    /// Call `visit` with every stored interval overlapping the span
    /// `query`.
    ///
    /// Each stored occurrence is reported exactly once; the order is
    /// unspecified.
    pub fn overlapping<F>(&self, query: &I, mut visit: F)
    where
        F: FnMut(&I),
    {
        debug_assert!(
            query.lo() <= query.hi(),
            "span upper endpoint precedes lower endpoint"
        );

        fn recurse<I, F>(node: Option<&Node<I, Buckets<I>>>, query: &I, visit: &mut F)
        where
            I: Span + Ord + Clone,
            F: FnMut(&I),
        {
            let n = match node {
                Some(n) => n,
                None => return,
            };

            match overlap_cmp(query, n.anchor().lo()) {
                Ordering::Less => {
                    // The query ends before this anchor; members overlap it
                    // iff they start at or before the query's end, and
                    // nothing in the right subtree can reach back that far.
                    n.bucket().emit_from(query.hi(), visit);
                    recurse(n.left(), query, visit);
                }
                Ordering::Greater => {
                    n.bucket().emit_to(query.lo(), visit);
                    recurse(n.right(), query, visit);
                }
                Ordering::Equal => {
                    // The query covers this anchor: every member here
                    // overlaps it, and both subtrees may hold more.
                    n.bucket().emit_all(visit);
                    recurse(n.left(), query, visit);
                    recurse(n.right(), query, visit);
                }
            }
        }

        recurse(self.tree.root(), query, &mut visit);
    }

    /// Iterate over the stored intervals, each occurrence yielded once, in
    /// anchor order and bucket-ascending order within an anchor.
    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.tree
            .root()
            .into_iter()
            .flat_map(|v| NodeIter::new(v))
            .flat_map(|n| n.bucket().iter())
    }
}
