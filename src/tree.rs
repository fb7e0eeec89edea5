use std::{cmp::Ordering, fmt};

use crate::{
    iter::NodeIter,
    node::{remove_recurse, Node, RemoveResult, Target},
    policy::{Counting, TreePolicy},
};

/// A multiset storing one node per distinct key: [`BalancedTree`] with the
/// [`Counting`] policy.
///
/// ```
/// use stabtree::Multiset;
///
/// let mut bag = Multiset::default();
///
/// assert!(bag.insert("bananas")); // First occurrence creates a node.
/// assert!(!bag.insert("bananas")); // Second lands in the same bucket.
///
/// assert_eq!(bag.count(&"bananas"), 2);
/// assert_eq!(bag.len(), 1); // Distinct keys.
/// ```
pub type Multiset<K> = BalancedTree<K, Counting>;

/// Fine-grained removal outcome, distinguishing bucket thinning from node
/// destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removed {
    /// The key was not present.
    No,
    /// An occurrence was removed; the node (and other occurrences) remain.
    Member,
    /// The last occurrence was removed along with its node.
    Node,
}

/// A self-balancing (AVL) search tree of policy-defined member buckets, one
/// bucket per distinct anchor key.
///
/// The [`TreePolicy`] supplies the ordering, the bucket representation, and
/// the hooks that keep per-node derived state consistent while rotations
/// reshape the tree. Exclusive access by a single caller is assumed; wrap
/// the tree in a lock to share it.
pub struct BalancedTree<K, P: TreePolicy<K>> {
    root: Option<Box<Node<K, P::Bucket>>>,

    /// The number of nodes (distinct anchors), not bucket members.
    nodes: usize,

    policy: P,
}

impl<K, P> Default for BalancedTree<K, P>
where
    P: TreePolicy<K> + Default,
{
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<K, P> fmt::Debug for BalancedTree<K, P>
where
    K: fmt::Debug,
    P: TreePolicy<K>,
    P::Bucket: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BalancedTree")
            .field("nodes", &self.nodes)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<K, P> Clone for BalancedTree<K, P>
where
    K: Clone,
    P: TreePolicy<K> + Clone,
    P::Bucket: Clone,
{
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            nodes: self.nodes,
            policy: self.policy.clone(),
        }
    }
}

impl<K, P> BalancedTree<K, P>
where
    P: TreePolicy<K>,
{
    /// Construct an empty tree driven by `policy`.
    pub fn new(policy: P) -> Self {
        Self {
            root: None,
            nodes: 0,
            policy,
        }
    }

    /// Insert `key`, returning true iff a new node was created for it.
    ///
    /// A key comparing equal to an existing anchor is absorbed into that
    /// node's bucket and false is returned.
    pub fn insert(&mut self, key: K) -> bool {
        let created = match self.root {
            Some(ref mut v) => v.insert(key, &self.policy),
            None => {
                let (anchor, bucket) = self.policy.new_node(key);
                self.root = Some(Box::new(Node::new(anchor, bucket)));
                true
            }
        };

        self.nodes += created as usize;
        created
    }

    /// Remove one occurrence of `key`, returning true iff its node was
    /// destroyed (the occurrence removed was the last one).
    ///
    /// Removing an absent key is a no-op returning false.
    pub fn remove(&mut self, key: &K) -> bool {
        matches!(self.remove_inner(key), Removed::Node)
    }

    pub(crate) fn remove_inner(&mut self, key: &K) -> Removed {
        match remove_recurse(&mut self.root, Target::Probe(key), &self.policy) {
            None => Removed::No,
            Some(RemoveResult::Thinned) => Removed::Member,
            Some(RemoveResult::Unlinked(..)) => {
                self.nodes -= 1;
                Removed::Node
            }
            Some(RemoveResult::ParentUnlink) => unreachable!(),
        }
    }

    /// Returns true if at least one occurrence of `key` is held.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key)
            .map(|n| self.policy.bucket_contains(n.bucket(), key))
            .unwrap_or_default()
    }

    /// The number of occurrences of `key` held.
    pub fn count(&self, key: &K) -> usize {
        self.find(key)
            .map(|n| self.policy.bucket_count(n.bucket(), key))
            .unwrap_or_default()
    }

    /// The number of nodes (distinct anchor keys) in the tree.
    pub fn len(&self) -> usize {
        self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    /// Iterate over the anchor keys in ascending order under the policy
    /// ordering.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.root
            .iter()
            .flat_map(|v| NodeIter::new(v))
            .map(|n| n.anchor())
    }

    fn find(&self, key: &K) -> Option<&Node<K, P::Bucket>> {
        let mut cur = self.root.as_deref();

        while let Some(n) = cur {
            cur = match self.policy.cmp(key, n.anchor()) {
                Ordering::Less => n.left(),
                Ordering::Equal => return Some(n),
                Ordering::Greater => n.right(),
            };
        }

        None
    }

    pub(crate) fn root(&self) -> Option<&Node<K, P::Bucket>> {
        self.root.as_deref()
    }

    pub(crate) fn policy(&self) -> &P {
        &self.policy
    }
}
