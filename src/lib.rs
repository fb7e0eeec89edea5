//! An augmentable, self-balancing search tree and the dynamic interval
//! stabbing index built on top of it.
//!
//! The crate is two layers:
//!
//! * [`BalancedTree`] is an AVL tree with multiset semantics: one node per
//!   distinct anchor key, each holding a bucket of members. The ordering,
//!   the bucket representation, and the aggregate state re-established after
//!   every structural change are supplied by a [`TreePolicy`]. [`Multiset`]
//!   is the plain instantiation counting occurrences per key.
//!
//! * [`IntervalIndex`] is the same engine specialised for 1-dimensional
//!   interval overlap queries. Every node is anchored at a coordinate and
//!   holds the stored intervals covering it in two orderings (by start and
//!   by end), which lets a query walk emit exactly the output-relevant
//!   members: [`IntervalIndex::stab`] runs in O(log n + k) for k results,
//!   and the structure remains fully dynamic under interleaved inserts and
//!   removals.
//!
//! ```
//! use stabtree::{Interval, IntervalIndex};
//!
//! let mut index = IntervalIndex::default();
//! index.insert(Interval::new(2, 3));
//! index.insert(Interval::new(2, 7));
//! index.insert(Interval::new(5, 6));
//!
//! // Which intervals cover the coordinate 4?
//! let mut hits = Vec::new();
//! index.stab(&4, |v| hits.push(*v));
//! assert_eq!(hits, [Interval::new(2, 7)]);
//!
//! // Removal is symmetric.
//! assert!(index.remove(&Interval::new(2, 7)));
//! index.stab(&4, |v| panic!("{v:?} no longer covers 4"));
//! ```
//!
//! Both structures are in-memory and single-threaded: operations run to
//! completion on the calling thread and never suspend, and callers needing
//! shared access must serialise externally (one exclusive lock per
//! instance). Absence is never an error — removing or probing a missing
//! value yields `false` or an empty result.

mod iter;
mod node;
mod policy;
mod span;
mod stab;
mod tree;

#[cfg(test)]
mod test_utils;

pub use crate::policy::{BucketRemoval, Counting, TreePolicy};
pub use crate::span::{Interval, Span};
pub use crate::stab::IntervalIndex;
pub use crate::tree::{BalancedTree, Multiset};
