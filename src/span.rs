use std::cmp::Ordering;

/// Endpoint access for interval values stored in an
/// [`IntervalIndex`](crate::IntervalIndex).
///
/// A span covers every coordinate `q` with `lo() <= q <= hi()` — both ends
/// are inclusive. A zero-width span (`lo == hi`) is valid and covers exactly
/// its own coordinate; such spans also serve as the per-node anchors the
/// index classifies against.
///
/// Ties between spans with identical endpoints are broken by the value's own
/// [`Ord`] implementation, so two distinguishable values with equal endpoints
/// remain distinguishable inside the index.
///
/// The behaviour of an index holding a span whose upper endpoint precedes its
/// lower endpoint is unspecified.
pub trait Span {
    /// The coordinate type of both endpoints.
    type Endpoint: Ord + Clone;

    /// The inclusive lower endpoint.
    fn lo(&self) -> &Self::Endpoint;

    /// The inclusive upper endpoint.
    fn hi(&self) -> &Self::Endpoint;

    /// Construct the degenerate zero-width span anchored at `at`.
    fn point(at: Self::Endpoint) -> Self;
}

/// A closed interval `[lo, hi]`.
///
/// Ordered by the lower endpoint, tie-broken by the upper endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval<P> {
    lo: P,
    hi: P,
}

impl<P: Ord> Interval<P> {
    /// Build the closed interval `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `hi < lo`.
    pub fn new(lo: P, hi: P) -> Self {
        assert!(lo <= hi, "interval upper endpoint precedes lower endpoint");
        Self { lo, hi }
    }
}

impl<P: Ord + Clone> Span for Interval<P> {
    type Endpoint = P;

    fn lo(&self) -> &P {
        &self.lo
    }

    fn hi(&self) -> &P {
        &self.hi
    }

    fn point(at: P) -> Self {
        Self {
            lo: at.clone(),
            hi: at,
        }
    }
}

/// `(lo, hi)` pairs are spans too, without the validity check of
/// [`Interval::new`].
impl<P: Ord + Clone> Span for (P, P) {
    type Endpoint = P;

    fn lo(&self) -> &P {
        &self.0
    }

    fn hi(&self) -> &P {
        &self.1
    }

    fn point(at: P) -> Self {
        (at.clone(), at)
    }
}

/// The overlap ordering of a span against an anchor coordinate.
///
/// `Equal` iff the span covers the coordinate; otherwise whichever side of it
/// the span falls on. Restricted to zero-width spans this is a total order,
/// which is what makes it usable for steering descent over anchors.
pub(crate) fn overlap_cmp<I: Span>(span: &I, at: &I::Endpoint) -> Ordering {
    if span.hi() < at {
        Ordering::Less
    } else if span.lo() > at {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Bucket key realising the ascending ordering: start ascending, ties by end
/// descending, then value identity descending.
///
/// The tie-breaks mean that a prefix scan stopped at the first entry starting
/// after a probe coordinate visits every member covering that probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ByStart<I>(pub(crate) I);

impl<I: Span + Ord> Ord for ByStart<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .lo()
            .cmp(other.0.lo())
            .then_with(|| other.0.hi().cmp(self.0.hi()))
            .then_with(|| other.0.cmp(&self.0))
    }
}

impl<I: Span + Ord> PartialOrd for ByStart<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bucket key realising the descending ordering: end descending, ties by
/// start ascending, then value identity descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ByEnd<I>(pub(crate) I);

impl<I: Span + Ord> Ord for ByEnd<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .hi()
            .cmp(self.0.hi())
            .then_with(|| self.0.lo().cmp(other.0.lo()))
            .then_with(|| other.0.cmp(&self.0))
    }
}

impl<I: Span + Ord> PartialOrd for ByEnd<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
