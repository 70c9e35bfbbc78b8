//! Traits for call-graph traversal.
//!
//! [`CallRelation`] is the seam between the traverser and whatever holds the
//! `calls` relation. [`FactStore`](crate::FactStore) implements it from its
//! `calls/2` facts; tests implement it over plain maps.

use crate::record::FrameId;

/// A binary caller → callee relation over frame identifiers.
///
/// Implementations return neighbours in a stable enumeration order; the
/// traverser's tie-breaking follows that order.
pub trait CallRelation {
    /// Frames called directly by `frame`.
    fn callees(&self, frame: FrameId) -> Vec<FrameId>;

    /// Frames that directly called `frame`.
    fn callers(&self, frame: FrameId) -> Vec<FrameId>;
}
