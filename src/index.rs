//! Identities of graphs and of the vertices they hold.
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::port::{Input, Output, PortRef};

/// Identifier of a vertex within a [`Graph`].
///
/// Identifiers are handed out by the graph from a counter that starts at 1
/// and is never rewound, so a stale identifier can never alias a vertex that
/// was inserted later.
///
/// [`Graph`]: crate::Graph
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(NonZeroU64);

impl NodeIndex {
    /// The first identifier a graph hands out.
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    /// Creates an identifier from its raw value, which must be non-zero.
    #[inline]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// The raw value of the identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// The identifier handed out right after this one.
    ///
    /// # Panics
    ///
    /// Panics when the 64-bit identifier space is exhausted.
    #[inline]
    pub(crate) fn successor(self) -> Self {
        Self(self.0.checked_add(1).expect("vertex id space exhausted"))
    }

    /// Address of the input port at `offset` of this vertex.
    #[inline]
    pub fn input(self, offset: usize) -> PortRef<Input> {
        PortRef::new(self, offset)
    }

    /// Address of the output port at `offset` of this vertex.
    #[inline]
    pub fn output(self, offset: usize) -> PortRef<Output> {
        PortRef::new(self, offset)
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Process-wide identity of a graph instance.
///
/// Vertices report the graph that owns them through this value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphId(NonZeroU64);

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

impl GraphId {
    pub(crate) fn fresh() -> Self {
        let raw = NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).expect("graph id space exhausted"))
    }

    /// The raw value of the identity.
    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Map from vertex identifiers in a source graph to the identifiers they
/// received in a destination graph.
pub type NodeMap = BTreeMap<NodeIndex, NodeIndex>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_is_not_an_identifier() {
        assert_eq!(NodeIndex::new(0), None);
        assert_eq!(NodeIndex::new(1), Some(NodeIndex::FIRST));
    }

    #[test]
    fn successor_counts_up() {
        let second = NodeIndex::FIRST.successor();
        assert_eq!(second.get(), 2);
        assert!(NodeIndex::FIRST < second);
    }

    #[test]
    fn graph_ids_are_unique() {
        let a = GraphId::fresh();
        let b = GraphId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn port_addresses() {
        let node = NodeIndex::new(7).unwrap();
        assert_eq!(node.input(2).node(), node);
        assert_eq!(node.output(1).offset(), 1);
        assert_eq!(node.output(1).to_string(), "n7.output[1]");
    }
}
