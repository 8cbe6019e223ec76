//! Port graphs for the intermediate representation of query plans.
//!
//! Vertices of a [`Graph`] expose ordered lists of input and output ports.
//! Plans are built by inserting vertices into a graph and connecting an output
//! port of one vertex to an input port of another. The graph owns its vertices,
//! hands out [`NodeIndex`] identifiers that are never reused, and is the only
//! place connections are changed, so both ends of a connection always agree.
//!
//! On top of the container, [`merge`] moves and copies vertex sets between
//! graphs and [`traverse`] enumerates sources, sinks and topological orders.
//! [`relation`] and [`plan`] bind all of this to the two plan graphs of the
//! compiler: relational operators and execution steps.
//!
//! # Example
//!
//! ```
//! use plangraph::{merge, traverse, Graph, Node};
//!
//! let mut graph = Graph::new();
//! let scan = graph.insert(Node::new("scan", 0, 1)).unwrap();
//! let project = graph.insert(Node::new("project", 1, 1)).unwrap();
//! let emit = graph.insert(Node::new("emit", 1, 0)).unwrap();
//! graph.link(scan, 0, project, 0).unwrap();
//! graph.link(project, 0, emit, 0).unwrap();
//!
//! assert_eq!(traverse::sort_from_upstream(&graph), [scan, project, emit]);
//!
//! // Split the sink off into a plan of its own.
//! let tail = merge::release(&mut graph, [emit]).unwrap();
//! assert_eq!(traverse::enumerate_bottom(&graph).collect::<Vec<_>>(), [project]);
//! assert_eq!(tail.len(), 1);
//! ```

pub mod element;
pub mod graph;
pub mod index;
pub mod merge;
pub mod plan;
pub mod port;
pub mod relation;
pub mod traverse;

#[doc(inline)]
pub use crate::element::{Binding, GraphElement, Membership, Node};
#[doc(inline)]
pub use crate::graph::{Graph, GraphError};
#[doc(inline)]
pub use crate::index::{GraphId, NodeIndex, NodeMap};
#[doc(inline)]
pub use crate::port::{
    ConnectError, Direction, Endpoint, Input, Multi, Multiport, Output, Port, PortRef, Single,
};
