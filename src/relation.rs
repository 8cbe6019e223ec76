//! Graphs of relational operators.
//!
//! A relational plan is a [`Graph`] of boxed [`Expression`]s. Every port of a
//! relational operator takes at most one connection: an operator consumes each
//! of its inputs from exactly one upstream operator.
//!
//! ```
//! use std::any::Any;
//! use plangraph::element::{Binding, GraphElement, Membership};
//! use plangraph::port::{InputPort, OutputPort, Single};
//! use plangraph::relation::{self, Expression};
//!
//! #[derive(Debug, Clone)]
//! struct Scan {
//!     table: String,
//!     output: [OutputPort; 1],
//!     binding: Binding,
//! }
//!
//! impl GraphElement for Scan {
//!     type Flavor = Single;
//!     fn input_ports(&self) -> &[InputPort] { &[] }
//!     fn input_ports_mut(&mut self) -> &mut [InputPort] { &mut [] }
//!     fn output_ports(&self) -> &[OutputPort] { &self.output }
//!     fn output_ports_mut(&mut self) -> &mut [OutputPort] { &mut self.output }
//!     fn on_join(&mut self, membership: Option<Membership>) { self.binding.set(membership) }
//!     fn membership(&self) -> Option<Membership> { self.binding.get() }
//! }
//!
//! impl Expression for Scan {
//!     fn kind(&self) -> &'static str { "scan" }
//!     fn clone_box(&self) -> Box<dyn Expression> { Box::new(self.clone()) }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! let mut graph = relation::Graph::new();
//! let scan = relation::emplace(&mut graph, Scan {
//!     table: "orders".into(),
//!     output: [OutputPort::new(0)],
//!     binding: Binding::new(),
//! }).unwrap();
//!
//! assert_eq!(graph[scan].kind(), "scan");
//! assert_eq!(graph[scan].downcast_ref::<Scan>().unwrap().table, "orders");
//! assert_eq!(relation::enumerate_top(&graph).collect::<Vec<_>>(), [scan]);
//! ```
use std::any::Any;
use std::fmt::{self, Debug};

use crate::element::{GraphElement, Membership};
use crate::graph::GraphError;
use crate::index::{NodeIndex, NodeMap};
use crate::port::{Input, Output, Port, Single};
use crate::{merge, traverse};

/// A relational operator that can be stored in a relational [`Graph`].
pub trait Expression: GraphElement<Flavor = Single> + Debug {
    /// Short name of the operator, such as `"scan"` or `"join"`.
    fn kind(&self) -> &'static str;

    /// A copy of the operator. The copy is an orphan without connections.
    fn clone_box(&self) -> Box<dyn Expression>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Expression {
    /// The operator as its concrete type, if it is a `U`.
    pub fn downcast_ref<U: Any>(&self) -> Option<&U> {
        self.as_any().downcast_ref()
    }

    pub fn is<U: Any>(&self) -> bool {
        self.as_any().is::<U>()
    }
}

impl Clone for Box<dyn Expression> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Display for dyn Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} in, {} out)",
            self.kind(),
            self.input_ports().len(),
            self.output_ports().len()
        )
    }
}

impl GraphElement for Box<dyn Expression> {
    type Flavor = Single;

    #[inline]
    fn input_ports(&self) -> &[Port<Input>] {
        (**self).input_ports()
    }

    #[inline]
    fn input_ports_mut(&mut self) -> &mut [Port<Input>] {
        (**self).input_ports_mut()
    }

    #[inline]
    fn output_ports(&self) -> &[Port<Output>] {
        (**self).output_ports()
    }

    #[inline]
    fn output_ports_mut(&mut self) -> &mut [Port<Output>] {
        (**self).output_ports_mut()
    }

    #[inline]
    fn on_join(&mut self, membership: Option<Membership>) {
        (**self).on_join(membership)
    }

    #[inline]
    fn on_leave(&mut self) {
        (**self).on_leave()
    }

    #[inline]
    fn membership(&self) -> Option<Membership> {
        (**self).membership()
    }
}

/// A relational plan.
pub type Graph = crate::Graph<Box<dyn Expression>>;

/// Box `expression` and insert it into `graph`.
pub fn emplace<E: Expression + 'static>(
    graph: &mut Graph,
    expression: E,
) -> Result<NodeIndex, GraphError> {
    graph.insert(Box::new(expression))
}

/// Move every operator of `source` into `dest`. See [`merge::move_into`].
pub fn merge_into(source: &mut Graph, dest: &mut Graph) -> Result<NodeMap, GraphError> {
    merge::move_into(source, dest)
}

/// Copy every operator of `source` into `dest`. See [`merge::copy_into`].
pub fn merge_copy_into(source: &Graph, dest: &mut Graph) -> Result<NodeMap, GraphError> {
    merge::copy_into(source, dest)
}

/// Move the operators `subset` of `source` into a new plan. See
/// [`merge::release`].
pub fn release(
    source: &mut Graph,
    subset: impl IntoIterator<Item = NodeIndex>,
) -> Result<Graph, GraphError> {
    merge::release(source, subset)
}

/// Operators without inputs, usually scans and value lists.
pub fn enumerate_top(graph: &Graph) -> impl Iterator<Item = NodeIndex> + '_ {
    traverse::enumerate_top(graph)
}

/// Operators whose output nobody consumes, usually the plan's sinks.
pub fn enumerate_bottom(graph: &Graph) -> impl Iterator<Item = NodeIndex> + '_ {
    traverse::enumerate_bottom(graph)
}

pub fn enumerate_upstream(graph: &Graph, node: NodeIndex) -> impl Iterator<Item = NodeIndex> {
    traverse::enumerate_upstream(graph, node)
}

pub fn enumerate_downstream(graph: &Graph, node: NodeIndex) -> impl Iterator<Item = NodeIndex> {
    traverse::enumerate_downstream(graph, node)
}

pub fn sort_from_upstream(graph: &Graph) -> Vec<NodeIndex> {
    traverse::sort_from_upstream(graph)
}

pub fn sort_from_downstream(graph: &Graph) -> Vec<NodeIndex> {
    traverse::sort_from_downstream(graph)
}
