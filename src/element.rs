//! The contract a vertex type fulfils to be stored in a [`Graph`].
//!
//! [`Graph`]: crate::Graph
use std::fmt;

use crate::index::{GraphId, NodeIndex};
use crate::port::{Endpoint, Input, Output, PortFlavor, Single};

/// The graph a vertex is bound to, and the identifier it has there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Membership {
    graph: GraphId,
    id: NodeIndex,
}

impl Membership {
    #[inline]
    pub(crate) fn new(graph: GraphId, id: NodeIndex) -> Self {
        Self { graph, id }
    }

    #[inline]
    pub fn graph(self) -> GraphId {
        self.graph
    }

    #[inline]
    pub fn id(self) -> NodeIndex {
        self.id
    }
}

/// A vertex that can be stored in a [`Graph`].
///
/// The graph drives the lifecycle: it calls [`GraphElement::on_join`] with
/// `Some` exactly once when the vertex is inserted and with `None` when the
/// vertex is released. Vertices never bind themselves.
///
/// Ports are positional: the port at index `i` of [`GraphElement::input_ports`]
/// must have offset `i`, and the number of ports must not change while the
/// vertex is bound.
///
/// [`Graph`]: crate::Graph
pub trait GraphElement {
    /// The port type of this vertex, [`Single`] or [`Multi`](crate::port::Multi).
    type Flavor: PortFlavor;

    fn input_ports(&self) -> &[<Self::Flavor as PortFlavor>::Endpoint<Input>];

    fn input_ports_mut(&mut self) -> &mut [<Self::Flavor as PortFlavor>::Endpoint<Input>];

    fn output_ports(&self) -> &[<Self::Flavor as PortFlavor>::Endpoint<Output>];

    fn output_ports_mut(&mut self) -> &mut [<Self::Flavor as PortFlavor>::Endpoint<Output>];

    /// Notifies the vertex that it joined a graph, or left it when `None`.
    fn on_join(&mut self, membership: Option<Membership>);

    /// Notifies the vertex that it became an orphan.
    #[inline]
    fn on_leave(&mut self) {
        self.on_join(None);
    }

    /// The graph the vertex is currently bound to.
    fn membership(&self) -> Option<Membership>;

    /// The owning graph, or `None` for an orphan.
    #[inline]
    fn optional_owner(&self) -> Option<GraphId> {
        self.membership().map(Membership::graph)
    }

    /// The identifier of the vertex in its owning graph.
    #[inline]
    fn id(&self) -> Option<NodeIndex> {
        self.membership().map(Membership::id)
    }
}

/// Storage for a vertex's [`Membership`], to embed in vertex types.
///
/// Clones are orphans. Two bindings compare equal when they carry the same
/// vertex identifier, whichever graph it belongs to.
#[derive(Debug, Default)]
pub struct Binding(Option<Membership>);

impl Binding {
    #[inline]
    pub fn new() -> Self {
        Self(None)
    }

    #[inline]
    pub fn get(&self) -> Option<Membership> {
        self.0
    }

    #[inline]
    pub fn set(&mut self, membership: Option<Membership>) {
        self.0 = membership;
    }
}

impl Clone for Binding {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.0.map(Membership::id) == other.0.map(Membership::id)
    }
}

impl Eq for Binding {}

/// A vertex carrying a weight and a fixed number of ports.
///
/// # Example
///
/// ```
/// # use plangraph::{Graph, GraphElement, Node};
/// let mut graph = Graph::new();
/// let scan = graph.insert(Node::new("scan", 0, 1)).unwrap();
/// let emit = graph.insert(Node::new("emit", 1, 0)).unwrap();
/// graph.connect(scan.output(0), emit.input(0)).unwrap();
///
/// assert_eq!(*graph[emit].weight(), "emit");
/// assert_eq!(graph[emit].input_ports()[0].opposite(), Some(scan.output(0)));
/// assert_eq!(graph[scan].optional_owner(), Some(graph.id()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<W, F: PortFlavor = Single> {
    weight: W,
    inputs: Vec<F::Endpoint<Input>>,
    outputs: Vec<F::Endpoint<Output>>,
    binding: Binding,
}

impl<W> Node<W, Single> {
    /// Creates a vertex whose ports take at most one connection each.
    pub fn new(weight: W, inputs: usize, outputs: usize) -> Self {
        Self::with_ports(weight, inputs, outputs)
    }
}

impl<W> Node<W, crate::port::Multi> {
    /// Creates a vertex whose ports take any number of connections.
    pub fn multi(weight: W, inputs: usize, outputs: usize) -> Self {
        Self::with_ports(weight, inputs, outputs)
    }
}

impl<W, F: PortFlavor> Node<W, F> {
    pub fn with_ports(weight: W, inputs: usize, outputs: usize) -> Self {
        Self {
            weight,
            inputs: (0..inputs)
                .map(<F::Endpoint<Input> as Endpoint<Input>>::new)
                .collect(),
            outputs: (0..outputs)
                .map(<F::Endpoint<Output> as Endpoint<Output>>::new)
                .collect(),
            binding: Binding::new(),
        }
    }

    #[inline]
    pub fn weight(&self) -> &W {
        &self.weight
    }

    #[inline]
    pub fn weight_mut(&mut self) -> &mut W {
        &mut self.weight
    }

    /// Consumes the vertex, returning its weight.
    pub fn into_weight(self) -> W {
        self.weight
    }
}

impl<W, F: PortFlavor> GraphElement for Node<W, F> {
    type Flavor = F;

    #[inline]
    fn input_ports(&self) -> &[F::Endpoint<Input>] {
        &self.inputs
    }

    #[inline]
    fn input_ports_mut(&mut self) -> &mut [F::Endpoint<Input>] {
        &mut self.inputs
    }

    #[inline]
    fn output_ports(&self) -> &[F::Endpoint<Output>] {
        &self.outputs
    }

    #[inline]
    fn output_ports_mut(&mut self) -> &mut [F::Endpoint<Output>] {
        &mut self.outputs
    }

    #[inline]
    fn on_join(&mut self, membership: Option<Membership>) {
        self.binding.set(membership);
    }

    #[inline]
    fn membership(&self) -> Option<Membership> {
        self.binding.get()
    }
}

impl<W: fmt::Display, F: PortFlavor> fmt::Display for Node<W, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} in, {} out)",
            self.weight,
            self.inputs.len(),
            self.outputs.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::port::Multi;

    #[test]
    fn ports_are_positional() {
        let node = Node::new((), 2, 3);
        let offsets: Vec<usize> = node.output_ports().iter().map(|p| p.offset()).collect();
        assert_eq!(offsets, [0, 1, 2]);
        assert_eq!(node.input_ports().len(), 2);
    }

    #[test]
    fn join_and_leave() {
        let graph = GraphId::fresh();
        let id = NodeIndex::FIRST;
        let mut node = Node::<_, Multi>::multi('x', 1, 1);
        assert_eq!(node.optional_owner(), None);

        node.on_join(Some(Membership::new(graph, id)));
        assert_eq!(node.optional_owner(), Some(graph));
        assert_eq!(node.id(), Some(id));

        node.on_leave();
        assert_eq!(node.membership(), None);
    }

    #[test]
    fn clones_are_orphans() {
        let mut node = Node::new(1u8, 0, 0);
        node.on_join(Some(Membership::new(GraphId::fresh(), NodeIndex::FIRST)));
        assert_eq!(node.clone().optional_owner(), None);
    }

    #[test]
    fn binding_equality_ignores_graph() {
        let mut a = Binding::new();
        let mut b = Binding::new();
        a.set(Some(Membership::new(GraphId::fresh(), NodeIndex::FIRST)));
        b.set(Some(Membership::new(GraphId::fresh(), NodeIndex::FIRST)));
        assert_eq!(a, b);
        assert_ne!(a, Binding::new());
    }

    #[test]
    fn display() {
        assert_eq!(Node::new("join", 2, 1).to_string(), "join (2 in, 1 out)");
    }
}
