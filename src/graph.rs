//! The owning container of vertices.
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::ops::Index;

use thiserror::Error;
use tracing::{trace, warn};

use crate::element::{GraphElement, Membership};
use crate::index::{GraphId, NodeIndex, NodeMap};
use crate::merge;
use crate::port::sealed::Wiring;
use crate::port::{
    ConnectError, Direction, Endpoint, EndpointOf, Input, Output, PortDirection, PortRef,
};

mod iter;

pub use iter::{IntoIter, Iter, NodeIndices};

/// A collection of vertices connected through their ports.
///
/// The graph owns its vertices. Each vertex receives a [`NodeIndex`] when it
/// is inserted; identifiers are never handed out twice by the same graph, not
/// even after the vertex they named was erased or the graph was cleared.
///
/// All connections are made through the graph, see [`Graph::connect`]. A
/// connection only ever joins two vertices of the same graph.
///
/// # Example
///
/// ```
/// # use plangraph::{Graph, Node};
/// let mut graph = Graph::new();
/// let scan = graph.insert(Node::new("scan", 0, 1)).unwrap();
/// let filter = graph.insert(Node::new("filter", 1, 1)).unwrap();
/// let emit = graph.insert(Node::new("emit", 1, 0)).unwrap();
///
/// graph.connect(scan.output(0), filter.input(0)).unwrap();
/// graph.connect(filter.output(0), emit.input(0)).unwrap();
///
/// assert!(graph.erase(filter));
/// assert!(graph.erase(emit));
/// assert!(!graph.erase(filter));
/// assert_eq!(graph.len(), 1);
///
/// // identifiers are not reused
/// let project = graph.insert(Node::new("project", 1, 1)).unwrap();
/// assert!(project > emit);
/// ```
pub struct Graph<T> {
    id: GraphId,
    nodes: BTreeMap<NodeIndex, T>,
    next: NodeIndex,
}

/// Error returned by the container operations of [`Graph`] and by the merge
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no vertex with id {0}")]
    NotFound(NodeIndex),
    #[error("vertex id {0} is already in use")]
    ConflictingId(NodeIndex),
    #[error("vertex {0} is not in the source graph")]
    MigrationTargetNotInSource(NodeIndex),
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            id: GraphId::fresh(),
            nodes: BTreeMap::new(),
            next: NodeIndex::FIRST,
        }
    }

    /// The identity vertices of this graph report as their owner.
    #[inline]
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Number of vertices in the graph.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeIndex) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn find(&self, id: NodeIndex) -> Option<&T> {
        self.nodes.get(&id)
    }

    /// The vertex with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if there is no such vertex.
    pub fn at(&self, id: NodeIndex) -> Result<&T, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NotFound(id))
    }

    /// Iterator over the vertices and their identifiers, in identifier order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.nodes.iter())
    }

    /// Iterator over the identifiers of the vertices.
    pub fn node_indices(&self) -> NodeIndices<'_, T> {
        NodeIndices::new(self.nodes.keys())
    }

    /// Destroys all vertices. Identifiers keep counting from where they were.
    pub fn clear(&mut self) {
        trace!(graph = %self.id, vertices = self.nodes.len(), "graph.clear");
        self.nodes.clear();
    }

    /// Takes every vertex out of the graph as is, bindings and links
    /// included.
    pub(crate) fn take_nodes(&mut self) -> BTreeMap<NodeIndex, T> {
        std::mem::take(&mut self.nodes)
    }

    fn allocate_id(&mut self) -> NodeIndex {
        let id = self.next;
        self.next = id.successor();
        id
    }
}

impl<T: GraphElement> Graph<T> {
    /// Insert a vertex, taking ownership of it.
    ///
    /// The vertex receives the next unused identifier and is notified through
    /// [`GraphElement::on_join`]. Any connections the vertex claims to have are
    /// dropped; connections are only made within a graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ConflictingId`] if the identifier counter handed
    /// out an identifier that is still in use.
    pub fn insert(&mut self, mut vertex: T) -> Result<NodeIndex, GraphError> {
        clear_links(&mut vertex);
        self.bind(vertex)
    }

    /// Insert a copy of a vertex. The copy starts out without connections.
    pub fn insert_cloned(&mut self, vertex: &T) -> Result<NodeIndex, GraphError>
    where
        T: Clone,
    {
        self.insert(vertex.clone())
    }

    /// Build a vertex from `value` and insert it.
    pub fn emplace<U: Into<T>>(&mut self, value: U) -> Result<NodeIndex, GraphError> {
        self.insert(value.into())
    }

    /// Bind a vertex under a fresh identifier, keeping its connections as
    /// they are. Callers are responsible for repairing them.
    pub(crate) fn bind(&mut self, vertex: T) -> Result<NodeIndex, GraphError> {
        let id = self.allocate_id();
        self.bind_at(id, vertex)
    }

    fn bind_at(&mut self, id: NodeIndex, mut vertex: T) -> Result<NodeIndex, GraphError> {
        match self.nodes.entry(id) {
            Entry::Occupied(_) => Err(GraphError::ConflictingId(id)),
            Entry::Vacant(slot) => {
                vertex.on_join(Some(Membership::new(self.id, id)));
                slot.insert(vertex);
                trace!(graph = %self.id, node = %id, "graph.insert");
                Ok(id)
            }
        }
    }

    /// Remove a vertex without touching its connections and orphan it.
    pub(crate) fn unbind(&mut self, id: NodeIndex) -> Option<T> {
        let mut vertex = self.nodes.remove(&id)?;
        vertex.on_leave();
        Some(vertex)
    }

    /// Remove a vertex and destroy it.
    ///
    /// All of its connections are removed first, so that its former
    /// neighbours are left with disconnected ports.
    ///
    /// Returns whether the vertex existed.
    pub fn erase(&mut self, id: NodeIndex) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.sever_where(id, |_| false);
        self.nodes.remove(&id);
        trace!(graph = %self.id, node = %id, "graph.erase");
        true
    }

    /// Remove a vertex without destroying it.
    ///
    /// All of its connections are removed, the vertex is notified through
    /// [`GraphElement::on_leave`] and handed to the caller as an orphan. It can
    /// be inserted into this or another graph again.
    ///
    /// # Example
    ///
    /// ```
    /// # use plangraph::{Graph, GraphElement, Node};
    /// let mut graph = Graph::new();
    /// let a = graph.insert(Node::new('a', 0, 1)).unwrap();
    /// let b = graph.insert(Node::new('b', 1, 0)).unwrap();
    /// graph.connect(a.output(0), b.input(0)).unwrap();
    ///
    /// let orphan = graph.release(a).unwrap();
    /// assert_eq!(orphan.optional_owner(), None);
    /// assert!(!orphan.output_ports()[0].is_connected());
    /// assert!(!graph[b].input_ports()[0].is_connected());
    ///
    /// let mut other = Graph::new();
    /// let moved = other.insert(orphan).unwrap();
    /// assert_eq!(other[moved].optional_owner(), Some(other.id()));
    /// ```
    pub fn release(&mut self, id: NodeIndex) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        self.sever_where(id, |_| false);
        trace!(graph = %self.id, node = %id, "graph.release");
        self.unbind(id)
    }

    /// Run `f` on the vertex `id` and return its result.
    ///
    /// This is the only way to mutate a vertex stored in the graph. Once `f`
    /// returns, the graph rebinds the vertex if `f` changed its membership and
    /// brings its connections back in line with the rest of the graph:
    ///
    ///  - a connection `f` removed from the vertex, directly or by replacing
    ///    a port or the whole vertex, is removed from the opposite port too;
    ///  - a connection `f` added to the vertex is dropped, connections are
    ///    only made with [`Graph::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if there is no such vertex.
    ///
    /// # Example
    ///
    /// ```
    /// # use plangraph::{Direction, Graph, GraphElement, Node};
    /// let mut graph = Graph::new();
    /// let a = graph.insert(Node::new('a', 0, 1)).unwrap();
    /// let b = graph.insert(Node::new('b', 1, 0)).unwrap();
    /// graph.connect(a.output(0), b.input(0)).unwrap();
    ///
    /// graph.modify(a, |vertex| *vertex.weight_mut() = 'x').unwrap();
    /// assert_eq!(*graph[a].weight(), 'x');
    /// assert!(graph.is_connected(b, Direction::Incoming));
    ///
    /// graph.modify(a, |vertex| *vertex = Node::new('z', 0, 0)).unwrap();
    /// assert_eq!(graph[a].optional_owner(), Some(graph.id()));
    /// assert!(!graph.is_connected(b, Direction::Incoming));
    /// ```
    pub fn modify<R>(
        &mut self,
        id: NodeIndex,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, GraphError> {
        let vertex = self.nodes.get_mut(&id).ok_or(GraphError::NotFound(id))?;
        let (inbound, outbound) = links_of(id, vertex);
        let result = f(vertex);
        self.repair(id, inbound, outbound);
        Ok(result)
    }

    /// Run `f` on every vertex in identifier order, as [`Graph::modify`]
    /// does for one.
    pub fn modify_each(&mut self, mut f: impl FnMut(NodeIndex, &mut T)) {
        let ids: Vec<NodeIndex> = self.nodes.keys().copied().collect();
        for id in ids {
            if let Err(err) = self.modify(id, |vertex| f(id, vertex)) {
                warn!(error = %err, "graph.modify.error");
            }
        }
    }

    /// Restore the binding and the connections of vertex `id` after it was
    /// handed out mutably. `inbound` and `outbound` are its links from
    /// before.
    fn repair(&mut self, id: NodeIndex, inbound: Vec<Link>, outbound: Vec<Link>) {
        let Some(vertex) = self.nodes.get_mut(&id) else {
            return;
        };

        let membership = Some(Membership::new(self.id, id));
        if vertex.membership() != membership {
            trace!(graph = %self.id, node = %id, "graph.modify.rebind");
            vertex.on_join(membership);
        }

        let (mut now_inbound, mut now_outbound) = links_of(id, vertex);
        clear_links(vertex);

        let mut kept = Vec::new();
        let mut lost = Vec::new();
        for link in inbound {
            let self_loop = link.0.node() == id;
            if take_link(&mut now_inbound, link)
                && (!self_loop || take_link(&mut now_outbound, link))
            {
                kept.push(link);
            } else {
                lost.push(link);
            }
        }
        for link in outbound.into_iter().filter(|link| link.1.node() != id) {
            if take_link(&mut now_outbound, link) {
                kept.push(link);
            } else {
                lost.push(link);
            }
        }
        // whatever is left was made up by the caller
        now_outbound.retain(|link| link.1.node() != id);
        if !now_inbound.is_empty() || !now_outbound.is_empty() {
            warn!(graph = %self.id, node = %id, "graph.modify.unmanaged_links");
        }

        for (output, input) in kept {
            if input.node() == id {
                if let Ok(port) = self.endpoint_mut(input) {
                    port.link(output);
                }
            }
            if output.node() == id {
                if let Ok(port) = self.endpoint_mut(output) {
                    port.link(input);
                }
            }
        }
        for (output, input) in lost {
            let unlinked = if output.node() == id && input.node() == id {
                continue;
            } else if input.node() == id {
                self.endpoint_mut(output).map(|port| port.unlink(input))
            } else {
                self.endpoint_mut(input).map(|port| port.unlink(output))
            };
            if !matches!(unlinked, Ok(true)) {
                warn!(output = %output, input = %input, "graph.modify.inconsistent");
            }
            trace!(graph = %self.id, output = %output, input = %input, "graph.modify.disconnect");
        }
    }

    /// Erase every vertex for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeIndex, &T) -> bool) {
        let doomed: Vec<NodeIndex> = self
            .nodes
            .iter()
            .filter(|(id, vertex)| !keep(**id, *vertex))
            .map(|(id, _)| *id)
            .collect();

        for id in doomed {
            self.erase(id);
        }
    }

    fn endpoint<D: PortDirection>(
        &self,
        port: PortRef<D>,
    ) -> Result<&EndpointOf<T, D>, ConnectError> {
        let vertex = self
            .nodes
            .get(&port.node())
            .ok_or(ConnectError::UnknownNode(port.node()))?;
        D::ports(vertex)
            .get(port.offset())
            .ok_or(ConnectError::UnknownPort(port.into()))
    }

    fn endpoint_mut<D: PortDirection>(
        &mut self,
        port: PortRef<D>,
    ) -> Result<&mut EndpointOf<T, D>, ConnectError> {
        let vertex = self
            .nodes
            .get_mut(&port.node())
            .ok_or(ConnectError::UnknownNode(port.node()))?;
        D::ports_mut(vertex)
            .get_mut(port.offset())
            .ok_or(ConnectError::UnknownPort(port.into()))
    }

    /// The ports connected to `port`.
    pub fn opposites<D: PortDirection>(
        &self,
        port: PortRef<D>,
    ) -> Result<&[PortRef<D::Opposite>], ConnectError> {
        Ok(self.endpoint(port)?.opposites())
    }

    /// Connect two ports.
    ///
    /// Returns `Ok(true)` when a new connection was made. Ports with a single
    /// opposite return `Ok(false)` when they are already connected to each
    /// other; multiports always make a new, possibly parallel, connection.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::UnknownNode`] and [`ConnectError::UnknownPort`] if
    ///   either address does not name a port of this graph.
    /// - [`ConnectError::AlreadyConnected`] if a single-opposite port is
    ///   already connected to a different port.
    /// - [`ConnectError::InconsistentConnection`] if only one of the two
    ///   ports records the connection.
    ///
    /// # Example
    ///
    /// ```
    /// # use plangraph::{ConnectError, Graph, Node};
    /// let mut graph = Graph::new();
    /// let a = graph.insert(Node::new('a', 0, 1)).unwrap();
    /// let b = graph.insert(Node::new('b', 1, 0)).unwrap();
    /// let c = graph.insert(Node::new('c', 1, 0)).unwrap();
    ///
    /// assert_eq!(graph.connect(a.output(0), b.input(0)), Ok(true));
    /// assert_eq!(graph.connect(b.input(0), a.output(0)), Ok(false));
    /// assert!(matches!(
    ///     graph.connect(a.output(0), c.input(0)),
    ///     Err(ConnectError::AlreadyConnected { .. })
    /// ));
    /// ```
    pub fn connect<D: PortDirection>(
        &mut self,
        port: PortRef<D>,
        opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        let fresh = self.endpoint(port)?.check_link(port, opposite)?;
        let fresh_opposite = self.endpoint(opposite)?.check_link(opposite, port)?;

        if fresh != fresh_opposite {
            warn!(port = %port, opposite = %opposite, "graph.connect.inconsistent");
            return Err(ConnectError::InconsistentConnection {
                port: port.into(),
                opposite: opposite.into(),
            });
        }
        if !fresh {
            return Ok(false);
        }

        self.endpoint_mut(port)?.link(opposite);
        self.endpoint_mut(opposite)?.link(port);
        trace!(graph = %self.id, port = %port, opposite = %opposite, "graph.connect");
        Ok(true)
    }

    /// Connect output `output` of `upstream` to input `input` of `downstream`.
    pub fn link(
        &mut self,
        upstream: NodeIndex,
        output: usize,
        downstream: NodeIndex,
        input: usize,
    ) -> Result<bool, ConnectError> {
        self.connect(upstream.output(output), downstream.input(input))
    }

    /// Remove one connection between two ports.
    ///
    /// Returns `Ok(false)` if the ports were not connected.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::UnknownNode`] and [`ConnectError::UnknownPort`] if
    ///   either address does not name a port of this graph.
    /// - [`ConnectError::InconsistentConnection`] if a single-opposite port is
    ///   connected to a port other than `opposite`, or if only one side
    ///   records the connection.
    pub fn disconnect<D: PortDirection>(
        &mut self,
        port: PortRef<D>,
        opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        let linked = self.endpoint(port)?.check_unlink(port, opposite)?;
        let linked_opposite = self.endpoint(opposite)?.opposites().contains(&port);

        if linked != linked_opposite {
            warn!(port = %port, opposite = %opposite, "graph.disconnect.inconsistent");
            return Err(ConnectError::InconsistentConnection {
                port: port.into(),
                opposite: opposite.into(),
            });
        }
        if !linked {
            return Ok(false);
        }

        self.endpoint_mut(port)?.unlink(opposite);
        self.endpoint_mut(opposite)?.unlink(port);
        trace!(graph = %self.id, port = %port, opposite = %opposite, "graph.disconnect");
        Ok(true)
    }

    /// Remove all connections of a port. Returns how many there were.
    ///
    /// # Errors
    ///
    /// Fails on unknown addresses, and with
    /// [`ConnectError::InconsistentConnection`] if an opposite did not record
    /// the connection. The port is disconnected in either case.
    pub fn disconnect_all<D: PortDirection>(
        &mut self,
        port: PortRef<D>,
    ) -> Result<usize, ConnectError> {
        let opposites = self.endpoint_mut(port)?.take_links();
        let mut inconsistent = None;

        for &opposite in &opposites {
            let unlinked = match self.endpoint_mut(opposite) {
                Ok(endpoint) => endpoint.unlink(port),
                Err(_) => false,
            };
            if !unlinked && inconsistent.is_none() {
                inconsistent = Some(opposite);
            }
        }

        match inconsistent {
            Some(opposite) => {
                warn!(port = %port, opposite = %opposite, "graph.disconnect.inconsistent");
                Err(ConnectError::InconsistentConnection {
                    port: port.into(),
                    opposite: opposite.into(),
                })
            }
            None => Ok(opposites.len()),
        }
    }

    /// Remove the connections of vertex `id` to every vertex for which `keep`
    /// returns false. Inconsistencies are logged and skipped.
    pub(crate) fn sever_where(&mut self, id: NodeIndex, keep: impl Fn(NodeIndex) -> bool) {
        let Some(vertex) = self.nodes.get(&id) else {
            return;
        };

        let mut inputs: Vec<(PortRef<Input>, PortRef<Output>)> = Vec::new();
        for (offset, port) in vertex.input_ports().iter().enumerate() {
            for &opposite in port.opposites() {
                if !keep(opposite.node()) {
                    inputs.push((id.input(offset), opposite));
                }
            }
        }

        let mut outputs: Vec<(PortRef<Output>, PortRef<Input>)> = Vec::new();
        for (offset, port) in vertex.output_ports().iter().enumerate() {
            for &opposite in port.opposites() {
                if !keep(opposite.node()) {
                    outputs.push((id.output(offset), opposite));
                }
            }
        }

        for (port, opposite) in inputs {
            if let Err(err) = self.disconnect(port, opposite) {
                warn!(error = %err, "graph.sever.error");
            }
        }
        for (port, opposite) in outputs {
            if let Err(err) = self.disconnect(port, opposite) {
                warn!(error = %err, "graph.sever.error");
            }
        }
    }

    /// The distinct vertices connected to the ports of `node` in `direction`,
    /// in port order.
    ///
    /// Upstream neighbours are found through [`Direction::Incoming`], downstream
    /// neighbours through [`Direction::Outgoing`]. Returns nothing for an
    /// unknown vertex.
    pub fn neighbours(
        &self,
        node: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = NodeIndex> {
        let mut owners = Vec::new();
        if let Some(vertex) = self.nodes.get(&node) {
            match direction {
                Direction::Incoming => {
                    collect_owners::<Input, _>(vertex.input_ports(), &mut owners)
                }
                Direction::Outgoing => {
                    collect_owners::<Output, _>(vertex.output_ports(), &mut owners)
                }
            }
        }
        owners.into_iter()
    }

    /// Whether any port of `node` in `direction` is connected.
    pub fn is_connected(&self, node: NodeIndex, direction: Direction) -> bool {
        let Some(vertex) = self.nodes.get(&node) else {
            return false;
        };
        match direction {
            Direction::Incoming => vertex.input_ports().iter().any(|p| p.is_connected()),
            Direction::Outgoing => vertex.output_ports().iter().any(|p| p.is_connected()),
        }
    }

    /// Rename the opposites of vertex `id` through `map`, dropping those whose
    /// vertex is not mapped.
    pub(crate) fn relink(&mut self, id: NodeIndex, map: &NodeMap) {
        let Some(vertex) = self.nodes.get_mut(&id) else {
            return;
        };
        for port in vertex.input_ports_mut() {
            port.relink(map);
        }
        for port in vertex.output_ports_mut() {
            port.relink(map);
        }
    }
}

fn collect_owners<D: PortDirection, E: Endpoint<D>>(ports: &[E], owners: &mut Vec<NodeIndex>) {
    for port in ports {
        for opposite in port.opposites() {
            if !owners.contains(&opposite.node()) {
                owners.push(opposite.node());
            }
        }
    }
}

/// A connection, from the output port to the input port.
type Link = (PortRef<Output>, PortRef<Input>);

/// The connections of vertex `id`, through its inputs and through its
/// outputs. Self loops show up in both.
fn links_of<T: GraphElement>(id: NodeIndex, vertex: &T) -> (Vec<Link>, Vec<Link>) {
    let mut inbound = Vec::new();
    for (offset, port) in vertex.input_ports().iter().enumerate() {
        for &opposite in port.opposites() {
            inbound.push((opposite, id.input(offset)));
        }
    }
    let mut outbound = Vec::new();
    for (offset, port) in vertex.output_ports().iter().enumerate() {
        for &opposite in port.opposites() {
            outbound.push((id.output(offset), opposite));
        }
    }
    (inbound, outbound)
}

/// Removes one occurrence of `link`, returning whether there was one.
fn take_link(links: &mut Vec<Link>, link: Link) -> bool {
    match links.iter().position(|l| *l == link) {
        Some(position) => {
            links.swap_remove(position);
            true
        }
        None => false,
    }
}

fn clear_links<T: GraphElement>(vertex: &mut T) {
    for port in vertex.input_ports_mut() {
        port.take_links();
    }
    for port in vertex.output_ports_mut() {
        port.take_links();
    }
}

/// Clones keep the identifiers and connections of the original but are a
/// different graph.
impl<T: GraphElement + Clone> Clone for Graph<T> {
    fn clone(&self) -> Self {
        let mut graph = Self {
            id: GraphId::fresh(),
            nodes: BTreeMap::new(),
            next: self.next,
        };

        for (&id, vertex) in &self.nodes {
            let mut copy = vertex.clone();
            clear_links(&mut copy);
            copy.on_join(Some(Membership::new(graph.id, id)));
            graph.nodes.insert(id, copy);
        }

        let identity = self.nodes.keys().map(|&id| (id, id)).collect();
        if let Err(err) = merge::replicate_links(self, &mut graph, &identity) {
            warn!(error = %err, "graph.clone.inconsistent");
        }
        graph
    }
}

impl<T: PartialEq> PartialEq for Graph<T> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<T: Eq> Eq for Graph<T> {}

impl<T: Debug> Debug for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<T: GraphElement + fmt::Display> fmt::Display for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph {} ({} vertices)", self.id, self.nodes.len())?;
        for (&id, vertex) in &self.nodes {
            writeln!(f, "  {id}: {vertex}")?;
            for (offset, port) in vertex.output_ports().iter().enumerate() {
                for opposite in port.opposites() {
                    writeln!(f, "    {} -> {opposite}", id.output(offset))?;
                }
            }
        }
        Ok(())
    }
}

impl<T> Index<NodeIndex> for Graph<T> {
    type Output = T;

    fn index(&self, id: NodeIndex) -> &Self::Output {
        self.find(id).expect("invalid vertex id")
    }
}

impl<'a, T> IntoIterator for &'a Graph<T> {
    type Item = (NodeIndex, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming iteration releases every vertex as an orphan, without
/// connections.
impl<T: GraphElement> IntoIterator for Graph<T> {
    type Item = (NodeIndex, T);
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        for (_, vertex) in self.nodes.iter_mut() {
            clear_links(vertex);
            vertex.on_leave();
        }
        IntoIter::new(std::mem::take(&mut self.nodes).into_iter())
    }
}
