//! Connection points of graph vertices.
//!
//! Every vertex owns an ordered list of input ports and an ordered list of
//! output ports. An input port can only be connected to output ports and vice
//! versa. Two flavors exist:
//!
//!  - [`Port`] has at most one opposite.
//!  - [`Multiport`] keeps a list of opposites and admits parallel edges.
//!
//! Ports never refer to their opposites by memory location. An opposite is
//! recorded as a [`PortRef`], the identifier of the owning vertex together with
//! the offset of the port within that vertex. Both sides of a connection always
//! record each other; the only way to change connections is through the
//! [`Graph`] that owns the vertices, see [`Graph::connect`].
//!
//! [`Graph`]: crate::Graph
//! [`Graph::connect`]: crate::Graph::connect
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use thiserror::Error;

use crate::element::GraphElement;
use crate::index::NodeIndex;

mod multi;
mod single;

pub use multi::Multiport;
pub use single::Port;

/// Single-opposite input port.
pub type InputPort = Port<Input>;
/// Single-opposite output port.
pub type OutputPort = Port<Output>;
/// Multi-opposite input port.
pub type InputMultiport = Multiport<Input>;
/// Multi-opposite output port.
pub type OutputMultiport = Multiport<Output>;

/// Direction of a port, seen from the vertex that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Input ports, connected to upstream vertices.
    Incoming,
    /// Output ports, connected to downstream vertices.
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => f.write_str("input"),
            Direction::Outgoing => f.write_str("output"),
        }
    }
}

/// Type-level port direction: either [`Input`] or [`Output`].
pub trait PortDirection:
    sealed::Sealed + Copy + Eq + Ord + Hash + fmt::Debug + Default + Send + Sync + 'static
{
    /// The direction of the ports this one connects to.
    type Opposite: PortDirection<Opposite = Self>;

    /// The runtime value of this direction.
    const DIRECTION: Direction;

    /// The ports of `vertex` in this direction.
    fn ports<T: GraphElement>(vertex: &T) -> &[EndpointOf<T, Self>];

    /// The ports of `vertex` in this direction, mutably.
    fn ports_mut<T: GraphElement>(vertex: &mut T) -> &mut [EndpointOf<T, Self>];
}

/// Marker for input ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input;

/// Marker for output ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Output;

impl sealed::Sealed for Input {}
impl sealed::Sealed for Output {}

impl PortDirection for Input {
    type Opposite = Output;
    const DIRECTION: Direction = Direction::Incoming;

    #[inline]
    fn ports<T: GraphElement>(vertex: &T) -> &[EndpointOf<T, Self>] {
        vertex.input_ports()
    }

    #[inline]
    fn ports_mut<T: GraphElement>(vertex: &mut T) -> &mut [EndpointOf<T, Self>] {
        vertex.input_ports_mut()
    }
}

impl PortDirection for Output {
    type Opposite = Input;
    const DIRECTION: Direction = Direction::Outgoing;

    #[inline]
    fn ports<T: GraphElement>(vertex: &T) -> &[EndpointOf<T, Self>] {
        vertex.output_ports()
    }

    #[inline]
    fn ports_mut<T: GraphElement>(vertex: &mut T) -> &mut [EndpointOf<T, Self>] {
        vertex.output_ports_mut()
    }
}

/// Address of a port: the vertex that owns it and its offset among the
/// vertex's ports of direction `D`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRef<D> {
    node: NodeIndex,
    offset: usize,
    direction: PhantomData<D>,
}

impl<D: PortDirection> PortRef<D> {
    #[inline]
    pub fn new(node: NodeIndex, offset: usize) -> Self {
        Self {
            node,
            offset,
            direction: PhantomData,
        }
    }

    /// The vertex that owns the port.
    #[inline]
    pub fn node(self) -> NodeIndex {
        self.node
    }

    /// The position of the port within its vertex.
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }

    /// The same port on another vertex.
    #[inline]
    pub(crate) fn with_node(self, node: NodeIndex) -> Self {
        Self::new(node, self.offset)
    }
}

impl<D: PortDirection> fmt::Debug for PortRef<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortRef({self})")
    }
}

impl<D: PortDirection> fmt::Display for PortRef<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.node, D::DIRECTION, self.offset)
    }
}

/// Address of a port with the direction known only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortAddress {
    pub node: NodeIndex,
    pub direction: Direction,
    pub offset: usize,
}

impl<D: PortDirection> From<PortRef<D>> for PortAddress {
    fn from(port: PortRef<D>) -> Self {
        Self {
            node: port.node,
            direction: D::DIRECTION,
            offset: port.offset,
        }
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.node, self.direction, self.offset)
    }
}

/// Common interface of [`Port`] and [`Multiport`].
pub trait Endpoint<D: PortDirection>:
    sealed::Wiring<D> + Clone + fmt::Debug + PartialEq + Eq
{
    /// Creates an unconnected port at position `offset` of its vertex.
    fn new(offset: usize) -> Self;

    /// The position of the port within its vertex.
    fn offset(&self) -> usize;

    /// The ports on the other end of this port's connections.
    fn opposites(&self) -> &[PortRef<D::Opposite>];

    #[inline]
    fn is_connected(&self) -> bool {
        !self.opposites().is_empty()
    }
}

/// Selects the port type used by a vertex type.
pub trait PortFlavor: sealed::Sealed + 'static {
    type Endpoint<D: PortDirection>: Endpoint<D>;
}

/// Vertices whose ports have at most one opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Single {}

/// Vertices whose ports can have any number of opposites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multi {}

impl sealed::Sealed for Single {}
impl sealed::Sealed for Multi {}

impl PortFlavor for Single {
    type Endpoint<D: PortDirection> = Port<D>;
}

impl PortFlavor for Multi {
    type Endpoint<D: PortDirection> = Multiport<D>;
}

/// The port type of vertex type `T` in direction `D`.
pub type EndpointOf<T, D> = <<T as GraphElement>::Flavor as PortFlavor>::Endpoint<D>;

/// Error returned by [`Graph::connect`] and the other port operations.
///
/// [`Graph::connect`]: crate::Graph::connect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("unknown node {0}")]
    UnknownNode(NodeIndex),
    #[error("unknown port {0}")]
    UnknownPort(PortAddress),
    #[error("port {port} is already connected to {current}")]
    AlreadyConnected {
        port: PortAddress,
        current: PortAddress,
    },
    #[error("inconsistent connection between {port} and {opposite}")]
    InconsistentConnection {
        port: PortAddress,
        opposite: PortAddress,
    },
}

pub(crate) mod sealed {
    use super::{ConnectError, PortDirection, PortRef};
    use crate::index::NodeMap;

    pub trait Sealed {}

    /// Mutation hooks of a port. Only the owning graph drives these, and it
    /// always updates both sides of a connection.
    pub trait Wiring<D: PortDirection> {
        /// Whether a connection to `opposite` would be new.
        ///
        /// Returns `Ok(false)` when the port is already connected to exactly
        /// `opposite` and cannot take another connection to it.
        fn check_link(
            &self,
            this: PortRef<D>,
            opposite: PortRef<D::Opposite>,
        ) -> Result<bool, ConnectError>;

        /// Whether the port is currently connected to `opposite`.
        fn check_unlink(
            &self,
            this: PortRef<D>,
            opposite: PortRef<D::Opposite>,
        ) -> Result<bool, ConnectError>;

        fn link(&mut self, opposite: PortRef<D::Opposite>);

        /// Removes one connection to `opposite`. Returns whether one existed.
        fn unlink(&mut self, opposite: PortRef<D::Opposite>) -> bool;

        /// Removes all connections, returning the former opposites.
        fn take_links(&mut self) -> Vec<PortRef<D::Opposite>>;

        /// Renames the vertices of all opposites through `map`. Opposites
        /// whose vertex is not in the map are dropped.
        fn relink(&mut self, map: &NodeMap);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn addresses_keep_their_direction() {
        let node = NodeIndex::new(4).unwrap();
        let input = PortAddress::from(node.input(1));
        let output = PortAddress::from(node.output(0));

        assert_eq!(input.direction, Input::DIRECTION);
        assert_eq!(output.direction, Direction::Outgoing);
        assert_eq!(input.to_string(), "n4.input[1]");
        assert_eq!(output.to_string(), node.output(0).to_string());
    }
}
