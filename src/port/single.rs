use std::fmt;

use super::{sealed, ConnectError, Endpoint, PortDirection, PortRef};
use crate::index::NodeMap;

/// A port with at most one opposite.
///
/// Connecting a port that is already connected to a different port is an
/// error; connecting it again to its current opposite does nothing.
#[derive(PartialEq, Eq)]
pub struct Port<D: PortDirection> {
    offset: usize,
    opposite: Option<PortRef<D::Opposite>>,
}

impl<D: PortDirection> Port<D> {
    /// Creates an unconnected port at position `offset` of its vertex.
    #[inline]
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            opposite: None,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The port on the other end of the connection, if any.
    #[inline]
    pub fn opposite(&self) -> Option<PortRef<D::Opposite>> {
        self.opposite
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.opposite.is_some()
    }
}

/// Copies start out unconnected.
impl<D: PortDirection> Clone for Port<D> {
    fn clone(&self) -> Self {
        Self::new(self.offset)
    }
}

impl<D: PortDirection> fmt::Debug for Port<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("direction", &D::DIRECTION)
            .field("offset", &self.offset)
            .field("opposite", &self.opposite)
            .finish()
    }
}

impl<D: PortDirection> fmt::Display for Port<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", D::DIRECTION, self.offset)?;
        match self.opposite {
            Some(opposite) => write!(f, " -> {opposite}"),
            None => Ok(()),
        }
    }
}

impl<D: PortDirection> Endpoint<D> for Port<D> {
    #[inline]
    fn new(offset: usize) -> Self {
        Port::new(offset)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn opposites(&self) -> &[PortRef<D::Opposite>] {
        self.opposite.as_slice()
    }
}

impl<D: PortDirection> sealed::Wiring<D> for Port<D> {
    fn check_link(
        &self,
        this: PortRef<D>,
        opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        match self.opposite {
            None => Ok(true),
            Some(current) if current == opposite => Ok(false),
            Some(current) => Err(ConnectError::AlreadyConnected {
                port: this.into(),
                current: current.into(),
            }),
        }
    }

    fn check_unlink(
        &self,
        this: PortRef<D>,
        opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        match self.opposite {
            None => Ok(false),
            Some(current) if current == opposite => Ok(true),
            Some(_) => Err(ConnectError::InconsistentConnection {
                port: this.into(),
                opposite: opposite.into(),
            }),
        }
    }

    #[inline]
    fn link(&mut self, opposite: PortRef<D::Opposite>) {
        self.opposite = Some(opposite);
    }

    fn unlink(&mut self, opposite: PortRef<D::Opposite>) -> bool {
        if self.opposite == Some(opposite) {
            self.opposite = None;
            true
        } else {
            false
        }
    }

    fn take_links(&mut self) -> Vec<PortRef<D::Opposite>> {
        self.opposite.take().into_iter().collect()
    }

    fn relink(&mut self, map: &NodeMap) {
        self.opposite = self
            .opposite
            .and_then(|port| map.get(&port.node()).map(|&node| port.with_node(node)));
    }
}
