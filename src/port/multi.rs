use std::fmt;

use super::{sealed, ConnectError, Endpoint, PortDirection, PortRef};
use crate::index::NodeMap;

/// A port with any number of opposites.
///
/// The same opposite may appear several times, one entry per parallel edge.
#[derive(PartialEq, Eq)]
pub struct Multiport<D: PortDirection> {
    offset: usize,
    opposites: Vec<PortRef<D::Opposite>>,
}

impl<D: PortDirection> Multiport<D> {
    /// Creates an unconnected port at position `offset` of its vertex.
    #[inline]
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            opposites: Vec::new(),
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The ports on the other end of the connections, in connection order.
    #[inline]
    pub fn opposites(&self) -> &[PortRef<D::Opposite>] {
        &self.opposites
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.opposites.is_empty()
    }

    /// Number of connections to `opposite`.
    pub fn count(&self, opposite: PortRef<D::Opposite>) -> usize {
        self.opposites.iter().filter(|port| **port == opposite).count()
    }
}

/// Copies start out unconnected.
impl<D: PortDirection> Clone for Multiport<D> {
    fn clone(&self) -> Self {
        Self::new(self.offset)
    }
}

impl<D: PortDirection> fmt::Debug for Multiport<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiport")
            .field("direction", &D::DIRECTION)
            .field("offset", &self.offset)
            .field("opposites", &self.opposites)
            .finish()
    }
}

impl<D: PortDirection> fmt::Display for Multiport<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", D::DIRECTION, self.offset)?;
        for (i, opposite) in self.opposites.iter().enumerate() {
            let sep = if i == 0 { " -> " } else { ", " };
            write!(f, "{sep}{opposite}")?;
        }
        Ok(())
    }
}

impl<D: PortDirection> Endpoint<D> for Multiport<D> {
    #[inline]
    fn new(offset: usize) -> Self {
        Multiport::new(offset)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn opposites(&self) -> &[PortRef<D::Opposite>] {
        &self.opposites
    }
}

impl<D: PortDirection> sealed::Wiring<D> for Multiport<D> {
    #[inline]
    fn check_link(
        &self,
        _this: PortRef<D>,
        _opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        Ok(true)
    }

    #[inline]
    fn check_unlink(
        &self,
        _this: PortRef<D>,
        opposite: PortRef<D::Opposite>,
    ) -> Result<bool, ConnectError> {
        Ok(self.opposites.contains(&opposite))
    }

    #[inline]
    fn link(&mut self, opposite: PortRef<D::Opposite>) {
        self.opposites.push(opposite);
    }

    fn unlink(&mut self, opposite: PortRef<D::Opposite>) -> bool {
        match self.opposites.iter().position(|port| *port == opposite) {
            Some(position) => {
                self.opposites.remove(position);
                true
            }
            None => false,
        }
    }

    fn take_links(&mut self) -> Vec<PortRef<D::Opposite>> {
        std::mem::take(&mut self.opposites)
    }

    fn relink(&mut self, map: &NodeMap) {
        self.opposites = self
            .opposites
            .iter()
            .filter_map(|port| map.get(&port.node()).map(|&node| port.with_node(node)))
            .collect();
    }
}
