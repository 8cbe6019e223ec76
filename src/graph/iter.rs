use std::collections::btree_map;
use std::iter::FusedIterator;

use crate::index::NodeIndex;

/// Iterator created by [Graph::iter](crate::Graph::iter).
#[derive(Clone)]
pub struct Iter<'a, T> {
    inner: btree_map::Iter<'a, NodeIndex, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(inner: btree_map::Iter<'a, NodeIndex, T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeIndex, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&id, vertex)| (id, vertex))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(&id, vertex)| (id, vertex))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// Iterator created by [Graph::node_indices](crate::Graph::node_indices).
#[derive(Clone)]
pub struct NodeIndices<'a, T> {
    inner: btree_map::Keys<'a, NodeIndex, T>,
}

impl<'a, T> NodeIndices<'a, T> {
    pub(super) fn new(inner: btree_map::Keys<'a, NodeIndex, T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> Iterator for NodeIndices<'a, T> {
    type Item = NodeIndex;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for NodeIndices<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().copied()
    }
}

impl<'a, T> ExactSizeIterator for NodeIndices<'a, T> {}
impl<'a, T> FusedIterator for NodeIndices<'a, T> {}

/// Iterator created by consuming a [Graph](crate::Graph). Yields orphans.
pub struct IntoIter<T> {
    inner: btree_map::IntoIter<NodeIndex, T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(inner: btree_map::IntoIter<NodeIndex, T>) -> Self {
        Self { inner }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = (NodeIndex, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod test {
    use crate::{Graph, Node};

    #[test]
    fn iterators_agree() {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..4)
            .map(|i| graph.insert(Node::new(i, 0, 0)).unwrap())
            .collect();
        graph.erase(ids[1]);

        assert_eq!(graph.iter().len(), 3);
        assert_eq!(
            graph.node_indices().rev().collect::<Vec<_>>(),
            [ids[3], ids[2], ids[0]]
        );
        graph.modify_each(|_, vertex| *vertex.weight_mut() *= 10);
        let weights: Vec<i32> = graph.iter().map(|(_, v)| *v.weight()).collect();
        assert_eq!(weights, [0, 20, 30]);
    }
}
