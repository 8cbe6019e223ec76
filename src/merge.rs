//! Moving and copying vertices between graphs.
//!
//! Every operation here builds a [`NodeMap`] from source identifiers to
//! destination identifiers and uses it to carry connections over. A
//! connection survives only if both of its vertices end up in the
//! destination; connections crossing the boundary are dropped silently.
use std::collections::BTreeSet;

use tracing::debug;

use crate::element::GraphElement;
use crate::graph::{Graph, GraphError};
use crate::index::{NodeIndex, NodeMap};
use crate::port::{ConnectError, Endpoint};

/// Connect the vertices of `dest` the way their counterparts in `source` are
/// connected.
///
/// Inputs are walked in port order; for every opposite whose vertex is in
/// `map`, the corresponding input of the mapped vertex is connected to the
/// output with the same offset on the mapped opposite. Opposites outside of
/// `map` are skipped.
pub(crate) fn replicate_links<T: GraphElement>(
    source: &Graph<T>,
    dest: &mut Graph<T>,
    map: &NodeMap,
) -> Result<(), ConnectError> {
    for (id, vertex) in source {
        let Some(&target) = map.get(&id) else {
            continue;
        };
        for (offset, port) in vertex.input_ports().iter().enumerate() {
            for opposite in port.opposites() {
                if let Some(&upstream) = map.get(&opposite.node()) {
                    dest.connect(target.input(offset), upstream.output(opposite.offset()))?;
                }
            }
        }
    }
    Ok(())
}

/// Insert a copy of every vertex of `source` into `dest`, keeping the
/// connections among them.
///
/// `source` is left untouched. Returns the identifiers the copies received.
///
/// # Example
///
/// ```
/// # use plangraph::{merge, Direction, Graph, Node};
/// let mut source = Graph::new();
/// let a = source.insert(Node::new('a', 0, 1)).unwrap();
/// let b = source.insert(Node::new('b', 1, 0)).unwrap();
/// let c = source.insert(Node::new('c', 0, 0)).unwrap();
/// source.connect(a.output(0), b.input(0)).unwrap();
///
/// let mut dest = Graph::new();
/// dest.insert(Node::new('z', 0, 0)).unwrap();
/// let map = merge::copy_into(&source, &mut dest).unwrap();
///
/// assert_eq!(dest.len(), 4);
/// assert_eq!(source.len(), 3);
/// assert_eq!(dest.opposites(map[&a].output(0)).unwrap(), [map[&b].input(0)]);
/// assert!(!dest.is_connected(map[&c], Direction::Incoming));
/// ```
pub fn copy_into<T>(source: &Graph<T>, dest: &mut Graph<T>) -> Result<NodeMap, GraphError>
where
    T: GraphElement + Clone,
{
    let mut map = NodeMap::new();
    for (id, vertex) in source {
        let copy = dest.insert_cloned(vertex)?;
        map.insert(id, copy);
    }
    replicate_links(source, dest, &map)?;

    debug!(
        source = %source.id(),
        dest = %dest.id(),
        vertices = map.len(),
        "graph.merge.copy"
    );
    Ok(map)
}

/// Move every vertex of `source` into `dest`, keeping the connections among
/// them.
///
/// The vertices are not copied: each one leaves `source`, joins `dest` under a
/// new identifier and has its links renamed through the returned map.
/// `source` is left empty; its identifier counter is not reset.
pub fn move_into<T: GraphElement>(
    source: &mut Graph<T>,
    dest: &mut Graph<T>,
) -> Result<NodeMap, GraphError> {
    let mut map = NodeMap::new();
    for (id, mut vertex) in source.take_nodes() {
        vertex.on_leave();
        let target = dest.bind(vertex)?;
        map.insert(id, target);
    }
    for &target in map.values() {
        dest.relink(target, &map);
    }

    debug!(
        source = %source.id(),
        dest = %dest.id(),
        vertices = map.len(),
        "graph.merge.move"
    );
    Ok(map)
}

/// Move the vertices `subset` of `source` into `dest`.
///
/// Connections among the moved vertices are kept. Connections between a moved
/// vertex and one that stays behind are removed on both sides. Repeated
/// identifiers in `subset` are ignored.
///
/// # Errors
///
/// Returns [`GraphError::MigrationTargetNotInSource`] if an identifier in
/// `subset` is not in `source`. Neither graph is modified in that case.
pub fn release_into<T: GraphElement>(
    source: &mut Graph<T>,
    subset: impl IntoIterator<Item = NodeIndex>,
    dest: &mut Graph<T>,
) -> Result<NodeMap, GraphError> {
    let subset: BTreeSet<NodeIndex> = subset.into_iter().collect();
    if let Some(&missing) = subset.iter().find(|id| !source.contains(**id)) {
        return Err(GraphError::MigrationTargetNotInSource(missing));
    }

    for &id in &subset {
        source.sever_where(id, |node| subset.contains(&node));
    }

    let mut map = NodeMap::new();
    for &id in &subset {
        let Some(vertex) = source.unbind(id) else {
            continue;
        };
        let target = dest.bind(vertex)?;
        map.insert(id, target);
    }
    for &target in map.values() {
        dest.relink(target, &map);
    }

    debug!(
        source = %source.id(),
        dest = %dest.id(),
        vertices = map.len(),
        "graph.release"
    );
    Ok(map)
}

/// Move the vertices `subset` of `source` into a new graph.
///
/// See [`release_into`].
///
/// # Example
///
/// ```
/// # use plangraph::{merge, Direction, Graph, GraphError, Node};
/// let mut source = Graph::new();
/// let a = source.insert(Node::new('a', 0, 1)).unwrap();
/// let b = source.insert(Node::new('b', 1, 0)).unwrap();
/// source.connect(a.output(0), b.input(0)).unwrap();
///
/// let released = merge::release(&mut source, [a]).unwrap();
/// assert_eq!(released.len(), 1);
/// assert!(!source.contains(a));
/// assert!(!source.is_connected(b, Direction::Incoming));
///
/// assert_eq!(
///     merge::release(&mut source, [a]).unwrap_err(),
///     GraphError::MigrationTargetNotInSource(a)
/// );
/// ```
pub fn release<T: GraphElement>(
    source: &mut Graph<T>,
    subset: impl IntoIterator<Item = NodeIndex>,
) -> Result<Graph<T>, GraphError> {
    let mut dest = Graph::new();
    release_into(source, subset, &mut dest)?;
    Ok(dest)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::Node;
    use crate::port::Direction;
    use rstest::{fixture, rstest};

    struct Abc {
        graph: Graph<Node<char>>,
        a: NodeIndex,
        b: NodeIndex,
        c: NodeIndex,
    }

    /// `{A -> B, C}`
    #[fixture]
    fn abc() -> Abc {
        let mut graph = Graph::new();
        let a = graph.insert(Node::new('a', 0, 1)).unwrap();
        let b = graph.insert(Node::new('b', 1, 0)).unwrap();
        let c = graph.insert(Node::new('c', 1, 1)).unwrap();
        graph.connect(a.output(0), b.input(0)).unwrap();
        Abc { graph, a, b, c }
    }

    #[rstest]
    fn copy_keeps_inner_edges(abc: Abc) {
        let mut dest = Graph::new();
        let map = copy_into(&abc.graph, &mut dest).unwrap();

        assert_eq!(dest.len(), 3);
        assert_eq!(
            dest.opposites(map[&abc.a].output(0)).unwrap(),
            [map[&abc.b].input(0)]
        );
        assert!(!dest.is_connected(map[&abc.c], Direction::Incoming));
        assert!(!dest.is_connected(map[&abc.c], Direction::Outgoing));
        for (_, vertex) in &dest {
            assert_eq!(vertex.optional_owner(), Some(dest.id()));
        }

        // source untouched
        assert_eq!(abc.graph.opposites(abc.a.output(0)).unwrap(), [abc.b.input(0)]);
        assert_eq!(abc.graph[abc.a].optional_owner(), Some(abc.graph.id()));
    }

    #[rstest]
    fn move_empties_source(abc: Abc) {
        let mut source = abc.graph;
        let mut dest = Graph::new();
        let existing = dest.insert(Node::new('z', 0, 0)).unwrap();

        let map = move_into(&mut source, &mut dest).unwrap();
        assert!(source.is_empty());
        assert_eq!(dest.len(), 4);
        assert!(map.values().all(|id| *id > existing));
        assert_eq!(
            dest.opposites(map[&abc.b].input(0)).unwrap(),
            [map[&abc.a].output(0)]
        );
        assert_eq!(dest[map[&abc.c]].optional_owner(), Some(dest.id()));

        let next = source.insert(Node::new('n', 0, 0)).unwrap();
        assert!(next > abc.c);
    }

    #[rstest]
    fn release_severs_boundary(abc: Abc) {
        let mut source = abc.graph;
        let released = release(&mut source, [abc.a]).unwrap();

        assert_eq!(source.len(), 2);
        assert!(!source.is_connected(abc.b, Direction::Incoming));

        let (id, vertex) = released.iter().next().unwrap();
        assert_eq!(*vertex.weight(), 'a');
        assert_eq!(vertex.optional_owner(), Some(released.id()));
        assert!(!released.is_connected(id, Direction::Outgoing));
    }

    #[rstest]
    fn release_keeps_inner_edges(abc: Abc) {
        let mut source = abc.graph;
        let mut dest = Graph::new();

        let map = release_into(&mut source, [abc.a, abc.b, abc.a], &mut dest).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            dest.opposites(map[&abc.a].output(0)).unwrap(),
            [map[&abc.b].input(0)]
        );
        assert_eq!(source.node_indices().collect::<Vec<_>>(), [abc.c]);
    }

    #[rstest]
    fn release_checks_before_mutating(abc: Abc) {
        let mut source = abc.graph;
        let missing = NodeIndex::new(77).unwrap();

        let err = release(&mut source, [abc.a, missing]).unwrap_err();
        assert_eq!(err, GraphError::MigrationTargetNotInSource(missing));
        assert_eq!(source.len(), 3);
        assert_eq!(source.opposites(abc.a.output(0)).unwrap(), [abc.b.input(0)]);
    }

    #[test]
    fn multiport_parallel_edges_survive() {
        let mut source = Graph::new();
        let a = source.insert(Node::multi('a', 0, 1)).unwrap();
        let b = source.insert(Node::multi('b', 1, 0)).unwrap();
        source.connect(a.output(0), b.input(0)).unwrap();
        source.connect(a.output(0), b.input(0)).unwrap();

        let mut copy = Graph::new();
        let map = copy_into(&source, &mut copy).unwrap();
        assert_eq!(copy[map[&b]].input_ports()[0].count(map[&a].output(0)), 2);

        let mut moved = Graph::new();
        let map = move_into(&mut source, &mut moved).unwrap();
        assert_eq!(moved[map[&a]].output_ports()[0].count(map[&b].input(0)), 2);
    }
}
