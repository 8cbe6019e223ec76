//! Walking the connections of a graph.
//!
//! Upstream means against the direction of the edges, through input ports;
//! downstream means along them, through output ports.
//!
//! The sorts are best effort on graphs with cycles: every vertex is still
//! visited exactly once, but the order among the vertices of a cycle is left
//! unspecified. A cycle is not an error.
use bitvec::prelude::*;
use tracing::debug;

use crate::element::GraphElement;
use crate::graph::Graph;
use crate::index::NodeIndex;
use crate::port::Direction;

/// The vertices without any connected input port.
pub fn enumerate_top<T: GraphElement>(
    graph: &Graph<T>,
) -> impl Iterator<Item = NodeIndex> + '_ {
    graph
        .node_indices()
        .filter(|&id| !graph.is_connected(id, Direction::Incoming))
}

/// The vertices without any connected output port.
pub fn enumerate_bottom<T: GraphElement>(
    graph: &Graph<T>,
) -> impl Iterator<Item = NodeIndex> + '_ {
    graph
        .node_indices()
        .filter(|&id| !graph.is_connected(id, Direction::Outgoing))
}

/// The distinct vertices connected to the inputs of `node`.
pub fn enumerate_upstream<T: GraphElement>(
    graph: &Graph<T>,
    node: NodeIndex,
) -> impl Iterator<Item = NodeIndex> {
    graph.neighbours(node, Direction::Incoming)
}

/// The distinct vertices connected to the outputs of `node`.
pub fn enumerate_downstream<T: GraphElement>(
    graph: &Graph<T>,
    node: NodeIndex,
) -> impl Iterator<Item = NodeIndex> {
    graph.neighbours(node, Direction::Outgoing)
}

/// All vertices, each after every vertex upstream of it.
///
/// # Example
///
/// ```
/// # use plangraph::{traverse, Graph, Node};
/// let mut graph = Graph::new();
/// let emit = graph.insert(Node::new("emit", 1, 0)).unwrap();
/// let filter = graph.insert(Node::new("filter", 1, 1)).unwrap();
/// let scan = graph.insert(Node::new("scan", 0, 1)).unwrap();
/// graph.link(scan, 0, filter, 0).unwrap();
/// graph.link(filter, 0, emit, 0).unwrap();
///
/// assert_eq!(traverse::sort_from_upstream(&graph), [scan, filter, emit]);
/// assert_eq!(traverse::sort_from_downstream(&graph), [emit, filter, scan]);
/// ```
pub fn sort_from_upstream<T: GraphElement>(graph: &Graph<T>) -> Vec<NodeIndex> {
    let mut order = Vec::with_capacity(graph.len());
    sort(graph, Direction::Incoming, |id| order.push(id));
    order
}

/// All vertices, each after every vertex downstream of it.
pub fn sort_from_downstream<T: GraphElement>(graph: &Graph<T>) -> Vec<NodeIndex> {
    let mut order = Vec::with_capacity(graph.len());
    sort(graph, Direction::Outgoing, |id| order.push(id));
    order
}

/// Call `f` on every vertex in the order of [`sort_from_upstream`].
pub fn for_each_from_upstream<T, F>(graph: &Graph<T>, mut f: F)
where
    T: GraphElement,
    F: FnMut(NodeIndex, &T),
{
    sort(graph, Direction::Incoming, |id| f(id, &graph[id]));
}

/// Call `f` on every vertex in the order of [`sort_from_downstream`].
pub fn for_each_from_downstream<T, F>(graph: &Graph<T>, mut f: F)
where
    T: GraphElement,
    F: FnMut(NodeIndex, &T),
{
    sort(graph, Direction::Outgoing, |id| f(id, &graph[id]));
}

/// Depth-first post-order over the edges in `direction`, started from every
/// vertex in identifier order.
fn sort<T: GraphElement>(
    graph: &Graph<T>,
    direction: Direction,
    mut emit: impl FnMut(NodeIndex),
) {
    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    // Visited sets are indexed by rank among the live ids.
    let ids: Vec<NodeIndex> = graph.node_indices().collect();
    let rank = |id: NodeIndex| ids.binary_search(&id).ok();
    let mut entered = bitvec![0; ids.len()];
    let mut emitted = bitvec![0; ids.len()];
    let mut cyclic = false;
    let mut stack = Vec::new();

    for (root, &id) in ids.iter().enumerate() {
        if entered[root] {
            continue;
        }
        stack.push((id, root, State::Enter));

        while let Some((node, at, state)) = stack.pop() {
            match state {
                State::Enter => {
                    if entered[at] {
                        continue;
                    }
                    entered.set(at, true);
                    stack.push((node, at, State::Exit));

                    let successors: Vec<NodeIndex> = graph.neighbours(node, direction).collect();
                    for &next in successors.iter().rev() {
                        let Some(next_at) = rank(next) else {
                            continue;
                        };
                        if !entered[next_at] {
                            stack.push((next, next_at, State::Enter));
                        } else if !emitted[next_at] && !cyclic {
                            cyclic = true;
                            debug!(graph = %graph.id(), node = %next, "graph.sort.cycle");
                        }
                    }
                }
                State::Exit => {
                    emitted.set(at, true);
                    emit(node);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::Node;
    use rstest::rstest;

    /// A graph with one vertex per name and an edge for every `(from, to)`
    /// pair, each edge on its own port pair.
    fn build(names: &[char], edges: &[(usize, usize)]) -> (Graph<Node<char>>, Vec<NodeIndex>) {
        let mut graph = Graph::new();
        let ids: Vec<NodeIndex> = names
            .iter()
            .map(|&name| graph.insert(Node::new(name, edges.len(), edges.len())).unwrap())
            .collect();
        for (edge, &(from, to)) in edges.iter().enumerate() {
            graph.link(ids[from], edge, ids[to], edge).unwrap();
        }
        (graph, ids)
    }

    fn position(order: &[NodeIndex], id: NodeIndex) -> usize {
        order.iter().position(|n| *n == id).unwrap()
    }

    #[test]
    fn linear() {
        let (graph, ids) = build(&['a', 'b', 'c'], &[(0, 1), (1, 2)]);

        assert_eq!(sort_from_upstream(&graph), ids);
        assert_eq!(sort_from_downstream(&graph), [ids[2], ids[1], ids[0]]);
        assert_eq!(enumerate_top(&graph).collect::<Vec<_>>(), [ids[0]]);
        assert_eq!(enumerate_bottom(&graph).collect::<Vec<_>>(), [ids[2]]);
    }

    #[test]
    fn linear_inserted_backwards() {
        let (graph, ids) = build(&['c', 'b', 'a'], &[(2, 1), (1, 0)]);
        assert_eq!(sort_from_upstream(&graph), [ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn diamond() {
        //   a
        //  / \
        // b   c
        //  \ /
        //   d
        let (graph, ids) = build(&['a', 'b', 'c', 'd'], &[(0, 1), (0, 2), (1, 3), (2, 3)]);

        let order = sort_from_upstream(&graph);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], ids[0]);
        assert_eq!(order[3], ids[3]);

        let order = sort_from_downstream(&graph);
        assert_eq!(order[0], ids[3]);
        assert_eq!(order[3], ids[0]);

        assert_eq!(enumerate_downstream(&graph, ids[0]).collect::<Vec<_>>(), [ids[1], ids[2]]);
        assert_eq!(enumerate_upstream(&graph, ids[3]).collect::<Vec<_>>(), [ids[1], ids[2]]);
    }

    #[rstest]
    #[case::two_cycle(&[(0, 1), (1, 0), (0, 2)])]
    #[case::three_cycle(&[(0, 1), (1, 2), (2, 0)])]
    #[case::self_loop(&[(0, 0), (0, 1), (1, 2)])]
    fn cycles_visit_each_vertex_once(#[case] edges: &[(usize, usize)]) {
        let (graph, ids) = build(&['a', 'b', 'c'], edges);

        for order in [sort_from_upstream(&graph), sort_from_downstream(&graph)] {
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(sorted, ids);
        }
    }

    #[test]
    fn cycle_with_tail() {
        // a <-> b, a -> c: c depends on the cycle and comes after it
        let (graph, ids) = build(&['a', 'b', 'c'], &[(0, 1), (1, 0), (0, 2)]);
        let order = sort_from_upstream(&graph);
        assert!(position(&order, ids[2]) > position(&order, ids[0]));
        assert_eq!(order.iter().filter(|n| **n == ids[2]).count(), 1);
    }

    #[test]
    fn disconnected_components() {
        let (graph, ids) = build(&['a', 'b', 'x', 'y'], &[(1, 0), (3, 2)]);

        let order = sort_from_upstream(&graph);
        assert_eq!(order.len(), 4);
        assert!(position(&order, ids[1]) < position(&order, ids[0]));
        assert!(position(&order, ids[3]) < position(&order, ids[2]));
        assert_eq!(enumerate_top(&graph).collect::<Vec<_>>(), [ids[1], ids[3]]);
    }

    #[test]
    fn sort_after_erase() {
        let (mut graph, ids) = build(&['a', 'b', 'c'], &[(0, 1), (1, 2)]);
        graph.erase(ids[1]);

        assert_eq!(sort_from_upstream(&graph), [ids[0], ids[2]]);
        assert_eq!(enumerate_top(&graph).count(), 2);
        assert_eq!(enumerate_bottom(&graph).count(), 2);
    }

    #[test]
    fn sort_after_id_churn() {
        let mut graph = Graph::new();
        for i in 0..1000 {
            let id = graph.insert(Node::new('x', 1, 1)).unwrap();
            if i % 100 != 99 {
                graph.erase(id);
            }
        }
        let survivors: Vec<NodeIndex> = graph.node_indices().collect();
        assert_eq!(survivors.len(), 10);
        assert!(survivors[9].get() >= 1000);

        // link the survivors back to front: the last id is the only source
        for pair in survivors.windows(2) {
            graph.link(pair[1], 0, pair[0], 0).unwrap();
        }
        let late = graph.insert(Node::new('y', 1, 1)).unwrap();
        graph.link(late, 0, late, 0).unwrap();

        let order = sort_from_upstream(&graph);
        assert_eq!(order.len(), 11);
        let mut expected: Vec<NodeIndex> = survivors.iter().rev().copied().collect();
        expected.push(late);
        assert_eq!(order, expected);
    }

    #[test]
    fn for_each_sees_vertices() {
        let (graph, _) = build(&['a', 'b', 'c'], &[(0, 1), (1, 2)]);

        let mut names = String::new();
        for_each_from_upstream(&graph, |_, vertex| names.push(*vertex.weight()));
        for_each_from_downstream(&graph, |_, vertex| names.push(*vertex.weight()));
        assert_eq!(names, "abccba");
    }

    #[test]
    fn empty() {
        let graph: Graph<Node<()>> = Graph::new();
        assert!(sort_from_upstream(&graph).is_empty());
        assert_eq!(enumerate_top(&graph).count(), 0);
    }

    #[test]
    fn multiport_fan_in() {
        let mut graph = Graph::new();
        let a = graph.insert(Node::multi('a', 0, 1)).unwrap();
        let b = graph.insert(Node::multi('b', 1, 0)).unwrap();
        graph.link(a, 0, b, 0).unwrap();
        graph.link(a, 0, b, 0).unwrap();

        assert_eq!(enumerate_upstream(&graph, b).collect::<Vec<_>>(), [a]);
        assert_eq!(sort_from_downstream(&graph), [b, a]);
    }
}
