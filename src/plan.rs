//! Graphs of execution steps.
//!
//! A step plan is a [`Graph`] of boxed [`Step`]s. Steps are either processing
//! steps or data exchanges between them. Their ports are multiports: a step
//! may feed the same downstream step several times, and every such edge is
//! kept.
use std::any::Any;
use std::fmt::{self, Debug};

use crate::element::{GraphElement, Membership};
use crate::graph::GraphError;
use crate::index::{NodeIndex, NodeMap};
use crate::port::{Input, Multi, Multiport, Output};
use crate::{merge, traverse};

/// What an execution step does with its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Runs operators on the data it receives.
    Process,
    /// Moves data between processing steps.
    Exchange,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Process => f.write_str("process"),
            StepKind::Exchange => f.write_str("exchange"),
        }
    }
}

pub trait Step: GraphElement<Flavor = Multi> + Debug {
    fn kind(&self) -> StepKind;

    /// A copy of the step. The copy is an orphan without connections.
    fn clone_box(&self) -> Box<dyn Step>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Step {
    pub fn downcast_ref<U: Any>(&self) -> Option<&U> {
        self.as_any().downcast_ref()
    }

    pub fn is<U: Any>(&self) -> bool {
        self.as_any().is::<U>()
    }
}

impl Clone for Box<dyn Step> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Display for dyn Step {
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

impl GraphElement for Box<dyn Step> {
    type Flavor = Multi;

    #[inline]
    fn input_ports(&self) -> &[Multiport<Input>] {
        (**self).input_ports()
    }

    #[inline]
    fn input_ports_mut(&mut self) -> &mut [Multiport<Input>] {
        (**self).input_ports_mut()
    }

    #[inline]
    fn output_ports(&self) -> &[Multiport<Output>] {
        (**self).output_ports()
    }

    #[inline]
    fn output_ports_mut(&mut self) -> &mut [Multiport<Output>] {
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

/// A step plan.
pub type Graph = crate::Graph<Box<dyn Step>>;

pub fn emplace<S: Step + 'static>(graph: &mut Graph, step: S) -> Result<NodeIndex, GraphError> {
    graph.insert(Box::new(step))
}

pub fn merge_into(source: &mut Graph, dest: &mut Graph) -> Result<NodeMap, GraphError> {
    merge::move_into(source, dest)
}

pub fn merge_copy_into(source: &Graph, dest: &mut Graph) -> Result<NodeMap, GraphError> {
    merge::copy_into(source, dest)
}

pub fn release(
    source: &mut Graph,
    subset: impl IntoIterator<Item = NodeIndex>,
) -> Result<Graph, GraphError> {
    merge::release(source, subset)
}

pub fn enumerate_top(graph: &Graph) -> impl Iterator<Item = NodeIndex> + '_ {
    traverse::enumerate_top(graph)
}

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

/// The exchange steps of `graph`, in identifier order.
pub fn enumerate_exchanges(graph: &Graph) -> impl Iterator<Item = NodeIndex> + '_ {
    graph
        .iter()
        .filter(|(_, step)| step.kind() == StepKind::Exchange)
        .map(|(id, _)| id)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::element::Binding;
    use crate::port::{Direction, InputMultiport, OutputMultiport};

    #[derive(Debug, Clone)]
    struct Process {
        name: &'static str,
        input: [InputMultiport; 1],
        output: [OutputMultiport; 1],
        binding: Binding,
    }

    #[derive(Debug, Clone)]
    struct Forward {
        input: [InputMultiport; 1],
        output: [OutputMultiport; 1],
        binding: Binding,
    }

    fn process(name: &'static str) -> Process {
        Process {
            name,
            input: [InputMultiport::new(0)],
            output: [OutputMultiport::new(0)],
            binding: Binding::new(),
        }
    }

    fn forward() -> Forward {
        Forward {
            input: [InputMultiport::new(0)],
            output: [OutputMultiport::new(0)],
            binding: Binding::new(),
        }
    }

    macro_rules! impl_step {
        ($ty:ty, $kind:expr) => {
            impl GraphElement for $ty {
                type Flavor = Multi;

                fn input_ports(&self) -> &[InputMultiport] {
                    &self.input
                }

                fn input_ports_mut(&mut self) -> &mut [InputMultiport] {
                    &mut self.input
                }

                fn output_ports(&self) -> &[OutputMultiport] {
                    &self.output
                }

                fn output_ports_mut(&mut self) -> &mut [OutputMultiport] {
                    &mut self.output
                }

                fn on_join(&mut self, membership: Option<Membership>) {
                    self.binding.set(membership);
                }

                fn membership(&self) -> Option<Membership> {
                    self.binding.get()
                }
            }

            impl Step for $ty {
                fn kind(&self) -> StepKind {
                    $kind
                }

                fn clone_box(&self) -> Box<dyn Step> {
                    Box::new(self.clone())
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        };
    }

    impl_step!(Process, StepKind::Process);
    impl_step!(Forward, StepKind::Exchange);

    /// `produce => forward => consume`, with both edges doubled.
    fn pipeline() -> (Graph, [NodeIndex; 3]) {
        let mut graph = Graph::new();
        let produce = emplace(&mut graph, process("produce")).unwrap();
        let exchange = emplace(&mut graph, forward()).unwrap();
        let consume = emplace(&mut graph, process("consume")).unwrap();
        for _ in 0..2 {
            graph.link(produce, 0, exchange, 0).unwrap();
            graph.link(exchange, 0, consume, 0).unwrap();
        }
        (graph, [produce, exchange, consume])
    }

    #[test]
    fn kinds() {
        let (graph, [produce, exchange, _]) = pipeline();

        assert_eq!(graph[exchange].kind(), StepKind::Exchange);
        assert_eq!(graph[produce].downcast_ref::<Process>().map(|p| p.name), Some("produce"));
        assert!(!graph[exchange].is::<Process>());
        assert_eq!(enumerate_exchanges(&graph).collect::<Vec<_>>(), [exchange]);
        assert_eq!(graph[exchange].to_string(), "exchange (1 in, 1 out)");
    }

    #[test]
    fn parallel_edges() {
        let (mut graph, [produce, exchange, consume]) = pipeline();

        assert_eq!(graph.opposites(exchange.input(0)).unwrap().len(), 2);
        assert_eq!(enumerate_upstream(&graph, exchange).collect::<Vec<_>>(), [produce]);
        assert_eq!(enumerate_downstream(&graph, exchange).collect::<Vec<_>>(), [consume]);

        assert_eq!(graph.disconnect(produce.output(0), exchange.input(0)), Ok(true));
        assert_eq!(graph.opposites(produce.output(0)).unwrap(), [exchange.input(0)]);
    }

    #[test]
    fn topology() {
        let (graph, [produce, exchange, consume]) = pipeline();

        assert_eq!(enumerate_top(&graph).collect::<Vec<_>>(), [produce]);
        assert_eq!(enumerate_bottom(&graph).collect::<Vec<_>>(), [consume]);
        assert_eq!(sort_from_upstream(&graph), [produce, exchange, consume]);
        assert_eq!(sort_from_downstream(&graph), [consume, exchange, produce]);
    }

    #[test]
    fn merge_keeps_multiplicity() {
        let (graph, [produce, exchange, consume]) = pipeline();

        let mut copy = Graph::new();
        let map = merge_copy_into(&graph, &mut copy).unwrap();
        assert_eq!(copy.opposites(map[&consume].input(0)).unwrap().len(), 2);

        let mut source = graph;
        let mut dest = Graph::new();
        let map = merge_into(&mut source, &mut dest).unwrap();
        assert!(source.is_empty());
        assert_eq!(
            dest.opposites(map[&produce].output(0)).unwrap(),
            [map[&exchange].input(0), map[&exchange].input(0)]
        );
    }

    #[test]
    fn release_exchange() {
        let (mut graph, [produce, exchange, consume]) = pipeline();

        let released = release(&mut graph, [exchange]).unwrap();
        assert_eq!(released.len(), 1);
        assert!(!graph.is_connected(produce, Direction::Outgoing));
        assert!(!graph.is_connected(consume, Direction::Incoming));

        let (_, step) = released.iter().next().unwrap();
        assert_eq!(step.kind(), StepKind::Exchange);
        assert_eq!(step.optional_owner(), Some(released.id()));
        assert!(step.input_ports()[0].opposites().is_empty());
    }
}
