// src/algorithms.rs

// Structural algorithms on the handle graph: weakly connected components,
// head nodes of nice acyclic components, and topological orders of
// subgraphs over both orientations.

use std::collections::{HashMap, HashSet};

use crate::graph::GbwtGraph;
use crate::handle::{Handle, Visit};

/// Result of a structural classification.
///
/// `Disqualified` is an ordinary answer, not a failure: the input did not
/// have the required structure (a cycle, no head nodes, a reversing edge).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Structural<T> {
    Valid(Vec<T>),
    Disqualified,
}

impl<T> Structural<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Structural::Valid(_))
    }

    /// The values, or an empty slice when disqualified.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Structural::Valid(values) => values,
            Structural::Disqualified => &[],
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Structural::Valid(values) => values,
            Structural::Disqualified => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Head node ids of a component.
pub type Heads = Structural<usize>;

/// Topological order over both orientations of a subgraph.
pub type TopologicalOrder = Structural<Handle>;

//-----------------------------------------------------------------------------

/// Partitions the nodes into weakly connected components.
///
/// Orientation is ignored; both sides of every node are explored. Each
/// component is sorted, and the components are in order of their smallest
/// node id.
pub fn weakly_connected_components(graph: &GbwtGraph) -> Vec<Vec<usize>> {
    let mut components = Vec::new();
    let mut found: HashSet<usize> = HashSet::with_capacity(graph.get_node_count());
    let mut stack: Vec<usize> = Vec::new();

    for start in graph.node_ids() {
        if !found.insert(start) {
            continue;
        }
        let mut component = Vec::new();
        stack.push(start);
        while let Some(id) = stack.pop() {
            component.push(id);
            let handle = Handle::forward(id);
            for go_left in [false, true] {
                graph.follow_edges(handle, go_left, |next| {
                    if found.insert(next.id()) {
                        stack.push(next.id());
                    }
                    Visit::Continue
                });
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Returns the head nodes of the component if it is nice and acyclic.
///
/// A component is nice if every edge between its nodes connects forward
/// orientations (so no path changes orientation within it), and it is
/// acyclic if the forward orientations admit a topological order. The heads
/// are the nodes without predecessors within the component, in ascending
/// order.
pub fn is_nice_and_acyclic(graph: &GbwtGraph, component: &[usize]) -> Heads {
    if component.is_empty() {
        return Structural::Disqualified;
    }
    let members: HashSet<usize> = component.iter().copied().collect();

    let mut indegree: HashMap<usize, usize> = HashMap::with_capacity(component.len());
    for &id in component {
        let handle = Handle::forward(id);
        let mut count = 0;
        let mut nice = true;
        for go_left in [false, true] {
            nice &= graph.follow_edges(handle, go_left, |next| {
                if next.is_reverse() {
                    return Visit::Stop;
                }
                if go_left && members.contains(&next.id()) {
                    count += 1;
                }
                Visit::Continue
            });
        }
        if !nice {
            return Structural::Disqualified;
        }
        indegree.insert(id, count);
    }

    let mut heads: Vec<usize> = component
        .iter()
        .copied()
        .filter(|id| indegree.get(id) == Some(&0))
        .collect();
    if heads.is_empty() {
        return Structural::Disqualified;
    }
    heads.sort_unstable();

    // Kahn's algorithm on the forward orientation.
    let mut ready = heads.clone();
    let mut processed = 0;
    while let Some(id) = ready.pop() {
        processed += 1;
        graph.follow_edges(Handle::forward(id), false, |next| {
            if let Some(count) = indegree.get_mut(&next.id()) {
                *count -= 1;
                if *count == 0 {
                    ready.push(next.id());
                }
            }
            Visit::Continue
        });
    }
    if processed != component.len() {
        return Structural::Disqualified;
    }

    Structural::Valid(heads)
}

/// Topological order of both orientations of the subgraph induced by the
/// given node ids.
///
/// Only edges with both ends inside the subgraph constrain the order. If the
/// induced subgraph has a cycle in either orientation, the result is
/// [`Structural::Disqualified`]. Nodes missing from the graph are ignored.
pub fn topological_order(graph: &GbwtGraph, subgraph: &HashSet<usize>) -> TopologicalOrder {
    let mut ids: Vec<usize> = subgraph
        .iter()
        .copied()
        .filter(|&id| graph.has_node(id))
        .collect();
    ids.sort_unstable();

    let mut indegree: HashMap<Handle, usize> = HashMap::with_capacity(2 * ids.len());
    let mut ready: Vec<Handle> = Vec::new();
    for &id in &ids {
        for handle in [Handle::forward(id), Handle::reverse(id)] {
            let mut count = 0;
            graph.follow_edges(handle, true, |prev| {
                if subgraph.contains(&prev.id()) {
                    count += 1;
                }
                Visit::Continue
            });
            if count == 0 {
                ready.push(handle);
            }
            indegree.insert(handle, count);
        }
    }
    // Process the smallest ready handle first.
    ready.reverse();

    let mut order: Vec<Handle> = Vec::with_capacity(2 * ids.len());
    while let Some(handle) = ready.pop() {
        order.push(handle);
        graph.follow_edges(handle, false, |next| {
            if let Some(count) = indegree.get_mut(&next) {
                *count -= 1;
                if *count == 0 {
                    ready.push(next);
                }
            }
            Visit::Continue
        });
    }

    if order.len() != 2 * ids.len() {
        return Structural::Disqualified;
    }
    Structural::Valid(order)
}
