// src/graph.rs

// Handle graph view over a finished index and its node sequences.

use std::sync::Arc;

use crate::handle::{Handle, Visit};
use crate::index::Index;
use crate::sequence_source::SequenceSource;

/// Bidirected graph induced by the paths stored in an [`Index`].
///
/// Nodes are the nodes of the sequence source that occur in some path.
/// Edges are never stored: the right edges of a handle are the successors of
/// its GBWT node, and the left edges are the flipped successors of the
/// flipped handle.
#[derive(Clone, Debug)]
pub struct GbwtGraph {
    index: Arc<Index>,
    sequences: Arc<SequenceSource>,
    nodes: Vec<usize>,
}

impl GbwtGraph {
    pub fn new(index: Arc<Index>, sequences: Arc<SequenceSource>) -> Self {
        let nodes: Vec<usize> = sequences
            .node_ids()
            .filter(|&id| index.has_node(Handle::forward(id).to_gbwt()))
            .collect();
        GbwtGraph {
            index,
            sequences,
            nodes,
        }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn sequence_source(&self) -> &SequenceSource {
        &self.sequences
    }

    pub fn get_handle(&self, id: usize, is_reverse: bool) -> Handle {
        Handle::new(id, is_reverse)
    }

    pub fn get_id(&self, handle: Handle) -> usize {
        handle.id()
    }

    pub fn get_is_reverse(&self, handle: Handle) -> bool {
        handle.is_reverse()
    }

    pub fn flip(&self, handle: Handle) -> Handle {
        handle.flip()
    }

    pub fn has_node(&self, id: usize) -> bool {
        self.nodes.binary_search(&id).is_ok()
    }

    pub fn get_node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn min_node_id(&self) -> Option<usize> {
        self.nodes.first().copied()
    }

    pub fn max_node_id(&self) -> Option<usize> {
        self.nodes.last().copied()
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied()
    }

    /// Neighbors of the handle on the given side, in ascending order of their
    /// GBWT encoding.
    pub fn edges(&self, handle: Handle, go_left: bool) -> impl Iterator<Item = Handle> + '_ {
        let start = if go_left { handle.flip() } else { handle };
        self.index.successors(start.to_gbwt()).map(move |node| {
            let next = Handle::from_gbwt(node);
            if go_left {
                next.flip()
            } else {
                next
            }
        })
    }

    /// Calls `visit` on each neighbor until it returns [`Visit::Stop`].
    /// Returns `true` if all neighbors were visited.
    pub fn follow_edges<F>(&self, handle: Handle, go_left: bool, mut visit: F) -> bool
    where
        F: FnMut(Handle) -> Visit,
    {
        for next in self.edges(handle, go_left) {
            if visit(next) == Visit::Stop {
                return false;
            }
        }
        true
    }

    /// Calls `visit` on the forward handle of every node in ascending id
    /// order. Returns `false` if the iteration was stopped.
    pub fn for_each_handle<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(Handle) -> Visit,
    {
        for &id in &self.nodes {
            if visit(Handle::forward(id)) == Visit::Stop {
                return false;
            }
        }
        true
    }

    pub fn get_degree(&self, handle: Handle, go_left: bool) -> usize {
        self.edges(handle, go_left).count()
    }

    pub fn get_length(&self, handle: Handle) -> Option<usize> {
        if !self.has_node(handle.id()) {
            return None;
        }
        self.sequences.get_length(handle.id())
    }

    /// Sequence of the handle; reverse handles get the reverse complement.
    pub fn get_sequence(&self, handle: Handle) -> Option<Vec<u8>> {
        if !self.has_node(handle.id()) {
            return None;
        }
        let sequence = self.sequences.get_sequence(handle.id())?;
        if handle.is_reverse() {
            Some(reverse_complement(sequence))
        } else {
            Some(sequence.to_vec())
        }
    }

    /// Segment name and the offset of the node within the segment.
    pub fn get_segment(&self, id: usize) -> Option<(String, usize)> {
        if !self.has_node(id) {
            return None;
        }
        self.sequences.node_to_segment(id)
    }
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        _ => b'N',
    }
}

pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}
