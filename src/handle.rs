// src/handle.rs

// Oriented node references used by the graph view and the algorithms.

use std::cmp::Ordering;
use std::fmt;

use gbwt::support::{decode_node, encode_node};
use gbwt::Orientation;

/// Oriented reference to a node: a node id and a forward/reverse flag.
///
/// Internally this is the GBWT node encoding `2 * id + is_reverse`, but the
/// encoding is not exposed outside [`Handle::to_gbwt`] / [`Handle::from_gbwt`].
/// Handles order by node id first, forward before reverse.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Handle(usize);

impl Handle {
    #[inline]
    pub fn new(id: usize, is_reverse: bool) -> Self {
        let orientation = if is_reverse {
            Orientation::Reverse
        } else {
            Orientation::Forward
        };
        Handle(encode_node(id, orientation))
    }

    #[inline]
    pub fn forward(id: usize) -> Self {
        Self::new(id, false)
    }

    #[inline]
    pub fn reverse(id: usize) -> Self {
        Self::new(id, true)
    }

    #[inline]
    pub fn id(&self) -> usize {
        decode_node(self.0).0
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.orientation() == Orientation::Reverse
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        decode_node(self.0).1
    }

    /// The same node in the other orientation.
    #[inline]
    pub fn flip(&self) -> Self {
        Self::new(self.id(), !self.is_reverse())
    }

    /// GBWT node value stored in the compressed index.
    #[inline]
    pub fn to_gbwt(&self) -> usize {
        self.0
    }

    #[inline]
    pub fn from_gbwt(node: usize) -> Self {
        Handle(node)
    }
}

impl PartialOrd for Handle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Handle {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.id(), self.is_reverse()).cmp(&(other.id(), other.is_reverse()))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.id(), if self.is_reverse() { '-' } else { '+' })
    }
}

/// Return value of edge visitors: keep going or stop the traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}
