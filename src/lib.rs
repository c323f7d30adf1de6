pub mod algorithms;
pub mod construction;
pub mod error;
pub mod gfa;
pub mod graph;
pub mod handle;
pub mod index;
pub mod params;
pub mod path_name;
pub mod progress;
pub mod segments;
pub mod sequence_source;
pub mod traversal;

pub use algorithms::{
    is_nice_and_acyclic, topological_order, weakly_connected_components, Heads, Structural,
    TopologicalOrder,
};
pub use construction::gfa_to_gbwt;
pub use error::{GraphError, Result};
pub use graph::GbwtGraph;
pub use handle::{Handle, Visit};
pub use index::{Index, IndexBuilder, Metadata, PathName};
pub use params::GfaParsingParameters;
pub use path_name::{PathField, PathMetadata, PathNameParser};
pub use sequence_source::{SequenceSource, Translation};
