// src/params.rs

// Parameters for building a GBWT index and a graph from GFA.

use crate::error::{GraphError, Result};

/// Conventional extension of GFA files.
pub const GFA_EXTENSION: &str = ".gfa";

/// Segments longer than this are chopped into multiple nodes by default.
pub const MAX_NODE_LENGTH: usize = 1024;

/// Numeric segment names are renumbered when the largest id exceeds the
/// number of segments by more than this. Index records are allocated up to
/// the largest node id.
pub const MAX_ID_GAP: usize = 1 << 20;

/// Default number of nodes buffered before a batch is inserted into the index.
pub const INSERT_BATCH_SIZE: usize = 100_000_000;

/// Default document array sampling interval.
pub const SAMPLE_INTERVAL: usize = 1024;

/// Default node width in bits.
pub const WORD_BITS: usize = 64;

/// The default path name regex matches the entire name.
pub const DEFAULT_REGEX: &str = ".*";

/// The default field string maps the entire name to the sample.
pub const DEFAULT_FIELDS: &str = "s";

/// Construction parameters.
///
/// `path_name_regex` is applied to the names of P-lines. Each submatch (a
/// parenthesized group) is a field, numbered in preorder from left to right
/// with 0 denoting the entire name. Character `i` of `path_name_fields`
/// assigns field `i` to a path name component:
///
/// * `S`: sample name
/// * `C`: contig name
/// * `H`: haplotype identifier
/// * `F`: fragment identifier
///
/// The characters are case-insensitive and any other character leaves the
/// field unused, as do fields past the end of the string. Each component may
/// be assigned at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GfaParsingParameters {
    pub node_width: usize,
    pub batch_size: usize,
    pub sample_interval: usize,
    pub max_node_length: usize,
    pub show_progress: bool,
    pub path_name_regex: String,
    pub path_name_fields: String,
}

impl Default for GfaParsingParameters {
    fn default() -> Self {
        GfaParsingParameters {
            node_width: WORD_BITS,
            batch_size: INSERT_BATCH_SIZE,
            sample_interval: SAMPLE_INTERVAL,
            max_node_length: MAX_NODE_LENGTH,
            show_progress: false,
            path_name_regex: DEFAULT_REGEX.to_string(),
            path_name_fields: DEFAULT_FIELDS.to_string(),
        }
    }
}

impl GfaParsingParameters {
    /// Checks the numeric parameters. The path name configuration is
    /// validated separately by [`crate::path_name::PathNameParser::new`].
    pub fn validate(&self) -> Result<()> {
        if self.node_width == 0 || self.node_width > WORD_BITS {
            return Err(GraphError::config(format!(
                "node width must be between 1 and {} bits, got {}",
                WORD_BITS, self.node_width
            )));
        }
        if self.batch_size == 0 {
            return Err(GraphError::config("batch size must be positive"));
        }
        if self.sample_interval == 0 {
            return Err(GraphError::config("sample interval must be positive"));
        }
        if self.max_node_length == 0 {
            return Err(GraphError::config("maximum node length must be positive"));
        }
        Ok(())
    }
}
