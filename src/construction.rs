// src/construction.rs

// GFA to GBWT: the two construction passes glued together.

use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use crate::error::Result;
use crate::gfa::GfaFile;
use crate::index::{Index, IndexBuilder};
use crate::params::{GfaParsingParameters, GFA_EXTENSION};
use crate::path_name::PathNameParser;
use crate::progress::spinner;
use crate::segments::build_sequence_source;
use crate::sequence_source::SequenceSource;
use crate::traversal::for_each_traversal;

/// Builds a bidirectional index of the paths and walks in a GFA file, along
/// with the node sequences and the optional segment translation.
///
/// Configuration errors are reported before the file is opened. Every path
/// is inserted in both orientations.
pub fn gfa_to_gbwt<P: AsRef<Path>>(
    path: P,
    params: &GfaParsingParameters,
) -> Result<(Index, SequenceSource)> {
    params.validate()?;
    let parser = PathNameParser::new(&params.path_name_regex, &params.path_name_fields)?;

    let path = path.as_ref();
    if !path.to_string_lossy().ends_with(GFA_EXTENSION) {
        warn!("{} does not have extension {}", path.display(), GFA_EXTENSION);
    }
    let start = Instant::now();
    let gfa = GfaFile::open(path)?;
    info!("Reading {} ({} bytes)", path.display(), gfa.len());

    let source = build_sequence_source(&gfa, params)?;

    let mut builder = IndexBuilder::new(params);
    let paths = for_each_traversal(&gfa, &source, &parser, params.show_progress, |traversal| {
        builder.insert(&traversal.handles, &traversal.metadata)?;
        Ok(())
    })?;
    let compressing = spinner(
        params.show_progress,
        format!("Compressing an index of {} paths", paths),
    );
    let index = builder.finish()?;
    if let Some(pb) = compressing {
        pb.finish_and_clear();
    }

    info!(
        "Built an index of {} paths ({} sequences, total length {}) in {:.2?}",
        paths,
        index.sequences(),
        index.len(),
        start.elapsed()
    );
    Ok((index, source))
}
