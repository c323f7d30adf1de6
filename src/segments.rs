// src/segments.rs

// First construction pass: segment lengths, node chopping and the decision
// whether segment names need to be translated into node ids.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{GraphError, Result};
use crate::gfa::{GfaFile, SegmentRecord};
use crate::params::{GfaParsingParameters, MAX_ID_GAP};
use crate::progress::PassProgress;
use crate::sequence_source::{canonical_id, SequenceSource, TranslationBuilder};

/// Scans all S-lines and builds the node sequences and the translation.
///
/// Segment names are used as node ids as such when every name is a positive
/// integer, the ids are not much sparser than the segments (see
/// [`MAX_ID_GAP`]) and no segment is longer than `max_node_length`. Otherwise all
/// segments are renumbered in file order starting from 1, and each segment
/// longer than the maximum becomes a run of nodes of at most that length.
///
/// # Errors
///
/// Returns a parse error for a segment without a sequence or `LN` tag, for
/// conflicting sequence and `LN` values, for duplicate segment names, and if
/// the file contains no segments.
pub fn build_sequence_source(
    gfa: &GfaFile,
    params: &GfaParsingParameters,
) -> Result<SequenceSource> {
    let progress = PassProgress::new(params.show_progress, "segments", gfa.len());

    let mut segments: Vec<(SegmentRecord<'_>, usize)> = Vec::new();
    let mut names: HashSet<&str> = HashSet::new();
    let mut translate = false;
    let mut chopped = 0usize;
    let mut links = 0usize;
    let mut max_id = 0usize;
    for line in gfa.lines() {
        progress.scanned(line.end);
        match line.record_type() {
            Some(b'S') => {}
            Some(b'L') => {
                links += 1;
                continue;
            }
            _ => continue,
        }
        let record = SegmentRecord::parse(line.bytes).map_err(|e| e.at_line(line.number))?;
        let len = record.len().map_err(|e| e.at_line(line.number))?;
        if !names.insert(record.name) {
            return Err(GraphError::parse(
                Some(line.number),
                format!("duplicate segment name {}", record.name),
            ));
        }
        match canonical_id(record.name) {
            Some(id) => max_id = max_id.max(id),
            None => translate = true,
        }
        if len > params.max_node_length {
            translate = true;
            chopped += 1;
        }
        segments.push((record, len));
    }
    progress.finish();

    if segments.is_empty() {
        return Err(GraphError::parse(
            None,
            format!("no segments in {}", gfa.path().display()),
        ));
    }

    if links > 0 {
        debug!("Ignoring {} links; edges are derived from paths", links);
    }

    if !translate && max_id.saturating_sub(segments.len()) > MAX_ID_GAP {
        debug!(
            "Largest segment id {} is too sparse for {} segments",
            max_id,
            segments.len()
        );
        translate = true;
    }

    let mut source = SequenceSource::new();
    if translate {
        debug!(
            "Translating {} segment names to node ids ({} segments chopped)",
            segments.len(),
            chopped
        );
        let mut translation = TranslationBuilder::new();
        for (record, len) in &segments {
            let sequence = segment_sequence(record, *len);
            let pieces = chop(&sequence, params.max_node_length);
            let range = translation.add_segment(record.name, pieces.len());
            for (id, piece) in range.zip(pieces) {
                source.add_node(id, piece);
            }
        }
        source.set_translation(translation.finish()?);
    } else {
        for (record, len) in &segments {
            // Names were checked above.
            if let Some(id) = canonical_id(record.name) {
                source.add_node(id, &segment_sequence(record, *len));
            }
        }
    }

    info!(
        "Parsed {} segments into {} nodes{}",
        segments.len(),
        source.nodes(),
        if source.uses_translation() {
            " with translation"
        } else {
            ""
        }
    );
    Ok(source)
}

/// Sequence of a segment. Segments given only by length are filled with `N`.
fn segment_sequence(record: &SegmentRecord<'_>, len: usize) -> Vec<u8> {
    match record.sequence {
        Some(seq) => seq.to_vec(),
        None => vec![b'N'; len],
    }
}

/// Splits a sequence into ceil(len / max) pieces of at most `max` bases. An
/// empty sequence becomes a single empty node.
pub fn chop(sequence: &[u8], max_node_length: usize) -> Vec<&[u8]> {
    if sequence.is_empty() {
        return vec![sequence];
    }
    sequence.chunks(max_node_length).collect()
}
