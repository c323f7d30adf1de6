// src/traversal.rs

// Second construction pass: P-lines and W-lines to sequences of handles.

use log::info;

use crate::error::{GraphError, Result};
use crate::gfa::{GfaFile, PathRecord, WalkRecord};
use crate::handle::Handle;
use crate::path_name::{PathMetadata, PathNameParser};
use crate::progress::PassProgress;
use crate::sequence_source::SequenceSource;

/// A path ready for insertion into the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTraversal {
    /// Line of the P-line or W-line in the GFA file.
    pub line: usize,
    /// Path name for P-lines, `sample#haplotype#contig` for W-lines.
    pub name: String,
    pub metadata: PathMetadata,
    pub handles: Vec<Handle>,
}

/// Resolves oriented segment references into handles.
///
/// A segment chopped into nodes `a..b` becomes `a+, .., (b-1)+` in forward
/// orientation and `(b-1)-, .., a-` in reverse orientation.
pub fn resolve_steps(source: &SequenceSource, steps: &[(&str, bool)]) -> Result<Vec<Handle>> {
    let mut handles = Vec::with_capacity(steps.len());
    for &(segment, is_reverse) in steps {
        let range = source.segment_nodes(segment).ok_or_else(|| {
            GraphError::parse(None, format!("path refers to unknown segment {}", segment))
        })?;
        if is_reverse {
            handles.extend(range.rev().map(Handle::reverse));
        } else {
            handles.extend(range.map(Handle::forward));
        }
    }
    Ok(handles)
}

/// Calls `visit` for every P-line and W-line in file order. Returns the
/// number of paths.
///
/// The path name regex applies to P-lines only; W-lines carry their own
/// sample, haplotype and contig fields, and the start position becomes the
/// fragment identifier.
pub fn for_each_traversal<F>(
    gfa: &GfaFile,
    source: &SequenceSource,
    parser: &PathNameParser,
    show_progress: bool,
    mut visit: F,
) -> Result<usize>
where
    F: FnMut(PathTraversal) -> Result<()>,
{
    let progress = PassProgress::new(show_progress, "paths", gfa.len());

    let mut paths = 0usize;
    let mut walks = 0usize;
    for line in gfa.lines() {
        progress.scanned(line.end);
        let traversal = match line.record_type() {
            Some(b'P') => {
                let record = PathRecord::parse(line.bytes).map_err(|e| e.at_line(line.number))?;
                let metadata = parser.parse(record.name).map_err(|e| e.at_line(line.number))?;
                let handles =
                    resolve_steps(source, &record.steps).map_err(|e| e.at_line(line.number))?;
                paths += 1;
                PathTraversal {
                    line: line.number,
                    name: record.name.to_string(),
                    metadata,
                    handles,
                }
            }
            Some(b'W') => {
                let record = WalkRecord::parse(line.bytes).map_err(|e| e.at_line(line.number))?;
                let handles =
                    resolve_steps(source, &record.steps).map_err(|e| e.at_line(line.number))?;
                walks += 1;
                PathTraversal {
                    line: line.number,
                    name: format!("{}#{}#{}", record.sample, record.haplotype, record.contig),
                    metadata: PathMetadata {
                        sample: Some(record.sample.to_string()),
                        contig: Some(record.contig.to_string()),
                        haplotype: Some(record.haplotype),
                        fragment: record.start,
                    },
                    handles,
                }
            }
            _ => continue,
        };
        if traversal.handles.is_empty() {
            return Err(GraphError::parse(
                Some(traversal.line),
                format!("path {} is empty", traversal.name),
            ));
        }
        let number = traversal.line;
        visit(traversal).map_err(|e| e.at_line(number))?;
    }
    progress.finish();

    info!("Emitted {} paths and {} walks", paths, walks);
    Ok(paths + walks)
}
