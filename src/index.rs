/***************************************************************************************************
 *
 *  Compressed haplotype index
 *
 *    - IndexBuilder: exclusively owned during construction. Paths are buffered into batches and
 *      inserted together with their reverse complements, so the finished index is bidirectional.
 *    - Index: the finished, read-only structure. Each GBWT node (2 * id + is_reverse) has a
 *      record with its sorted outgoing edges and a run-length encoded body. Node 0 is the
 *      endmarker; sequence i starts at offset i of the endmarker record.
 *    - Document array samples are stored every `sample_interval` positions of each sequence and
 *      at the last node of every sequence, which is enough for `locate`.
 *
 **************************************************************************************************/

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::iter::FusedIterator;

use gbwt::ENDMARKER;
use log::debug;

use crate::error::{GraphError, Result};
use crate::handle::Handle;
use crate::params::{GfaParsingParameters, WORD_BITS};
use crate::path_name::PathMetadata;

/// Sample name used for paths without a sample field.
pub const REFERENCE_SAMPLE: &str = "_gbwt_ref";

/***************************************************************************************************
 * METADATA
 **************************************************************************************************/

/// Path name in the metadata, as identifiers into the sample and contig
/// dictionaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathName {
    pub sample: usize,
    pub contig: usize,
    pub haplotype: usize,
    pub fragment: usize,
}

/// Samples, contigs and path names. Path `i` corresponds to sequences `2i`
/// (forward) and `2i + 1` (reverse).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    sample_names: Vec<String>,
    contig_names: Vec<String>,
    path_names: Vec<PathName>,
    haplotypes: usize,
}

impl Metadata {
    pub fn paths(&self) -> usize {
        self.path_names.len()
    }

    pub fn samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn contigs(&self) -> usize {
        self.contig_names.len()
    }

    /// Number of distinct (sample, haplotype) pairs.
    pub fn haplotypes(&self) -> usize {
        self.haplotypes
    }

    pub fn path(&self, id: usize) -> Option<&PathName> {
        self.path_names.get(id)
    }

    pub fn sample_name(&self, id: usize) -> Option<&str> {
        self.sample_names.get(id).map(|s| s.as_str())
    }

    pub fn contig_name(&self, id: usize) -> Option<&str> {
        self.contig_names.get(id).map(|s| s.as_str())
    }

    pub fn sample_id(&self, name: &str) -> Option<usize> {
        self.sample_names.iter().position(|s| s == name)
    }

    pub fn contig_id(&self, name: &str) -> Option<usize> {
        self.contig_names.iter().position(|c| c == name)
    }

    /// Identifiers of the paths of the given sample.
    pub fn sample_paths(&self, sample: usize) -> Vec<usize> {
        self.path_names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.sample == sample)
            .map(|(id, _)| id)
            .collect()
    }
}

#[derive(Debug, Default)]
struct MetadataBuilder {
    sample_map: BTreeMap<String, usize>,
    contig_map: BTreeMap<String, usize>,
    sample_names: Vec<String>,
    contig_names: Vec<String>,
    path_names: Vec<PathName>,
    seen: HashMap<PathName, usize>,
    haplotypes: BTreeSet<(usize, usize)>,
}

impl MetadataBuilder {
    fn get_or_insert(map: &mut BTreeMap<String, usize>, names: &mut Vec<String>, key: &str) -> usize {
        if let Some(&id) = map.get(key) {
            id
        } else {
            let id = names.len();
            names.push(key.to_string());
            map.insert(key.to_string(), id);
            id
        }
    }

    fn add_path(&mut self, metadata: &PathMetadata) -> Result<usize> {
        let sample_name = metadata.sample.as_deref().unwrap_or(REFERENCE_SAMPLE);
        let contig_name = metadata.contig.as_deref().unwrap_or("");
        let name = PathName {
            sample: Self::get_or_insert(&mut self.sample_map, &mut self.sample_names, sample_name),
            contig: Self::get_or_insert(&mut self.contig_map, &mut self.contig_names, contig_name),
            haplotype: metadata.haplotype.unwrap_or(0),
            fragment: metadata.fragment.unwrap_or(0),
        };
        if let Some(&previous) = self.seen.get(&name) {
            return Err(GraphError::parse(
                None,
                format!(
                    "duplicate path name (sample {}, contig {}, haplotype {}, fragment {}); first used by path {}",
                    sample_name, contig_name, name.haplotype, name.fragment, previous
                ),
            ));
        }
        let id = self.path_names.len();
        self.seen.insert(name, id);
        self.haplotypes.insert((name.sample, name.haplotype));
        self.path_names.push(name);
        Ok(id)
    }

    fn finish(self) -> Metadata {
        Metadata {
            sample_names: self.sample_names,
            contig_names: self.contig_names,
            path_names: self.path_names,
            haplotypes: self.haplotypes.len(),
        }
    }
}

/***************************************************************************************************
 * CONSTRUCTION
 **************************************************************************************************/

/// Uncompressed record used during construction.
#[derive(Clone, Debug, Default)]
struct DynamicRecord {
    /// Successor of each visit, in BWT order.
    body: Vec<usize>,
    /// Predecessor node -> number of visits coming from it.
    incoming: BTreeMap<usize, usize>,
    /// (offset in body, sequence id)
    samples: Vec<(usize, usize)>,
}

/// A sequence of the current batch, positioned at a visit that has not been
/// inserted yet.
#[derive(Copy, Clone, Debug)]
struct ActiveVisit {
    /// Index in the batch.
    sequence: usize,
    /// Sequence identifier in the index.
    id: usize,
    node: usize,
    offset: usize,
    /// Position of the next node in the sequence.
    step: usize,
}

/// Rebuilds one record from its old visits and a sorted run of new ones.
struct RecordMerger<'a> {
    body: Vec<usize>,
    samples: Vec<(usize, usize)>,
    // successor -> visits to it so far
    counts: HashMap<usize, usize>,
    old_samples: &'a [(usize, usize)],
    next_sample: usize,
}

impl<'a> RecordMerger<'a> {
    fn copy_old(&mut self, old_offset: usize, to: usize) {
        while let Some(&(offset, id)) = self.old_samples.get(self.next_sample) {
            if offset != old_offset {
                break;
            }
            self.samples.push((self.body.len(), id));
            self.next_sample += 1;
        }
        *self.counts.entry(to).or_insert(0) += 1;
        self.body.push(to);
    }

    /// Appends a new visit and returns its rank among the visits to `to`.
    fn push_new(&mut self, to: usize, sample: Option<usize>) -> usize {
        let count = self.counts.entry(to).or_insert(0);
        let rank = *count;
        *count += 1;
        if let Some(id) = sample {
            self.samples.push((self.body.len(), id));
        }
        self.body.push(to);
        rank
    }
}

/// Mutable index under construction.
#[derive(Debug)]
pub struct IndexBuilder {
    records: Vec<DynamicRecord>,
    buffer: Vec<Vec<usize>>,
    buffered_nodes: usize,
    node_width: usize,
    batch_size: usize,
    sample_interval: usize,
    size: usize,
    batches: usize,
    metadata: MetadataBuilder,
}

impl IndexBuilder {
    pub fn new(params: &GfaParsingParameters) -> Self {
        IndexBuilder {
            records: vec![DynamicRecord::default()],
            buffer: Vec::new(),
            buffered_nodes: 0,
            node_width: params.node_width,
            batch_size: params.batch_size,
            sample_interval: params.sample_interval,
            size: 0,
            batches: 0,
            metadata: MetadataBuilder::default(),
        }
    }

    /// Number of paths added so far.
    pub fn paths(&self) -> usize {
        self.metadata.path_names.len()
    }

    fn check_width(&self, node: usize) -> Result<()> {
        if self.node_width < WORD_BITS && (node >> self.node_width) != 0 {
            return Err(GraphError::config(format!(
                "GBWT node {} does not fit in {} bits",
                node, self.node_width
            )));
        }
        Ok(())
    }

    /// Adds a path and its reverse complement. Returns the path identifier.
    ///
    /// Insertion is deferred until the buffer holds `batch_size` nodes or the
    /// builder is finished.
    pub fn insert(&mut self, path: &[Handle], metadata: &PathMetadata) -> Result<usize> {
        if path.is_empty() {
            return Err(GraphError::parse(None, "cannot insert an empty path"));
        }
        let forward: Vec<usize> = path.iter().map(|h| h.to_gbwt()).collect();
        for &node in &forward {
            self.check_width(node)?;
            self.check_width(Handle::from_gbwt(node).flip().to_gbwt())?;
        }
        let id = self.metadata.add_path(metadata)?;
        let reverse: Vec<usize> = path.iter().rev().map(|h| h.flip().to_gbwt()).collect();

        self.buffered_nodes += 2 * (path.len() + 1);
        self.buffer.push(forward);
        self.buffer.push(reverse);
        if self.buffered_nodes >= self.batch_size {
            self.flush();
        }
        Ok(id)
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        debug!(
            "Inserting batch {} with {} sequences ({} nodes)",
            self.batches + 1,
            batch.len(),
            self.buffered_nodes
        );
        self.insert_batch(&batch);
        self.buffered_nodes = 0;
        self.batches += 1;
    }

    fn ensure_record(&mut self, node: usize) {
        if node >= self.records.len() {
            self.records.resize_with(node + 1, DynamicRecord::default);
        }
    }

    /// Inserts a batch of sequences.
    ///
    /// All sequences advance one step per round. In each round the active
    /// visits are sorted by (node, offset) and every touched record is
    /// rebuilt with a single merge, which also yields the rank of each new
    /// visit among the visits to the same successor. Offsets are always in
    /// the coordinates of the record after the round's insertions.
    fn insert_batch(&mut self, batch: &[Vec<usize>]) {
        let first_id = self.records[ENDMARKER].body.len();
        let mut active: Vec<ActiveVisit> = (0..batch.len())
            .map(|i| ActiveVisit {
                sequence: i,
                id: first_id + i,
                node: ENDMARKER,
                offset: first_id + i,
                step: 0,
            })
            .collect();

        while !active.is_empty() {
            active.sort_unstable_by_key(|visit| (visit.node, visit.offset));
            let next: Vec<usize> = active
                .iter()
                .map(|visit| batch[visit.sequence].get(visit.step).copied().unwrap_or(ENDMARKER))
                .collect();
            for &node in &next {
                self.ensure_record(node);
            }

            let mut ranks = vec![0usize; active.len()];
            let mut start = 0;
            while start < active.len() {
                let node = active[start].node;
                let end = start + active[start..].iter().take_while(|v| v.node == node).count();
                self.merge_visits(node, &active[start..end], &next[start..end], &mut ranks[start..end]);
                for &to in &next[start..end] {
                    if to != ENDMARKER {
                        *self.records[to].incoming.entry(node).or_insert(0) += 1;
                    }
                }
                start = end;
            }
            self.size += active.len();

            // Incoming counts are complete for this round, so the offsets in
            // the successor records can be computed.
            let mut advanced = Vec::with_capacity(active.len());
            for ((visit, to), rank) in active.into_iter().zip(next).zip(ranks) {
                if to == ENDMARKER {
                    continue;
                }
                let before: usize = self.records[to]
                    .incoming
                    .range(..visit.node)
                    .map(|(_, count)| *count)
                    .sum();
                advanced.push(ActiveVisit {
                    node: to,
                    offset: before + rank,
                    step: visit.step + 1,
                    ..visit
                });
            }
            active = advanced;
        }
    }

    /// Merges new visits (sorted by offset) into the record of `node`.
    fn merge_visits(&mut self, node: usize, visits: &[ActiveVisit], next: &[usize], ranks: &mut [usize]) {
        let interval = self.sample_interval;
        let record = &mut self.records[node];
        let old_body = std::mem::take(&mut record.body);
        let old_samples = std::mem::take(&mut record.samples);
        let mut merger = RecordMerger {
            body: Vec::with_capacity(old_body.len() + visits.len()),
            samples: Vec::with_capacity(old_samples.len() + visits.len()),
            counts: HashMap::new(),
            old_samples: &old_samples,
            next_sample: 0,
        };

        let mut old = old_body.into_iter().enumerate();
        for (i, visit) in visits.iter().enumerate() {
            while merger.body.len() < visit.offset {
                match old.next() {
                    Some((old_offset, to)) => merger.copy_old(old_offset, to),
                    None => break,
                }
            }
            // The visit at `node` is sequence position `step - 1`.
            let sampled = node != ENDMARKER
                && ((visit.step - 1) % interval == 0 || next[i] == ENDMARKER);
            ranks[i] = merger.push_new(next[i], sampled.then_some(visit.id));
        }
        for (old_offset, to) in old {
            merger.copy_old(old_offset, to);
        }

        record.body = merger.body;
        record.samples = merger.samples;
        record.samples.sort_unstable();
    }

    /// Inserts the remaining batch and compresses the records.
    pub fn finish(mut self) -> Result<Index> {
        self.flush();

        // Offset of edge (from -> to) in the record of `to`.
        let mut edge_offsets: HashMap<(usize, usize), usize> = HashMap::new();
        for (to, record) in self.records.iter().enumerate() {
            let mut total = 0;
            for (&from, &count) in &record.incoming {
                edge_offsets.insert((from, to), total);
                total += count;
            }
        }

        let sequences = self.records[ENDMARKER].body.len();
        let mut records = Vec::with_capacity(self.records.len());
        for (node, record) in self.records.into_iter().enumerate() {
            let successors: BTreeSet<usize> = record.body.iter().copied().collect();
            let edges: Vec<(usize, usize)> = successors
                .into_iter()
                .map(|to| {
                    let offset = if to == ENDMARKER {
                        0
                    } else {
                        edge_offsets.get(&(node, to)).copied().unwrap_or(0)
                    };
                    (to, offset)
                })
                .collect();
            let mut runs: Vec<Run> = Vec::new();
            for &to in &record.body {
                let rank = edges.partition_point(|&(succ, _)| succ < to);
                match runs.last_mut() {
                    Some(last) if last.value == rank => last.len += 1,
                    _ => runs.push(Run::new(rank, 1)),
                }
            }
            records.push(Record {
                edges,
                runs,
                len: record.body.len(),
                samples: record.samples,
            });
        }

        let metadata = self.metadata.finish();
        debug!(
            "Finished index: {} sequences, total length {}, {} batches",
            sequences, self.size, self.batches
        );
        Ok(Index {
            records,
            sequences,
            size: self.size,
            node_width: self.node_width,
            sample_interval: self.sample_interval,
            metadata,
        })
    }
}

/***************************************************************************************************
 * FINISHED INDEX
 **************************************************************************************************/

/// A run-length pair: `len` consecutive visits continue to edge `value`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Run {
    value: usize,
    len: usize,
}

impl Run {
    fn new(value: usize, len: usize) -> Self {
        Run { value, len }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Record {
    /// (successor, offset in the successor's record), sorted by successor.
    edges: Vec<(usize, usize)>,
    runs: Vec<Run>,
    len: usize,
    /// (offset, sequence id), sorted by offset.
    samples: Vec<(usize, usize)>,
}

impl Record {
    fn outdegree(&self) -> usize {
        self.edges.len()
    }

    /// LF-mapping: the successor of the visit at `offset` and the offset of
    /// the next visit in the successor's record.
    fn lf(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.len {
            return None;
        }
        let mut ranks = vec![0usize; self.edges.len()];
        let mut pos = 0;
        for run in &self.runs {
            if offset < pos + run.len {
                ranks[run.value] += offset - pos;
                let (successor, base) = self.edges[run.value];
                return Some((successor, base + ranks[run.value]));
            }
            ranks[run.value] += run.len;
            pos += run.len;
        }
        None
    }

    fn sample_at(&self, offset: usize) -> Option<usize> {
        self.samples
            .binary_search_by_key(&offset, |&(o, _)| o)
            .ok()
            .map(|i| self.samples[i].1)
    }
}

/// Finished, immutable bidirectional index over oriented node sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Index {
    records: Vec<Record>,
    sequences: usize,
    size: usize,
    node_width: usize,
    sample_interval: usize,
    metadata: Metadata,
}

impl Index {
    /// Total length of the sequences, including an endmarker for each.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of sequences: twice the number of paths.
    pub fn sequences(&self) -> usize {
        self.sequences
    }

    pub fn paths(&self) -> usize {
        self.metadata.paths()
    }

    pub fn node_width(&self) -> usize {
        self.node_width
    }

    pub fn sample_interval(&self) -> usize {
        self.sample_interval
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns `true` if the GBWT node occurs in some sequence.
    pub fn has_node(&self, node: usize) -> bool {
        node != ENDMARKER && self.records.get(node).map_or(false, |r| r.len > 0)
    }

    /// Largest GBWT node value with a record.
    pub fn alphabet_size(&self) -> usize {
        self.records.len()
    }

    /// First position of the sequence, as (node, offset).
    pub fn start(&self, sequence: usize) -> Option<(usize, usize)> {
        if sequence >= self.sequences {
            return None;
        }
        self.records[ENDMARKER].lf(sequence)
    }

    /// Follows the sequence to the next position. Returns `None` at the end
    /// of the sequence.
    pub fn forward(&self, pos: (usize, usize)) -> Option<(usize, usize)> {
        if pos.0 == ENDMARKER {
            return None;
        }
        let (next, offset) = self.records.get(pos.0)?.lf(pos.1)?;
        if next == ENDMARKER {
            None
        } else {
            Some((next, offset))
        }
    }

    /// Iterates over the GBWT nodes of the sequence.
    pub fn sequence(&self, sequence: usize) -> SequenceIter<'_> {
        SequenceIter {
            parent: self,
            next: self.start(sequence),
        }
    }

    /// Handles of a path in forward orientation.
    pub fn path(&self, path: usize) -> Vec<Handle> {
        self.sequence(2 * path).map(Handle::from_gbwt).collect()
    }

    /// Distinct successors of a GBWT node in ascending order, excluding the
    /// endmarker.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.records
            .get(node)
            .filter(|_| node != ENDMARKER)
            .into_iter()
            .flat_map(|record| record.edges.iter().map(|&(to, _)| to))
            .filter(|&to| to != ENDMARKER)
    }

    /// Number of distinct successors including the endmarker.
    pub fn outdegree(&self, node: usize) -> usize {
        self.records.get(node).map_or(0, |r| r.outdegree())
    }

    /// Identifier of the sequence containing the position.
    pub fn locate(&self, pos: (usize, usize)) -> Option<usize> {
        let mut pos = pos;
        loop {
            let record = self.records.get(pos.0)?;
            if pos.0 != ENDMARKER {
                if let Some(id) = record.sample_at(pos.1) {
                    return Some(id);
                }
            }
            pos = self.forward(pos)?;
        }
    }
}

/// Iterator over the nodes of a sequence.
#[derive(Clone, Debug)]
pub struct SequenceIter<'a> {
    parent: &'a Index,
    next: Option<(usize, usize)>,
}

impl<'a> Iterator for SequenceIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.next?;
        self.next = self.parent.forward(pos);
        Some(pos.0)
    }
}

impl<'a> FusedIterator for SequenceIter<'a> {}
