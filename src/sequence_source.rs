// src/sequence_source.rs

// Node sequences and the segment-to-node translation produced by the first
// construction pass.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use simple_sds::ops::{BitVec, PredSucc, Select};
use simple_sds::sparse_vector::{SparseBuilder, SparseVector};

use crate::error::{GraphError, Result};

/// Sequences of the nodes in the graph, plus an optional translation from
/// segment names to node id ranges.
///
/// The translation is present whenever segment names were not usable as node
/// ids as such, or when some segment was chopped into several nodes. Once
/// construction has finished the source is never modified.
#[derive(Debug, Default)]
pub struct SequenceSource {
    sequences: BTreeMap<usize, Vec<u8>>,
    translation: Option<Translation>,
}

impl SequenceSource {
    pub fn new() -> Self {
        SequenceSource::default()
    }

    pub(crate) fn add_node(&mut self, id: usize, sequence: &[u8]) {
        self.sequences.insert(id, sequence.to_vec());
    }

    pub(crate) fn set_translation(&mut self, translation: Translation) {
        self.translation = Some(translation);
    }

    /// Number of nodes.
    pub fn nodes(&self) -> usize {
        self.sequences.len()
    }

    /// Number of translated segments, or `0` without a translation.
    pub fn segments(&self) -> usize {
        self.translation.as_ref().map_or(0, |t| t.len())
    }

    pub fn has_node(&self, id: usize) -> bool {
        self.sequences.contains_key(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.sequences.keys().copied()
    }

    pub fn get_sequence(&self, id: usize) -> Option<&[u8]> {
        self.sequences.get(&id).map(|seq| seq.as_slice())
    }

    pub fn get_length(&self, id: usize) -> Option<usize> {
        self.sequences.get(&id).map(|seq| seq.len())
    }

    pub fn uses_translation(&self) -> bool {
        self.translation.is_some()
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }

    /// Node id range of a translated segment.
    pub fn get_translation(&self, name: &str) -> Option<Range<usize>> {
        self.translation.as_ref()?.segment_nodes(name)
    }

    /// Node id range corresponding to a segment name, with or without a
    /// translation. Without one, the name must be the decimal form of an
    /// existing node id.
    pub fn segment_nodes(&self, name: &str) -> Option<Range<usize>> {
        match &self.translation {
            Some(translation) => translation.segment_nodes(name),
            None => {
                let id = canonical_id(name)?;
                self.has_node(id).then(|| id..id + 1)
            }
        }
    }

    /// Segment name and offset (in bases) of the start of a node within the
    /// segment.
    pub fn node_to_segment(&self, id: usize) -> Option<(String, usize)> {
        if !self.has_node(id) {
            return None;
        }
        match &self.translation {
            None => Some((id.to_string(), 0)),
            Some(translation) => {
                let (index, range) = translation.node_to_segment(id)?;
                let offset: usize = (range.start..id)
                    .filter_map(|node| self.get_length(node))
                    .sum();
                Some((translation.segment_name(index).to_string(), offset))
            }
        }
    }
}

/// Returns the node id for a segment name that can be used as an id as such:
/// a positive integer in canonical decimal form.
pub fn canonical_id(name: &str) -> Option<usize> {
    let id = name.parse::<usize>().ok()?;
    (id > 0 && name.as_bytes()[0] != b'0' && name.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

//-----------------------------------------------------------------------------

/// Translation from segment names to contiguous node id ranges.
///
/// Segment `i` covers node ids `mapping.select(i)..mapping.select(i + 1)`.
#[derive(Debug)]
pub struct Translation {
    segment_names: Vec<String>,
    by_name: HashMap<String, usize>,
    mapping: SparseVector,
    limit: usize,
}

impl Translation {
    pub fn len(&self) -> usize {
        self.segment_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_names.is_empty()
    }

    pub fn segment_name(&self, index: usize) -> &str {
        &self.segment_names[index]
    }

    pub fn segment_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Node ids of the segment with the given index.
    pub fn segment_range(&self, index: usize) -> Range<usize> {
        let mut iter = self.mapping.select_iter(index);
        let start = iter.next().map_or(self.limit, |(_, value)| value);
        let end = if index + 1 < self.len() {
            iter.next().map_or(self.limit, |(_, value)| value)
        } else {
            self.limit
        };
        start..end
    }

    pub fn segment_nodes(&self, name: &str) -> Option<Range<usize>> {
        self.segment_index(name).map(|index| self.segment_range(index))
    }

    /// Segment index and node range for a node id.
    pub fn node_to_segment(&self, id: usize) -> Option<(usize, Range<usize>)> {
        if id == 0 || id >= self.limit || self.mapping.count_ones() == 0 {
            return None;
        }
        let (index, _) = self.mapping.predecessor(id).next()?;
        Some((index, self.segment_range(index)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        (0..self.len()).map(move |index| (self.segment_name(index), self.segment_range(index)))
    }
}

/// Collects segments in node id order and builds the sparse mapping.
#[derive(Debug)]
pub(crate) struct TranslationBuilder {
    segment_names: Vec<String>,
    by_name: HashMap<String, usize>,
    starts: Vec<usize>,
    next_id: usize,
}

impl TranslationBuilder {
    pub fn new() -> Self {
        TranslationBuilder {
            segment_names: Vec::new(),
            by_name: HashMap::new(),
            starts: Vec::new(),
            next_id: 1,
        }
    }

    /// Assigns the next `count` node ids to the segment.
    pub fn add_segment(&mut self, name: &str, count: usize) -> Range<usize> {
        let start = self.next_id;
        self.by_name.insert(name.to_string(), self.segment_names.len());
        self.segment_names.push(name.to_string());
        self.starts.push(start);
        self.next_id += count;
        start..self.next_id
    }

    pub fn finish(self) -> Result<Translation> {
        let mut builder = SparseBuilder::new(self.next_id, self.starts.len()).map_err(|e| {
            GraphError::parse(None, format!("cannot build segment translation: {}", e))
        })?;
        for &start in &self.starts {
            builder.set(start);
        }
        let mapping = SparseVector::try_from(builder).map_err(|e| {
            GraphError::parse(None, format!("cannot build segment translation: {}", e))
        })?;
        Ok(Translation {
            segment_names: self.segment_names,
            by_name: self.by_name,
            mapping,
            limit: self.next_id,
        })
    }
}
