// src/gfa.rs

// Memory-mapped GFA input and record-level parsing of S-, P- and W-lines.
//
// Link lines are recognized but never parsed: edges are derived from the
// paths. This assumes that links and paths do not overlap segments and that
// there are no containments.

use std::fs::File;
use std::path::{Path, PathBuf};

use memchr::memchr;
use memmap2::{Mmap, MmapOptions};

use crate::error::{GraphError, Result};

/// A GFA file mapped into memory. Each construction pass iterates over all
/// lines with [`GfaFile::lines`].
pub struct GfaFile {
    path: PathBuf,
    mmap: Mmap,
}

impl GfaFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        if file.metadata()?.len() == 0 {
            return Err(GraphError::parse(
                None,
                format!("GFA file '{}' is empty", path.display()),
            ));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(GfaFile { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file in bytes.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn lines(&self) -> LineIter<'_> {
        LineIter {
            data: &self.mmap,
            offset: 0,
            line: 0,
        }
    }
}

/// A line without its terminator, with its 1-based line number and the byte
/// offset of the next line.
#[derive(Copy, Clone, Debug)]
pub struct Line<'a> {
    pub number: usize,
    pub bytes: &'a [u8],
    pub end: usize,
}

impl<'a> Line<'a> {
    pub fn record_type(&self) -> Option<u8> {
        self.bytes.first().copied()
    }
}

pub struct LineIter<'a> {
    data: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> Iterator for LineIter<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.offset..];
        let (mut bytes, advance) = match memchr(b'\n', rest) {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        if let Some((&b'\r', head)) = bytes.split_last() {
            bytes = head;
        }
        self.offset += advance;
        self.line += 1;
        Some(Line {
            number: self.line,
            bytes,
            end: self.offset,
        })
    }
}

/// Tab-separated fields of a line.
pub fn fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|&b| b == b'\t')
}

fn utf8<'a>(bytes: &'a [u8], what: &str) -> Result<&'a str> {
    std::str::from_utf8(bytes)
        .map_err(|_| GraphError::parse(None, format!("{} is not valid UTF-8", what)))
}

//-----------------------------------------------------------------------------

/// Segment line: `S <name> <sequence> [tags]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentRecord<'a> {
    pub name: &'a str,
    /// `None` if the sequence field is `*`.
    pub sequence: Option<&'a [u8]>,
    /// Value of the `LN:i:` tag, if present.
    pub length_tag: Option<usize>,
}

impl<'a> SegmentRecord<'a> {
    pub fn parse(line: &'a [u8]) -> Result<Self> {
        let mut iter = fields(line);
        let _ = iter.next();
        let name = iter
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GraphError::parse(None, "segment line without a name"))?;
        let name = utf8(name, "segment name")?;

        let sequence = match iter.next() {
            Some(b"*") | Some(b"") | None => None,
            Some(seq) => Some(seq),
        };

        let mut length_tag = None;
        for tag in iter {
            if let Some(value) = tag.strip_prefix(b"LN:i:") {
                let value = utf8(value, "LN tag")?;
                let len = value.parse::<usize>().map_err(|_| {
                    GraphError::parse(
                        None,
                        format!("invalid LN tag '{}' for segment {}", value, name),
                    )
                })?;
                length_tag = Some(len);
            }
        }

        Ok(SegmentRecord {
            name,
            sequence,
            length_tag,
        })
    }

    /// Segment length from the sequence, or from the `LN` tag when the
    /// sequence is missing.
    pub fn len(&self) -> Result<usize> {
        match (self.sequence, self.length_tag) {
            (Some(seq), Some(len)) if seq.len() != len => Err(GraphError::parse(
                None,
                format!(
                    "segment {} has sequence length {} but LN:i:{}",
                    self.name,
                    seq.len(),
                    len
                ),
            )),
            (Some(seq), _) => Ok(seq.len()),
            (None, Some(len)) => Ok(len),
            (None, None) => Err(GraphError::parse(
                None,
                format!("segment {} has neither a sequence nor a length", self.name),
            )),
        }
    }
}

//-----------------------------------------------------------------------------

/// Path line: `P <name> <steps> [overlaps]`, with steps such as `11+,12-`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathRecord<'a> {
    pub name: &'a str,
    pub steps: Vec<(&'a str, bool)>,
}

impl<'a> PathRecord<'a> {
    pub fn parse(line: &'a [u8]) -> Result<Self> {
        let mut iter = fields(line);
        let _ = iter.next();
        let name = iter
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GraphError::parse(None, "path line without a name"))?;
        let name = utf8(name, "path name")?;
        let steps_field = iter
            .next()
            .ok_or_else(|| GraphError::parse(None, format!("path {} has no steps", name)))?;
        let steps_field = utf8(steps_field, "path steps")?;

        let mut steps = Vec::new();
        for step in steps_field.split(',') {
            let (segment, is_reverse) = if let Some(segment) = step.strip_suffix('+') {
                (segment, false)
            } else if let Some(segment) = step.strip_suffix('-') {
                (segment, true)
            } else {
                return Err(GraphError::parse(
                    None,
                    format!("invalid step '{}' in path {}", step, name),
                ));
            };
            if segment.is_empty() {
                return Err(GraphError::parse(
                    None,
                    format!("empty segment name in path {}", name),
                ));
            }
            steps.push((segment, is_reverse));
        }

        Ok(PathRecord { name, steps })
    }
}

/// Walk line: `W <sample> <haplotype> <contig> <start> <end> <walk>`, with
/// walks such as `>11<12`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkRecord<'a> {
    pub sample: &'a str,
    pub haplotype: usize,
    pub contig: &'a str,
    pub start: Option<usize>,
    pub steps: Vec<(&'a str, bool)>,
}

impl<'a> WalkRecord<'a> {
    pub fn parse(line: &'a [u8]) -> Result<Self> {
        let mut iter = fields(line);
        let _ = iter.next();
        let mut next = |what: &str| -> Result<&'a str> {
            let field = iter
                .next()
                .ok_or_else(|| GraphError::parse(None, format!("walk line without {}", what)))?;
            utf8(field, what)
        };
        let sample = next("sample name")?;
        let haplotype = next("haplotype")?;
        let contig = next("contig name")?;
        let start = next("start position")?;
        let _end = next("end position")?;
        let walk = next("walk")?;

        let haplotype = haplotype.parse::<usize>().map_err(|_| {
            GraphError::parse(None, format!("invalid haplotype '{}' in walk line", haplotype))
        })?;
        let start = match start {
            "*" => None,
            value => Some(value.parse::<usize>().map_err(|_| {
                GraphError::parse(None, format!("invalid start '{}' in walk line", value))
            })?),
        };

        let mut steps = Vec::new();
        let bytes = walk.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            let is_reverse = match bytes[pos] {
                b'>' => false,
                b'<' => true,
                _ => {
                    return Err(GraphError::parse(
                        None,
                        format!("invalid walk '{}' for sample {}", walk, sample),
                    ))
                }
            };
            let begin = pos + 1;
            let mut end = begin;
            while end < bytes.len() && bytes[end] != b'>' && bytes[end] != b'<' {
                end += 1;
            }
            if end == begin {
                return Err(GraphError::parse(
                    None,
                    format!("empty segment name in walk for sample {}", sample),
                ));
            }
            steps.push((&walk[begin..end], is_reverse));
            pos = end;
        }

        Ok(WalkRecord {
            sample,
            haplotype,
            contig,
            start,
            steps,
        })
    }
}
