// src/path_name.rs

// Path name parsing: regex submatches mapped to GBWT path name components.

use regex::Regex;

use crate::error::{GraphError, Result};

/// Path name component that a regex submatch can be assigned to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathField {
    Sample,
    Contig,
    Haplotype,
    Fragment,
}

impl PathField {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' => Some(PathField::Sample),
            'c' => Some(PathField::Contig),
            'h' => Some(PathField::Haplotype),
            'f' => Some(PathField::Fragment),
            _ => None,
        }
    }
}

/// Metadata extracted from a path name or a walk line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathMetadata {
    pub sample: Option<String>,
    pub contig: Option<String>,
    pub haplotype: Option<usize>,
    pub fragment: Option<usize>,
}

/// Validated path name configuration. Built once and applied to every
/// P-line name.
#[derive(Clone, Debug)]
pub struct PathNameParser {
    regex: Regex,
    // (submatch index, component)
    fields: Vec<(usize, PathField)>,
}

impl PathNameParser {
    pub fn new(pattern: &str, fields: &str) -> Result<Self> {
        // Anchor without introducing a capture group, so submatch numbering
        // stays the same as in the user's pattern.
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        let submatches = regex.captures_len();
        let field_count = fields.chars().count();
        if field_count > submatches {
            return Err(GraphError::config(format!(
                "field string '{}' has {} fields but regex '{}' has only {} submatches",
                fields, field_count, pattern, submatches
            )));
        }

        let mut mapping: Vec<(usize, PathField)> = Vec::new();
        for (index, c) in fields.chars().enumerate() {
            let Some(field) = PathField::from_char(c) else {
                continue;
            };
            if mapping.iter().any(|(_, used)| *used == field) {
                return Err(GraphError::config(format!(
                    "path name component '{}' assigned more than once in '{}'",
                    c, fields
                )));
            }
            mapping.push((index, field));
        }

        Ok(PathNameParser {
            regex,
            fields: mapping,
        })
    }

    pub fn fields(&self) -> &[(usize, PathField)] {
        &self.fields
    }

    /// Parses the name of a path. The regex must match the entire name.
    ///
    /// Without a sample submatch the whole path name becomes the sample.
    pub fn parse(&self, name: &str) -> Result<PathMetadata> {
        let captures = self.regex.captures(name).ok_or_else(|| {
            GraphError::parse(
                None,
                format!("path name '{}' does not match the path name regex", name),
            )
        })?;

        let mut metadata = PathMetadata::default();
        for &(index, field) in &self.fields {
            let Some(value) = captures.get(index).map(|m| m.as_str()) else {
                continue;
            };
            match field {
                PathField::Sample => metadata.sample = Some(value.to_string()),
                PathField::Contig => metadata.contig = Some(value.to_string()),
                PathField::Haplotype => {
                    metadata.haplotype = Some(parse_number(name, "haplotype", value)?)
                }
                PathField::Fragment => {
                    metadata.fragment = Some(parse_number(name, "fragment", value)?)
                }
            }
        }
        if metadata.sample.is_none() {
            metadata.sample = Some(name.to_string());
        }
        Ok(metadata)
    }
}

fn parse_number(name: &str, what: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| {
        GraphError::parse(
            None,
            format!(
                "{} field '{}' of path '{}' is not a non-negative integer",
                what, value, name
            ),
        )
    })
}
