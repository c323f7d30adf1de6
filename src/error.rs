// src/error.rs

// Error type shared by the construction pipeline.

use std::{error, fmt, io};

pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while configuring or running GFA to GBWT construction.
///
/// Graph algorithms never return these; structural findings such as cycles
/// are reported through empty results instead.
#[derive(Debug)]
pub enum GraphError {
    /// Invalid parameters or path name configuration. Detected before the
    /// input file is opened, except for node ids too wide for `node_width`.
    Config(String),
    /// Malformed or inconsistent input. `line` is the 1-based line number in
    /// the GFA file when the problem can be tied to a single line.
    Parse { line: Option<usize>, message: String },
    /// Wrapper for an IO error.
    Io(io::Error),
}

impl GraphError {
    pub fn config(message: impl Into<String>) -> Self {
        GraphError::Config(message.into())
    }

    pub fn parse(line: Option<usize>, message: impl Into<String>) -> Self {
        GraphError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Attaches a line number to a parse error that does not have one yet.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            GraphError::Parse { line: None, message } => GraphError::Parse {
                line: Some(line),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Config(message) => write!(f, "Invalid configuration: {}", message),
            GraphError::Parse {
                line: Some(line),
                message,
            } => write!(f, "GFA parse error on line {}: {}", line, message),
            GraphError::Parse { line: None, message } => {
                write!(f, "GFA parse error: {}", message)
            }
            GraphError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl error::Error for GraphError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            GraphError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GraphError {
    fn from(err: io::Error) -> Self {
        GraphError::Io(err)
    }
}

impl From<regex::Error> for GraphError {
    fn from(err: regex::Error) -> Self {
        GraphError::Config(format!("invalid path name regex: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_attached_once() {
        let err = GraphError::parse(None, "bad step").at_line(7).at_line(9);
        assert_eq!(err.to_string(), "GFA parse error on line 7: bad step");
    }

    #[test]
    fn config_errors_ignore_line_numbers() {
        let err = GraphError::config("duplicate field").at_line(3);
        assert!(matches!(err, GraphError::Config(_)));
    }
}
