use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraceError>;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Interactions must be valid space-separated regular expressions: '{pattern}' has {tokens} token(s), expected 2")]
    MalformedPattern { pattern: String, tokens: usize },

    #[error("Invalid atom selector '{pattern}': {source}")]
    InvalidSelector {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Only specified {given} labels (should be {expected}) which doesn't match {patterns} interaction patterns across {files} files")]
    LabelCountMismatch {
        given: usize,
        expected: usize,
        patterns: usize,
        files: usize,
    },

    #[error("Internal error: {frame_sets} frame sets but {labels} labels at render time")]
    RenderPrecondition { frame_sets: usize, labels: usize },

    #[error("Failed to parse contact file '{path}' at line {line}: {message}", path = path.display())]
    ContactParse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Unsupported trace output '{path}': extension must be png or svg", path = path.display())]
    UnsupportedOutputFormat { path: PathBuf },

    #[error("Failed to render trace: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
