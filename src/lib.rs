pub mod contacts;
pub mod error;
pub mod filter;
pub mod glyphs;
pub mod labels;
pub mod logging;
pub mod patterns;
pub mod pipeline;
pub mod report;
pub mod trace;

// Re-export commonly used types and functions
pub use contacts::{ContactList, ContactRecord, ContactSource, Frame, InteractionTypes};
pub use error::{Result, TraceError};
pub use filter::{filter_contacts, frames_matching, FrameSet};
pub use labels::resolve_labels;
pub use patterns::{AtomSelector, InteractionPattern, PatternSet};
pub use pipeline::{run, TraceConfig, TraceOutcome};
pub use trace::{write_trace, OutputFormat};
