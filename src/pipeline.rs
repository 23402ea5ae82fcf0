use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::contacts::{ContactSource, InteractionTypes};
use crate::error::Result;
use crate::filter::{filter_contacts_with_progress, progress_bar, FrameSet};
use crate::labels::resolve_labels;
use crate::patterns::PatternSet;
use crate::report::write_frames_table;
use crate::trace::{write_trace, OutputFormat};

/// Everything one trace run needs
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub input_contacts: Vec<PathBuf>,
    pub interactions: Vec<String>,
    pub trace_output: PathBuf,
    pub labels: Option<Vec<String>>,
    pub frames_output: Option<PathBuf>,
    pub show_progress: bool,
}

impl TraceConfig {
    pub fn new(
        input_contacts: Vec<PathBuf>,
        interactions: Vec<String>,
        trace_output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_contacts,
            interactions,
            trace_output: trace_output.into(),
            labels: None,
            frames_output: None,
            show_progress: false,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct TraceOutcome {
    pub labels: Vec<String>,
    pub frame_sets: Vec<FrameSet>,
    pub frame_count: usize,
}

/// Compile patterns, resolve labels, parse every contact file, filter and
/// render.
///
/// All argument validation happens before the first contact file is opened,
/// and nothing is written unless every stage succeeded.
pub fn run(config: &TraceConfig) -> Result<TraceOutcome> {
    let patterns = PatternSet::compile(&config.interactions)?;

    let file_names: Vec<String> = config
        .input_contacts
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let labels = resolve_labels(
        config.labels.as_deref(),
        &file_names,
        &config.interactions,
    )?;
    OutputFormat::from_path(&config.trace_output)?;

    let itypes = InteractionTypes::all();
    let sources = config
        .input_contacts
        .iter()
        .map(|path| ContactSource::load(path, &itypes))
        .collect::<Result<Vec<_>>>()?;
    let frame_count = sources
        .iter()
        .map(ContactSource::frame_span)
        .max()
        .unwrap_or(0);
    info!(
        files = sources.len(),
        contacts = sources.iter().map(|s| s.contacts.len()).sum::<usize>(),
        frame_count,
        "Parsed contact files."
    );

    let pb = progress_bar(config.show_progress);
    let frame_sets = filter_contacts_with_progress(&sources, &patterns, &pb);
    for (label, frames) in labels.iter().zip(&frame_sets) {
        debug!(label = label.as_str(), active = frames.len(), "Trace ready.");
    }

    // Table first; a failed trace removes it again so no partial output remains.
    if let Some(path) = &config.frames_output {
        write_frames_table(&frame_sets, &labels, path)?;
        info!(output = %path.display(), "Frames table written.");
    }
    if let Err(e) = write_trace(&frame_sets, &labels, frame_count, &config.trace_output) {
        if let Some(path) = &config.frames_output {
            if let Err(cleanup) = std::fs::remove_file(path) {
                warn!(output = %path.display(), error = %cleanup, "Failed to remove frames table.");
            }
        }
        return Err(e);
    }

    Ok(TraceOutcome {
        labels,
        frame_sets,
        frame_count,
    })
}
