use std::path::Path;

use serde::Serialize;

use crate::error::{Result, TraceError};
use crate::filter::FrameSet;

/// One row of the frames table
#[derive(Debug, Serialize)]
struct FramesRow<'a> {
    label: &'a str,
    active_frames: usize,
    frames: String,
}

/// Save the frames of every trace as a tab-separated table
/// (`label, active_frames, frames`), frames comma-joined.
pub fn write_frames_table(
    frame_sets: &[FrameSet],
    labels: &[String],
    output_path: &Path,
) -> Result<()> {
    if frame_sets.len() != labels.len() {
        return Err(TraceError::RenderPrecondition {
            frame_sets: frame_sets.len(),
            labels: labels.len(),
        });
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)?;

    for (frames, label) in frame_sets.iter().zip(labels) {
        writer.serialize(FramesRow {
            label,
            active_frames: frames.len(),
            frames: frames
                .frames()
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(","),
        })?;
    }

    writer.flush()?;
    Ok(())
}
