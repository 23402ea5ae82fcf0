use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::contacts::Frame;
use crate::error::{Result, TraceError};
use crate::filter::FrameSet;
use crate::glyphs;

const MARGIN: i32 = 16;
const TEXT_SCALE: i32 = 2;
const MAX_LABEL_WIDTH: i32 = 480;
const LABEL_GAP: i32 = 12;
const PLOT_WIDTH: i32 = 800;
const ROW_HEIGHT: i32 = 28;
const BAR_HEIGHT: i32 = 18;
const AXIS_HEIGHT: i32 = 36;
const TICK_LENGTH: i32 = 5;
const TARGET_TICKS: usize = 8;

const ACTIVE: RGBColor = RGBColor(31, 119, 180);
const INACTIVE: RGBColor = RGBColor(232, 232, 232);
const AXIS: RGBColor = RGBColor(80, 80, 80);

/// Image format of the trace output, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("svg") => Ok(Self::Svg),
            _ => Err(TraceError::UnsupportedOutputFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// One horizontal trace
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub label: String,
    pub runs: Vec<(Frame, Frame)>,
}

/// Pixel layout of a stacked trace plot
#[derive(Debug, Clone)]
pub struct TraceLayout {
    pub frame_count: usize,
    pub rows: Vec<TraceRow>,
    label_width: i32,
}

impl TraceLayout {
    /// Pair every FrameSet with its label.
    ///
    /// `frame_count` is the length of the observed range; it is widened to
    /// cover the last active frame of every set.
    pub fn new(frame_sets: &[FrameSet], labels: &[String], frame_count: usize) -> Result<Self> {
        if frame_sets.len() != labels.len() {
            return Err(TraceError::RenderPrecondition {
                frame_sets: frame_sets.len(),
                labels: labels.len(),
            });
        }

        let frame_count = frame_sets
            .iter()
            .filter_map(FrameSet::last)
            .map(|f| f + 1)
            .fold(frame_count, usize::max)
            .max(1);

        let rows: Vec<TraceRow> = frame_sets
            .iter()
            .zip(labels)
            .map(|(frames, label)| TraceRow {
                label: glyphs::fit_text(label, MAX_LABEL_WIDTH, TEXT_SCALE),
                runs: frames.runs(),
            })
            .collect();

        let label_width = rows
            .iter()
            .map(|r| glyphs::text_width(&r.label, TEXT_SCALE))
            .max()
            .unwrap_or(0);

        Ok(Self {
            frame_count,
            rows,
            label_width,
        })
    }

    pub fn image_size(&self) -> (u32, u32) {
        let width = MARGIN + self.label_width + LABEL_GAP + PLOT_WIDTH + MARGIN;
        let height = MARGIN + self.rows.len() as i32 * ROW_HEIGHT + AXIS_HEIGHT + MARGIN;
        (width as u32, height as u32)
    }

    fn plot_x0(&self) -> i32 {
        MARGIN + self.label_width + LABEL_GAP
    }

    /// Left pixel edge of `frame`
    pub fn frame_to_x(&self, frame: Frame) -> i32 {
        let offset = frame as i64 * PLOT_WIDTH as i64 / self.frame_count as i64;
        self.plot_x0() + offset as i32
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        area.fill(&WHITE)?;

        let plot_x0 = self.plot_x0();
        let plot_x1 = plot_x0 + PLOT_WIDTH;
        let text_height = glyphs::GLYPH_HEIGHT * TEXT_SCALE;

        for (i, row) in self.rows.iter().enumerate() {
            let top = MARGIN + i as i32 * ROW_HEIGHT + (ROW_HEIGHT - BAR_HEIGHT) / 2;
            let bottom = top + BAR_HEIGHT;

            let label_x = MARGIN + self.label_width - glyphs::text_width(&row.label, TEXT_SCALE);
            let label_y = top + (BAR_HEIGHT - text_height) / 2;
            glyphs::draw_text(area, &row.label, (label_x, label_y), TEXT_SCALE, &BLACK)?;

            area.draw(&Rectangle::new([(plot_x0, top), (plot_x1, bottom)], INACTIVE.filled()))?;
            for &(start, end) in &row.runs {
                let x0 = self.frame_to_x(start);
                let x1 = self.frame_to_x(end).max(x0 + 1);
                area.draw(&Rectangle::new([(x0, top), (x1, bottom)], ACTIVE.filled()))?;
            }
        }

        let axis_y = MARGIN + self.rows.len() as i32 * ROW_HEIGHT + 4;
        area.draw(&PathElement::new(vec![(plot_x0, axis_y), (plot_x1, axis_y)], AXIS))?;

        let step = tick_step(self.frame_count);
        for tick in (0..=self.frame_count).step_by(step) {
            let x = self.frame_to_x(tick);
            area.draw(&PathElement::new(
                vec![(x, axis_y), (x, axis_y + TICK_LENGTH)],
                AXIS,
            ))?;
            let text = tick.to_string();
            let text_x = x - glyphs::text_width(&text, TEXT_SCALE) / 2;
            glyphs::draw_text(area, &text, (text_x, axis_y + TICK_LENGTH + 4), TEXT_SCALE, &AXIS)?;
        }

        let caption = "frame";
        let caption_x = plot_x0 + (PLOT_WIDTH - glyphs::text_width(caption, TEXT_SCALE)) / 2;
        let caption_y = axis_y + TICK_LENGTH + 8 + text_height;
        glyphs::draw_text(area, caption, (caption_x, caption_y), TEXT_SCALE, &AXIS)?;

        Ok(())
    }
}

/// Distance between axis ticks: 1, 2 or 5 times a power of ten.
pub fn tick_step(frame_count: usize) -> usize {
    let raw = (frame_count / TARGET_TICKS).max(1);
    let mut magnitude = 1usize;
    while magnitude * 10 <= raw {
        magnitude *= 10;
    }
    [1, 2, 5, 10]
        .iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw)
        .unwrap_or(magnitude * 10)
}

fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> TraceError {
    TraceError::Render(e.to_string())
}

/// Render one trace per (FrameSet, label) pair, stacked in input order, and
/// write the image to `output`.
pub fn write_trace(
    frame_sets: &[FrameSet],
    labels: &[String],
    frame_count: usize,
    output: &Path,
) -> Result<()> {
    let layout = TraceLayout::new(frame_sets, labels, frame_count)?;
    let format = OutputFormat::from_path(output)?;
    let size = layout.image_size();

    match format {
        OutputFormat::Png => {
            let root = BitMapBackend::new(output, size).into_drawing_area();
            layout.draw(&root).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
        OutputFormat::Svg => {
            let root = SVGBackend::new(output, size).into_drawing_area();
            layout.draw(&root).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
    }

    info!(
        output = %output.display(),
        traces = layout.rows.len(),
        frames = layout.frame_count,
        "Trace written."
    );
    Ok(())
}
