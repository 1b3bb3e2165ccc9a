//! Line measurement for font-size fitting.
//!
//! This module provides a backend-agnostic trait for measuring how much room a block
//! of text needs at a given font size when wrapped to a fixed width. The fitter probes
//! it repeatedly while searching for the largest size that fits.

use thiserror::Error;

/// Immutable snapshot describing a single measurement probe.
///
/// Every probe gets its own copy so a measurer cannot carry state from one probe into
/// the next through the request.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest<'a> {
    pub text: &'a str,
    pub font_size: f32,
    /// Width the text is wrapped to, in pixels
    pub max_width: f32,
    /// Line height multiplier applied on top of the backend's natural line height
    pub spacing_mult: f32,
    /// Extra pixels added to every line
    pub spacing_add: f32,
}

impl<'a> MeasureRequest<'a> {
    pub fn new(text: &'a str, font_size: f32, max_width: f32) -> Self {
        Self {
            text,
            font_size,
            max_width,
            spacing_mult: 1.0,
            spacing_add: 0.0,
        }
    }

    /// Set the line spacing parameters
    pub fn with_spacing(mut self, mult: f32, add: f32) -> Self {
        self.spacing_mult = mult;
        self.spacing_add = add;
        self
    }

    /// Same probe at a different font size
    pub fn at_size(self, font_size: f32) -> Self {
        Self { font_size, ..self }
    }
}

/// Result of wrapping text to a width.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub line_count: usize,
    /// Total height of all wrapped lines, in pixels
    pub height: f32,
}

impl TextMetrics {
    pub const fn new(line_count: usize, height: f32) -> Self {
        Self { line_count, height }
    }
}

/// One wrapped line of a line-break layout.
///
/// `start..end` is a byte range into the measured text. `end` may include a trailing
/// line terminator or the whitespace the line was broken at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineBreak {
    pub start: usize,
    pub end: usize,
    /// Rendered width of the line, in pixels
    pub width: f32,
    /// Top edge of the line box
    pub top: f32,
    /// Bottom edge of the line box
    pub bottom: f32,
}

/// Failure reported by a measurement backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("glyph {0:?} cannot be measured")]
    UnmeasurableGlyph(char),
    #[error("measurement backend failed: {0}")]
    Backend(String),
}

/// Backend-agnostic line measurement.
///
/// Implementors wrap text to `max_width` and report line counts, heights and line
/// ranges. The fitter assumes rendered height is non-increasing as the font size
/// shrinks, and that a line's width never decreases when characters are appended.
///
/// Measurers may keep internal caches, hence `&mut self`, but each answer must depend
/// only on the request it was given.
pub trait LineMeasurer {
    /// Wrap the text and report its line count and total height.
    fn measure(&mut self, request: MeasureRequest<'_>) -> Result<TextMetrics, MeasureError>;

    /// Wrap the text and report every line's byte range, width and vertical extent.
    fn break_lines(&mut self, request: MeasureRequest<'_>)
        -> Result<Vec<LineBreak>, MeasureError>;

    /// Width of `text` laid out as a single unwrapped run.
    fn text_width(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError>;

    /// Width of a single glyph.
    fn glyph_width(&mut self, ch: char, font_size: f32) -> Result<f32, MeasureError> {
        let mut buf = [0u8; 4];
        self.text_width(ch.encode_utf8(&mut buf), font_size)
    }
}

impl<M: LineMeasurer + ?Sized> LineMeasurer for &mut M {
    fn measure(&mut self, request: MeasureRequest<'_>) -> Result<TextMetrics, MeasureError> {
        (**self).measure(request)
    }

    fn break_lines(
        &mut self,
        request: MeasureRequest<'_>,
    ) -> Result<Vec<LineBreak>, MeasureError> {
        (**self).break_lines(request)
    }

    fn text_width(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        (**self).text_width(text, font_size)
    }

    fn glyph_width(&mut self, ch: char, font_size: f32) -> Result<f32, MeasureError> {
        (**self).glyph_width(ch, font_size)
    }
}
