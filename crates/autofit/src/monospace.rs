//! Fixed-advance reference measurer.
//!
//! Every glyph advances by the same fraction of the font size and every line is the
//! same height, so results are exact and predictable. Useful for tests, headless tools
//! and as a fallback when no font backend is available.

use crate::measure::{LineBreak, LineMeasurer, MeasureError, MeasureRequest, TextMetrics};

/// Tab stops count as this many regular advances
const TAB_ADVANCES: f32 = 4.0;

/// Greedy word-wrapping measurer with a constant glyph advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Glyph advance as a fraction of the font size
    pub advance_ratio: f32,
    /// Natural line height as a fraction of the font size
    pub line_height_ratio: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl MonospaceMeasurer {
    pub fn new(advance_ratio: f32, line_height_ratio: f32) -> Self {
        Self {
            advance_ratio,
            line_height_ratio,
        }
    }

    /// Height of one line box for the given probe
    pub fn line_height(&self, request: &MeasureRequest<'_>) -> f32 {
        request.font_size * self.line_height_ratio * request.spacing_mult + request.spacing_add
    }

    fn advance(&self, ch: char, font_size: f32) -> Result<f32, MeasureError> {
        let unit = font_size * self.advance_ratio;
        match ch {
            '\n' | '\r' => Ok(0.0),
            '\t' => Ok(unit * TAB_ADVANCES),
            c if c.is_control() => Err(MeasureError::UnmeasurableGlyph(c)),
            _ => Ok(unit),
        }
    }

    fn run_width(&self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        text.chars()
            .try_fold(0.0, |width, ch| Ok(width + self.advance(ch, font_size)?))
    }

    /// Wrap one paragraph (without its terminator) and append its line ranges.
    ///
    /// Whitespace hangs at the end of a line and never forces a break. A word wider than
    /// the line is broken between characters.
    fn wrap_paragraph(
        &self,
        content: &str,
        offset: usize,
        request: &MeasureRequest<'_>,
        out: &mut Vec<(usize, usize, f32)>,
    ) -> Result<(), MeasureError> {
        let mut line_start = 0;
        let mut width = 0.0;
        // Byte index just past the last whitespace run on the current line
        let mut last_break: Option<usize> = None;

        for (i, ch) in content.char_indices() {
            let advance = self.advance(ch, request.font_size)?;

            if ch.is_whitespace() {
                width += advance;
                last_break = Some(i + ch.len_utf8());
                continue;
            }

            if width + advance > request.max_width && i > line_start {
                let break_at = last_break.filter(|&b| b > line_start).unwrap_or(i);
                let line = &content[line_start..break_at];
                let line_width = self.run_width(line.trim_end(), request.font_size)?;
                out.push((offset + line_start, offset + break_at, line_width));

                line_start = break_at;
                width = self.run_width(&content[line_start..i], request.font_size)?;
                last_break = None;
            }

            width += advance;
        }

        let line_width = self.run_width(content[line_start..].trim_end(), request.font_size)?;
        out.push((offset + line_start, offset + content.len(), line_width));
        Ok(())
    }

    fn layout(&self, request: &MeasureRequest<'_>) -> Result<Vec<LineBreak>, MeasureError> {
        let mut ranges = Vec::new();
        let mut offset = 0;

        for paragraph in request.text.split_inclusive('\n') {
            let content = paragraph.trim_end_matches(|c: char| c == '\n' || c == '\r');
            self.wrap_paragraph(content, offset, request, &mut ranges)?;

            // The paragraph's last line owns its terminator
            if let Some(last) = ranges.last_mut() {
                last.1 = offset + paragraph.len();
            }
            offset += paragraph.len();
        }

        // A trailing newline opens one more, empty line
        if request.text.is_empty() || request.text.ends_with('\n') {
            ranges.push((offset, offset, 0.0));
        }

        let line_height = self.line_height(request);
        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(index, (start, end, width))| LineBreak {
                start,
                end,
                width,
                top: index as f32 * line_height,
                bottom: (index + 1) as f32 * line_height,
            })
            .collect())
    }
}

impl LineMeasurer for MonospaceMeasurer {
    fn measure(&mut self, request: MeasureRequest<'_>) -> Result<TextMetrics, MeasureError> {
        let lines = self.layout(&request)?;
        let height = lines.last().map(|line| line.bottom).unwrap_or_default();
        Ok(TextMetrics::new(lines.len(), height))
    }

    fn break_lines(
        &mut self,
        request: MeasureRequest<'_>,
    ) -> Result<Vec<LineBreak>, MeasureError> {
        self.layout(&request)
    }

    fn text_width(&mut self, text: &str, font_size: f32) -> Result<f32, MeasureError> {
        self.run_width(text, font_size)
    }
}
