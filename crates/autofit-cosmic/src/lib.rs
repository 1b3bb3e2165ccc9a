//! `cosmic-text` backed line measurement for `autofit`.
//!
//! # Design goals
//! - **Measurement only**: shapes and wraps text to answer [`autofit::LineMeasurer`] queries;
//!   no rasterization, no atlas.
//! - **Fresh layout per probe**: every query builds its own `Buffer` from the request, so
//!   nothing set up for one probe leaks into the next.
//!
//! # Current implementation
//! The `cosmic` feature provides [`cosmic::CosmicMeasurer`]. Fonts come from the system
//! font database, plus any font bytes loaded through
//! [`CosmicMeasurer::load_font_data`](cosmic::CosmicMeasurer::load_font_data).
//!
//! NOTE: Byte ranges are mapped back to the original text by paragraph. Bidirectional
//! runs are reported in visual order and are not supported by the fitter.

#![deny(warnings)]

#[cfg(feature = "cosmic")]
pub mod cosmic {
    //! `cosmic-text` implementation of line measurement.

    use autofit::{LineBreak, LineMeasurer, MeasureError, MeasureRequest, TextMetrics};
    use cosmic_text::{Attrs, Buffer, Family, FontSystem, LineEnding, LineIter, Metrics, Shaping};

    /// Byte span of one hard line (paragraph) of the source text.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct Paragraph {
        pub(crate) start: usize,
        /// End including the terminator
        pub(crate) end: usize,
    }

    /// Split text into paragraphs exactly as `Buffer::set_text` does, so `line_i` of a
    /// layout run indexes this table. Any of `\n`, `\r\n`, `\r` and `\n\r` ends a
    /// paragraph; text ending in a terminator (or empty text) gets an empty last one.
    pub(crate) fn paragraphs(text: &str) -> Vec<Paragraph> {
        let mut out = Vec::new();
        let mut last_ending = LineEnding::Lf;
        for (range, ending) in LineIter::new(text) {
            out.push(Paragraph {
                start: range.start,
                end: range.end + ending.as_str().len(),
            });
            last_ending = ending;
        }
        if last_ending != LineEnding::None {
            out.push(Paragraph {
                start: text.len(),
                end: text.len(),
            });
        }
        out
    }

    /// Natural line height as a fraction of the font size
    const LINE_HEIGHT_RATIO: f32 = 1.2;

    /// Measurer backed by `cosmic-text`.
    pub struct CosmicMeasurer {
        font_system: FontSystem,
        /// Family name to request; `None` uses the default sans-serif face
        family: Option<String>,
    }

    impl CosmicMeasurer {
        /// Create a measurer using the system fonts.
        pub fn new_default() -> Self {
            Self {
                font_system: FontSystem::new(),
                family: None,
            }
        }

        /// Load raw font bytes (TTF/OTF) into the font database.
        pub fn load_font_data(&mut self, data: Vec<u8>) {
            self.font_system.db_mut().load_font_data(data);
        }

        /// Prefer the given family name when shaping.
        pub fn with_family(mut self, family: impl Into<String>) -> Self {
            self.family = Some(family.into());
            self
        }

        /// Whether any font face is available to shape with.
        pub fn has_fonts(&self) -> bool {
            self.font_system.db().faces().next().is_some()
        }

        /// Shape `text` into a fresh buffer, wrapped to `width` when given.
        fn shape(
            &mut self,
            text: &str,
            font_size: f32,
            line_height: f32,
            width: Option<f32>,
        ) -> Result<Buffer, MeasureError> {
            if !self.has_fonts() {
                return Err(MeasureError::Backend("no fonts loaded".to_string()));
            }
            if !(font_size > 0.0 && line_height > 0.0) {
                return Err(MeasureError::Backend(format!(
                    "invalid metrics: size {font_size}, line height {line_height}"
                )));
            }

            let metrics = Metrics::new(font_size, line_height);
            let mut buffer = Buffer::new(&mut self.font_system, metrics);
            buffer.set_size(&mut self.font_system, width, None);

            let attrs = match &self.family {
                Some(name) => Attrs::new().family(Family::Name(name.as_str())),
                None => Attrs::new(),
            };
            buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut self.font_system, false);

            Ok(buffer)
        }

        fn layout(&mut self, request: &MeasureRequest<'_>) -> Result<Vec<LineBreak>, MeasureError> {
            let line_height = request.font_size * LINE_HEIGHT_RATIO * request.spacing_mult
                + request.spacing_add;
            let buffer = self.shape(
                request.text,
                request.font_size,
                line_height,
                Some(request.max_width),
            )?;

            let paragraphs = paragraphs(request.text);
            let text_len = request.text.len();

            // Paragraph index and line per visual line
            let mut lines: Vec<(usize, LineBreak)> = buffer
                .layout_runs()
                .map(|run| {
                    let offset = paragraphs.get(run.line_i).map_or(text_len, |p| p.start);
                    let start = run
                        .glyphs
                        .iter()
                        .map(|g| g.start.min(g.end))
                        .min()
                        .map_or(offset, |s| offset + s);
                    let line = LineBreak {
                        start,
                        end: start,
                        width: run.line_w,
                        top: run.line_top,
                        bottom: run.line_top + run.line_height,
                    };
                    (run.line_i, line)
                })
                .collect();

            // Make ranges contiguous: a wrapped line ends where the next one starts and
            // the last line of a paragraph owns its terminator
            for i in 0..lines.len() {
                let para = lines[i].0;
                let paragraph = paragraphs.get(para).copied();
                let first_in_paragraph = i == 0 || lines[i - 1].0 != para;
                let end = match lines.get(i + 1) {
                    Some(&(next_para, next)) if next_para == para => next.start,
                    _ => paragraph.map_or(text_len, |p| p.end),
                };

                let line = &mut lines[i].1;
                if let (true, Some(p)) = (first_in_paragraph, paragraph) {
                    line.start = p.start;
                }
                line.end = end.max(line.start);
            }

            log::trace!(
                "cosmic layout: {} lines at {}px wrapped to {}px",
                lines.len(),
                request.font_size,
                request.max_width
            );
            Ok(lines.into_iter().map(|(_, line)| line).collect())
        }
    }

    impl LineMeasurer for CosmicMeasurer {
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
            if text.is_empty() {
                return Ok(0.0);
            }
            let buffer = self.shape(text, font_size, font_size * LINE_HEIGHT_RATIO, None)?;
            Ok(buffer
                .layout_runs()
                .map(|run| run.line_w)
                .fold(0.0, f32::max))
        }
    }
}
