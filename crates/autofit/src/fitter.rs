//! Font size fitting.
//!
//! [`TextFitter::fit`] picks the largest font size on a fixed grid at which a block of
//! text, wrapped to the bounding width, stays within the bounding height:
//!
//! 1. **Shrink**: step down from the maximum size until the text fits or the minimum
//!    is reached.
//! 2. **Grow back**: only when the text now needs fewer lines than at the previous fit
//!    (and more than the threshold recorded at the maximum size), or when the bounds
//!    changed, walk upward again from the shrunk size and step back one increment.
//! 3. **Truncate**: if the text still overflows at the minimum size, cut it after the
//!    last visible line and end it with an ellipsis.
//!
//! The hysteresis in step 2 relies on a [`FitterState`] owned by the caller and threaded
//! through every call.

use thiserror::Error;

use crate::config::{FitConfig, SearchStrategy};
use crate::ellipsis::truncate_with_ellipsis;
use crate::measure::{LineMeasurer, MeasureError, MeasureRequest, TextMetrics};
use crate::state::FitterState;

/// Input of a single fit
#[derive(Debug, Clone, Copy)]
pub struct FitRequest<'a> {
    pub text: &'a str,
    pub bounding_width: f32,
    pub bounding_height: f32,
    /// Size configured on the surface; zero disables fitting
    pub current_font_size: f32,
    /// Size applied by the previous fit, returned as-is when the fit declines to act
    pub previous_font_size: f32,
}

impl<'a> FitRequest<'a> {
    pub fn new(text: &'a str, bounding_width: f32, bounding_height: f32) -> Self {
        Self {
            text,
            bounding_width,
            bounding_height,
            current_font_size: crate::config::DEFAULT_MAX_SIZE,
            previous_font_size: crate::config::DEFAULT_MAX_SIZE,
        }
    }

    /// Set the configured and previously applied font sizes
    pub fn with_font_sizes(mut self, current: f32, previous: f32) -> Self {
        self.current_font_size = current;
        self.previous_font_size = previous;
        self
    }

    /// Whether there is anything to fit into a usable box
    pub fn is_fittable(&self) -> bool {
        !self.text.is_empty()
            && self.bounding_width > 0.0
            && self.bounding_height > 0.0
            && self.bounding_width.is_finite()
            && self.bounding_height.is_finite()
            && self.current_font_size > 0.0
    }
}

/// Outcome of a single fit
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub font_size: f32,
    /// Text to render; a prefix of the input plus an ellipsis when `truncated`
    pub display_text: String,
    pub truncated: bool,
}

impl FitResult {
    fn unchanged(request: &FitRequest<'_>) -> Self {
        Self {
            font_size: request.previous_font_size,
            display_text: request.text.to_string(),
            truncated: false,
        }
    }
}

/// Fit failure. The caller's [`FitterState`] is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("text measurement failed: {0}")]
    Measurement(#[from] MeasureError),
}

/// Measured candidate size
#[derive(Debug, Clone, Copy)]
struct Probe {
    size: f32,
    metrics: TextMetrics,
}

/// Finds the largest font size at which text fits a box.
///
/// The fitter itself is immutable; everything that changes between calls lives in the
/// [`FitterState`] passed to [`fit`](Self::fit).
#[derive(Debug, Clone, Default)]
pub struct TextFitter {
    config: FitConfig,
}

impl TextFitter {
    pub fn new(config: FitConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit `request.text` into the request's bounds.
    ///
    /// Declines to act (returning the previous size and the text unchanged) when the
    /// text is empty, a bound is not positive, or the configured size is zero. State is
    /// only written back when every measurement succeeded.
    pub fn fit<M: LineMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        request: &FitRequest<'_>,
        state: &mut FitterState,
    ) -> Result<FitResult, FitError> {
        if !request.is_fittable() {
            log::debug!(
                "skipping fit: {} bytes in {}x{}",
                request.text.len(),
                request.bounding_width,
                request.bounding_height
            );
            return Ok(FitResult::unchanged(request));
        }

        let config = &self.config;
        let bound = request.bounding_height;
        let base = MeasureRequest::new(request.text, config.max_size, request.bounding_width)
            .with_spacing(config.spacing_mult, config.spacing_add);
        let mut next = *state;

        let at_max = Probe {
            size: config.max_size,
            metrics: measurer.measure(base)?,
        };
        if at_max.metrics.height > bound {
            next.max_lines_before_shrink_only = at_max.metrics.line_count.saturating_sub(1);
        }

        let shrunk = match config.search {
            SearchStrategy::Linear => self.shrink_linear(measurer, base, bound, at_max)?,
            SearchStrategy::Bisect => self.shrink_bisect(measurer, base, bound, at_max)?,
        };
        let new_line_count = shrunk.metrics.line_count;

        let size_changed = next.take_size_change();
        let fewer_lines = next.last_line_count > new_line_count
            && new_line_count > next.max_lines_before_shrink_only;
        let chosen = if fewer_lines || size_changed {
            self.grow_back(measurer, base, bound, shrunk)?
        } else {
            shrunk
        };
        next.last_line_count = new_line_count;

        let overflows = chosen.metrics.height > bound;
        let (display_text, truncated) =
            if config.add_ellipsis && chosen.size == config.min_size && overflows {
                let text = truncate_with_ellipsis(
                    measurer,
                    base.at_size(config.min_size),
                    bound,
                    config.ellipsis,
                    config.trim,
                )?;
                (text, true)
            } else {
                (request.text.to_string(), false)
            };

        let font_size = if chosen.size >= config.max_size {
            config.max_size
        } else {
            chosen.size
        };

        log::debug!(
            "fit {} bytes into {}x{}: size {} ({} lines, last {}, threshold {}){}",
            request.text.len(),
            request.bounding_width,
            bound,
            font_size,
            new_line_count,
            state.last_line_count,
            next.max_lines_before_shrink_only,
            if truncated { ", truncated" } else { "" }
        );

        *state = next;
        Ok(FitResult {
            font_size,
            display_text,
            truncated,
        })
    }

    fn probe<M: LineMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        base: MeasureRequest<'_>,
        size: f32,
    ) -> Result<Probe, MeasureError> {
        let metrics = measurer.measure(base.at_size(size))?;
        log::trace!(
            "probe size {size}: {} lines, {}px",
            metrics.line_count,
            metrics.height
        );
        Ok(Probe { size, metrics })
    }

    /// Step down one increment at a time until the text fits or the minimum is reached
    fn shrink_linear<M: LineMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        base: MeasureRequest<'_>,
        bound: f32,
        at_max: Probe,
    ) -> Result<Probe, MeasureError> {
        let mut current = at_max;
        let mut index = 0;
        while current.metrics.height > bound && current.size > self.config.min_size {
            index += 1;
            current = self.probe(measurer, base, self.config.size_at(index))?;
        }
        Ok(current)
    }

    /// First fitting grid index by binary search, or the minimum if nothing fits
    fn shrink_bisect<M: LineMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        base: MeasureRequest<'_>,
        bound: f32,
        at_max: Probe,
    ) -> Result<Probe, MeasureError> {
        let steps = self.config.step_count();
        if at_max.metrics.height <= bound || steps == 0 {
            return Ok(at_max);
        }

        // Invariant: index lo - 1 overflows, index hi fits or is the minimum
        let (mut lo, mut hi) = (1, steps);
        let mut fitting: Option<Probe> = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let probe = self.probe(measurer, base, self.config.size_at(mid))?;
            if probe.metrics.height <= bound {
                hi = mid;
                fitting = Some(probe);
            } else {
                lo = mid + 1;
            }
        }

        let size = self.config.size_at(lo);
        match fitting {
            Some(probe) if probe.size == size => Ok(probe),
            _ => self.probe(measurer, base, size),
        }
    }

    /// Walk upward from the shrunk size while the text stays below the bound, then step
    /// back one increment.
    fn grow_back<M: LineMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        base: MeasureRequest<'_>,
        bound: f32,
        shrunk: Probe,
    ) -> Result<Probe, MeasureError> {
        let config = &self.config;
        let mut current = shrunk;
        while current.metrics.height < bound && current.size < config.max_size {
            let size = (current.size + config.step).min(config.max_size);
            current = self.probe(measurer, base, size)?;
        }

        let size = (current.size - config.step).clamp(config.min_size, config.max_size);
        log::debug!("grew back from {} to {}", shrunk.size, size);
        if size == shrunk.size {
            Ok(shrunk)
        } else {
            self.probe(measurer, base, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monospace::MonospaceMeasurer;

    /// Advance and line height both equal the font size
    fn unit() -> MonospaceMeasurer {
        MonospaceMeasurer::new(1.0, 1.0)
    }

    fn fit(
        fitter: &TextFitter,
        measurer: &mut MonospaceMeasurer,
        text: &str,
        width: f32,
        height: f32,
        state: &mut FitterState,
    ) -> FitResult {
        fitter
            .fit(measurer, &FitRequest::new(text, width, height), state)
            .unwrap()
    }

    #[test]
    fn test_short_text_fits_at_max() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState::new();

        let result = fit(&fitter, &mut measurer, "Hello world", 200.0, 100.0, &mut state);

        assert_eq!(result.font_size, 24.0);
        assert_eq!(result.display_text, "Hello world");
        assert!(!result.truncated);
        assert_eq!(state.last_line_count, 1);
    }

    #[test]
    fn test_shrinks_until_text_fits() {
        let fitter = TextFitter::default();
        let mut measurer = unit();
        let mut state = FitterState::new();

        // Three hard lines need 3 * size px, so 10px fits at 3.0 but not at 3.5
        let result = fit(&fitter, &mut measurer, "a\nb\nc", 100.0, 10.0, &mut state);

        assert_eq!(result.font_size, 3.0);
        assert_eq!(result.display_text, "a\nb\nc");
        assert_eq!(state.last_line_count, 3);
        assert_eq!(state.max_lines_before_shrink_only, 2);
    }

    #[test]
    fn test_long_paragraph_is_truncated_at_min_size() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState::new();
        let text = "lorem ipsum ".repeat(100);

        let result = fit(&fitter, &mut measurer, &text, 30.0, 20.0, &mut state);

        assert_eq!(result.font_size, 1.0);
        assert!(result.truncated);
        assert!(result.display_text.ends_with('…'));
        assert!(result.display_text.chars().count() < text.chars().count());

        let shown = measurer
            .measure(MeasureRequest::new(&result.display_text, 1.0, 30.0))
            .unwrap();
        assert!(shown.height <= 20.0);
    }

    #[test]
    fn test_truncation_can_be_disabled() {
        let fitter = TextFitter::new(FitConfig::default().with_ellipsis(false));
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState::new();
        let text = "lorem ipsum ".repeat(100);

        let result = fit(&fitter, &mut measurer, &text, 30.0, 20.0, &mut state);

        assert_eq!(result.font_size, 1.0);
        assert!(!result.truncated);
        assert_eq!(result.display_text, text);
    }

    #[test]
    fn test_invalid_bounds_are_a_noop() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState {
            last_line_count: 4,
            max_lines_before_shrink_only: 2,
            size_changed_pending: true,
        };
        let before = state;

        for (width, height) in [(0.0, 100.0), (200.0, 0.0), (-5.0, 10.0), (f32::NAN, 10.0)] {
            let request = FitRequest::new("Hello", width, height).with_font_sizes(16.0, 17.5);
            let result = fitter.fit(&mut measurer, &request, &mut state).unwrap();
            assert_eq!(result.font_size, 17.5);
            assert_eq!(result.display_text, "Hello");
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_empty_text_and_zero_size_are_a_noop() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState::new();

        let empty = FitRequest::new("", 100.0, 100.0).with_font_sizes(12.0, 12.0);
        let result = fitter.fit(&mut measurer, &empty, &mut state).unwrap();
        assert_eq!(result.font_size, 12.0);
        assert_eq!(result.display_text, "");

        let disabled = FitRequest::new("Hello", 100.0, 100.0).with_font_sizes(0.0, 9.0);
        let result = fitter.fit(&mut measurer, &disabled, &mut state).unwrap();
        assert_eq!(result.font_size, 9.0);
        assert_eq!(state, FitterState::new());
    }

    #[test]
    fn test_measurement_error_leaves_state_untouched() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState {
            last_line_count: 3,
            max_lines_before_shrink_only: 1,
            size_changed_pending: true,
        };
        let before = state;

        let err = fitter
            .fit(
                &mut measurer,
                &FitRequest::new("bell\u{7}", 100.0, 100.0),
                &mut state,
            )
            .unwrap_err();

        assert_eq!(
            err,
            FitError::Measurement(MeasureError::UnmeasurableGlyph('\u{7}'))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_size_change_steps_back_one_increment_from_max() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut state = FitterState::new();
        state.on_bounds_changed();

        let result = fit(&fitter, &mut measurer, "Hi", 200.0, 100.0, &mut state);
        assert_eq!(result.font_size, 23.5);
        assert!(!state.size_changed_pending);

        let result = fit(&fitter, &mut measurer, "Hi", 200.0, 100.0, &mut state);
        assert_eq!(result.font_size, 24.0);
    }

    #[test]
    fn test_line_count_drop_takes_grow_branch() {
        let fitter = TextFitter::default();
        let mut measurer = unit();
        let mut state = FitterState::new();

        // Fits at the maximum on three lines; nothing overflowed so the threshold stays 1
        let result = fit(&fitter, &mut measurer, "a\nb\nc", 100.0, 100.0, &mut state);
        assert_eq!(result.font_size, 24.0);
        assert_eq!(state.last_line_count, 3);

        // Two lines now: 3 > 2 > 1, so the fit grows back and steps back once
        let result = fit(&fitter, &mut measurer, "a\nb", 100.0, 100.0, &mut state);
        assert_eq!(result.font_size, 23.5);
        assert_eq!(state.last_line_count, 2);

        // Same content again: no drop in lines, no grow branch
        let result = fit(&fitter, &mut measurer, "a\nb", 100.0, 100.0, &mut state);
        assert_eq!(result.font_size, 24.0);
    }

    #[test]
    fn test_pending_size_change_consumed_alongside_line_drop() {
        let fitter = TextFitter::default();
        let mut measurer = unit();
        let mut state = FitterState::new();

        fit(&fitter, &mut measurer, "a\nb\nc", 100.0, 100.0, &mut state);
        assert_eq!(state.last_line_count, 3);

        // Both triggers at once: the line drop alone would grow, the flag still clears
        state.mark_size_changed();
        let result = fit(&fitter, &mut measurer, "a\nb", 100.0, 100.0, &mut state);
        assert_eq!(result.font_size, 23.5);
        assert!(!state.size_changed_pending);

        // Nothing left pending, so the next fit settles at the maximum
        let result = fit(&fitter, &mut measurer, "a\nb", 100.0, 100.0, &mut state);
        assert_eq!(result.font_size, 24.0);
    }

    #[test]
    fn test_grow_back_stays_within_bounds() {
        let fitter = TextFitter::default();
        let mut measurer = unit();
        let mut state = FitterState::new();

        let result = fit(&fitter, &mut measurer, "a\nb\nc\nd", 100.0, 10.0, &mut state);
        assert_eq!(result.font_size, 2.5);
        assert_eq!(state.last_line_count, 4);
        assert_eq!(state.max_lines_before_shrink_only, 3);

        // 4 > 3 > 2 (threshold re-recorded at the maximum): walks up from 3.0,
        // overshoots at 3.5 and steps back
        let result = fit(&fitter, &mut measurer, "a\nb\nc", 100.0, 10.0, &mut state);
        assert_eq!(result.font_size, 3.0);
        assert_eq!(state.max_lines_before_shrink_only, 2);

        // Bounds changed: same walk, triggered by the pending flag
        state.on_bounds_changed();
        let result = fit(&fitter, &mut measurer, "a\nb\nc", 100.0, 10.0, &mut state);
        assert_eq!(result.font_size, 3.0);
    }

    #[test]
    fn test_bisect_search_matches_linear() {
        let linear = TextFitter::default();
        let bisect = TextFitter::new(FitConfig::default().with_search(SearchStrategy::Bisect));
        let mut measurer = MonospaceMeasurer::default();
        let text = "the quick brown fox jumps over the lazy dog";

        for height in [1.0, 5.0, 12.0, 20.0, 35.0, 60.0, 100.0] {
            for width in [10.0, 40.0, 120.0, 400.0] {
                let a = fit(&linear, &mut measurer, text, width, height, &mut FitterState::new());
                let b = fit(&bisect, &mut measurer, text, width, height, &mut FitterState::new());
                assert_eq!(a, b, "{width}x{height}");
            }
        }
    }

    #[test]
    fn test_measures_through_mutable_reference() {
        let fitter = TextFitter::default();
        let mut measurer = MonospaceMeasurer::default();
        let mut by_ref = &mut measurer;
        let result = fitter
            .fit(
                &mut by_ref,
                &FitRequest::new("Hello world", 200.0, 100.0),
                &mut FitterState::new(),
            )
            .unwrap();
        assert_eq!(result.font_size, 24.0);
    }
}
