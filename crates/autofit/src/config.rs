//! Fitting parameters

/// Default largest font size a fit may choose
pub const DEFAULT_MAX_SIZE: f32 = 24.0;
/// Default smallest font size a fit may choose
pub const DEFAULT_MIN_SIZE: f32 = 1.0;
/// Default font size increment used while searching
pub const DEFAULT_STEP: f32 = 0.5;
/// Horizontal ellipsis, a single glyph
pub const ELLIPSIS: char = '\u{2026}';

/// How the shrink search walks the size grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Step down one increment at a time from the maximum
    #[default]
    Linear,
    /// Binary search over the same grid; same answer for a monotone measurer
    Bisect,
}

/// How the last visible line is shortened to make room for the ellipsis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimStrategy {
    /// Drop one grapheme at a time from the end of the line
    #[default]
    Linear,
    /// Binary search over grapheme boundaries; same answer for a monotone measurer
    Bisect,
}

/// Fitting configuration
///
/// All sizes are in the same unit the measurer interprets `font_size` in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub min_size: f32,
    pub max_size: f32,
    /// Search increment
    pub step: f32,
    /// Line height multiplier forwarded to every probe
    pub spacing_mult: f32,
    /// Extra line spacing forwarded to every probe
    pub spacing_add: f32,
    /// Truncate with an ellipsis when the text overflows at `min_size`
    pub add_ellipsis: bool,
    pub ellipsis: char,
    pub search: SearchStrategy,
    pub trim: TrimStrategy,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            step: DEFAULT_STEP,
            spacing_mult: 1.0,
            spacing_add: 0.0,
            add_ellipsis: true,
            ellipsis: ELLIPSIS,
            search: SearchStrategy::Linear,
            trim: TrimStrategy::Linear,
        }
    }
}

impl FitConfig {
    /// Set the allowed font size range
    pub fn with_size_range(mut self, min_size: f32, max_size: f32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Set the search increment
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set line spacing
    pub fn with_line_spacing(mut self, add: f32, mult: f32) -> Self {
        self.spacing_add = add;
        self.spacing_mult = mult;
        self
    }

    /// Enable or disable ellipsis truncation
    pub fn with_ellipsis(mut self, enabled: bool) -> Self {
        self.add_ellipsis = enabled;
        self
    }

    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    pub fn with_trim(mut self, trim: TrimStrategy) -> Self {
        self.trim = trim;
        self
    }

    /// Normalize nonsensical values.
    ///
    /// A reversed range is swapped, a non-positive or non-finite step falls back to the
    /// default, and a non-positive line multiplier falls back to 1.
    pub fn validated(mut self) -> Self {
        if !self.min_size.is_finite() || self.min_size <= 0.0 {
            self.min_size = DEFAULT_MIN_SIZE;
        }
        if !self.max_size.is_finite() || self.max_size <= 0.0 {
            self.max_size = DEFAULT_MAX_SIZE;
        }
        if self.min_size > self.max_size {
            std::mem::swap(&mut self.min_size, &mut self.max_size);
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            self.step = DEFAULT_STEP;
        }
        if !self.spacing_mult.is_finite() || self.spacing_mult <= 0.0 {
            self.spacing_mult = 1.0;
        }
        if !self.spacing_add.is_finite() {
            self.spacing_add = 0.0;
        }
        self
    }

    /// Number of search increments between the two ends of the size range, rounded up
    pub fn step_count(&self) -> usize {
        ((self.max_size - self.min_size) / self.step).ceil().max(0.0) as usize
    }

    /// Candidate size `index` increments below the maximum, clamped to the minimum
    pub(crate) fn size_at(&self, index: usize) -> f32 {
        (self.max_size - index as f32 * self.step).max(self.min_size)
    }
}
