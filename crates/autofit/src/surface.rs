//! A display surface that keeps its text fitted.
//!
//! [`FitSurface`] is the glue between a widget's lifecycle and [`TextFitter`]: content,
//! bounds and padding changes mark it dirty, and the next [`layout`](FitSurface::layout)
//! pass refits and applies the result.

use crate::fitter::{FitError, FitRequest, FitResult, TextFitter};
use crate::measure::LineMeasurer;
use crate::state::FitterState;

/// Padding between the surface bounds and its text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Spacing {
    /// Create spacing with all sides equal
    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create zero spacing
    pub const fn zero() -> Self {
        Self::all(0.0)
    }

    /// Create spacing with symmetric horizontal and vertical values (CSS-style)
    ///
    /// ```
    /// # use autofit::Spacing;
    /// let spacing = Spacing::symmetric(10.0, 20.0);
    /// assert_eq!(spacing.left, 10.0);
    /// assert_eq!(spacing.top, 20.0);
    /// ```
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Total horizontal spacing (left + right)
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical spacing (top + bottom)
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Text surface with a fixed box whose font size follows its content.
#[derive(Debug, Clone)]
pub struct FitSurface {
    fitter: TextFitter,
    state: FitterState,
    text: String,
    display_text: String,
    width: f32,
    height: f32,
    padding: Spacing,
    /// Size set by the owner; zero disables fitting
    text_size: f32,
    /// Size chosen by the last successful fit
    font_size: f32,
    needs_resize: bool,
}

impl FitSurface {
    pub fn new(fitter: TextFitter) -> Self {
        let max_size = fitter.config().max_size;
        Self {
            fitter,
            state: FitterState::new(),
            text: String::new(),
            display_text: String::new(),
            width: 0.0,
            height: 0.0,
            padding: Spacing::zero(),
            text_size: max_size,
            font_size: max_size,
            needs_resize: false,
        }
    }

    /// Replace the content. What is displayed only changes on the next successful
    /// [`layout`](Self::layout).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needs_resize = true;
    }

    /// Resize the surface. A real change resets the fitting state.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.state.on_bounds_changed();
            self.needs_resize = true;
        }
    }

    /// Change the padding; shrinks or grows the text box without touching the content
    pub fn set_padding(&mut self, padding: Spacing) {
        if padding != self.padding {
            self.padding = padding;
            self.state.mark_size_changed();
            self.needs_resize = true;
        }
    }

    /// Set the configured size. Zero turns fitting off.
    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size;
        self.font_size = size;
        self.needs_resize = true;
    }

    /// Width and height available to the text
    pub fn content_size(&self) -> (f32, f32) {
        (
            self.width - self.padding.horizontal(),
            self.height - self.padding.vertical(),
        )
    }

    /// Refit if anything changed since the last pass (or `changed` forces it).
    ///
    /// Returns the fit that was applied, if one ran. On error nothing is applied and the
    /// surface stays dirty, so the next pass tries again.
    pub fn layout<M: LineMeasurer + ?Sized>(
        &mut self,
        measurer: &mut M,
        changed: bool,
    ) -> Result<Option<FitResult>, FitError> {
        if !(changed || self.needs_resize) {
            return Ok(None);
        }

        let (width, height) = self.content_size();
        let request = FitRequest::new(&self.text, width, height)
            .with_font_sizes(self.text_size, self.font_size);
        let result = self.fitter.fit(measurer, &request, &mut self.state)?;

        self.font_size = result.font_size;
        self.display_text.clone_from(&result.display_text);
        self.needs_resize = false;
        Ok(Some(result))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// What should be rendered
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn state(&self) -> &FitterState {
        &self.state
    }

    pub fn needs_resize(&self) -> bool {
        self.needs_resize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monospace::MonospaceMeasurer;

    fn surface(width: f32, height: f32) -> FitSurface {
        let mut surface = FitSurface::new(TextFitter::default());
        surface.set_bounds(width, height);
        surface
    }

    #[test]
    fn test_layout_only_runs_when_dirty() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(200.0, 100.0);
        surface.set_text("Hello world");

        let applied = surface.layout(&mut measurer, false).unwrap();
        assert!(applied.is_some());
        assert!(!surface.needs_resize());
        assert!(surface.layout(&mut measurer, false).unwrap().is_none());
        assert!(surface.layout(&mut measurer, true).unwrap().is_some());
    }

    #[test]
    fn test_content_change_shrinks_text() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(200.0, 100.0);

        surface.set_text("Hello world");
        surface.layout(&mut measurer, false).unwrap();
        // First pass after the bounds were set consumes the size change
        assert_eq!(surface.font_size(), 23.5);

        surface.set_text("Hello world, this is a much longer line of text to fit");
        surface.layout(&mut measurer, false).unwrap();
        assert!(surface.font_size() < 23.5);
        assert!(surface.font_size() >= 1.0);
    }

    #[test]
    fn test_same_bounds_do_not_reset_state() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(50.0, 50.0);
        surface.set_text("one two three four five six");
        surface.layout(&mut measurer, false).unwrap();
        let state = *surface.state();

        surface.set_bounds(50.0, 50.0);
        assert_eq!(*surface.state(), state);
        assert!(!surface.needs_resize());

        surface.set_bounds(60.0, 50.0);
        assert_eq!(surface.state().last_line_count, 1);
        assert!(surface.state().size_changed_pending);
        assert!(surface.needs_resize());
    }

    #[test]
    fn test_padding_shrinks_content_box() {
        let mut surface = surface(100.0, 40.0);
        surface.set_padding(Spacing::symmetric(10.0, 5.0));
        assert_eq!(surface.content_size(), (80.0, 30.0));
        assert!(surface.state().size_changed_pending);
    }

    #[test]
    fn test_failed_layout_keeps_surface_dirty() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(200.0, 100.0);
        surface.set_text("Hello");
        surface.layout(&mut measurer, false).unwrap();
        let size = surface.font_size();

        surface.set_text("bad\u{1b}");
        assert!(surface.layout(&mut measurer, false).is_err());
        assert!(surface.needs_resize());
        assert_eq!(surface.font_size(), size);
        assert_eq!(surface.display_text(), "Hello");
        assert_eq!(surface.text(), "bad\u{1b}");
    }

    #[test]
    fn test_display_text_waits_for_layout() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(200.0, 100.0);
        surface.set_text("first");
        assert_eq!(surface.display_text(), "");

        surface.layout(&mut measurer, false).unwrap();
        assert_eq!(surface.display_text(), "first");

        surface.set_text("second");
        assert_eq!(surface.display_text(), "first");
        surface.layout(&mut measurer, false).unwrap();
        assert_eq!(surface.display_text(), "second");
    }

    #[test]
    fn test_zero_text_size_disables_fitting() {
        let mut measurer = MonospaceMeasurer::default();
        let mut surface = surface(10.0, 10.0);
        surface.set_text_size(0.0);
        surface.set_text("a long line that would otherwise shrink");
        let result = surface.layout(&mut measurer, false).unwrap().unwrap();
        assert_eq!(result.font_size, 0.0);
        assert_eq!(surface.display_text(), surface.text());
    }
}
