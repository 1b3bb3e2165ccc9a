/// Memory carried from one fit to the next.
///
/// One state belongs to one display surface for its whole lifetime. The fitter reads
/// it at the start of a call and writes it back only when the call succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitterState {
    /// Line count of the text at the size chosen by the previous fit
    pub last_line_count: usize,
    /// One less than the line count at the maximum size, recorded the last time the
    /// text overflowed at that size
    pub max_lines_before_shrink_only: usize,
    /// Set when the size constraint changed without a content change; consumed by the
    /// next fit
    pub size_changed_pending: bool,
}

impl Default for FitterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FitterState {
    pub const fn new() -> Self {
        Self {
            last_line_count: 1,
            max_lines_before_shrink_only: 1,
            size_changed_pending: false,
        }
    }

    /// Forget everything learned about the previous bounds
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Signal that the size constraint changed without a content change
    pub fn mark_size_changed(&mut self) {
        self.size_changed_pending = true;
    }

    /// The bounding box was resized
    pub fn on_bounds_changed(&mut self) {
        self.reset();
        self.mark_size_changed();
    }

    /// Read and clear the pending size change
    pub(crate) fn take_size_change(&mut self) -> bool {
        std::mem::take(&mut self.size_changed_pending)
    }
}
