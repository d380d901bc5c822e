//! Spinner shown next to tabs that are waiting on a fetch.

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Tick-driven spinner. Advances only while something is loading.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame if `active`, otherwise rewind.
    pub fn tick(&mut self, active: bool) {
        if active {
            self.frame = (self.frame + 1) % FRAMES.len();
        } else {
            self.frame = 0;
        }
    }

    pub fn frame(&self) -> &'static str {
        FRAMES[self.frame]
    }
}
