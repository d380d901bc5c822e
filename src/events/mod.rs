//! Terminal events.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// What the main loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// The tick interval passed without input.
    Tick,
    /// Ctrl+C, handled before any view sees it.
    Quit,
}
