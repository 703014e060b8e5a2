use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use super::Runtime;

/// Trait for TUI applications run by [`Runtime::run`].
pub trait App {
    /// Called once before the first event. Configure tick and render rates here.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, ...).
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Updates state on each tick. `elapsed` is the wall time since the previous tick.
    fn update(&mut self, runtime: &mut Runtime, elapsed: Duration);
}
