use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// Time to update state; carries the time since the previous tick.
    #[from(ignore)]
    Tick(Duration),
    /// Time to redraw.
    Render,
    Crossterm(CrosstermEvent),
}
