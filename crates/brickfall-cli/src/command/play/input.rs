use brickfall_engine::{Command, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(Command),
    ToggleShadow,
    Quit,
}

/// Key help shown under the glass, per session state.
pub const PLAYING_HELP: &[(&[&str], &str)] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["Space", "Enter"], "Hard Drop"),
    (&["↑", "X"], "Rotate"),
    (&["Z"], "Rotate Back"),
    (&["Esc"], "Swap Next"),
    (&["P"], "Pause"),
    (&["+", "-"], "Speed"),
    (&["H"], "Shadow"),
    (&["N"], "New"),
    (&["Q"], "Quit"),
];
pub const PAUSED_HELP: &[(&[&str], &str)] = &[
    (&["P"], "Resume"),
    (&["+", "-"], "Speed"),
    (&["N"], "New"),
    (&["Q"], "Quit"),
];
pub const GAME_OVER_HELP: &[(&[&str], &str)] = &[(&["N", "Space", "Enter"], "New"), (&["Q"], "Quit")];

/// Maps a key press to an action.
///
/// Once the game is over only the restart keys and quit are recognized.
pub fn action_for(key: KeyEvent, state: SessionState) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if state.is_game_over() {
        return match key.code {
            KeyCode::Char('n' | ' ') | KeyCode::Enter => Some(Action::Game(Command::Restart)),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Right => Command::MoveRight,
        KeyCode::Down => Command::SoftDrop,
        KeyCode::Up | KeyCode::Char('x') => Command::RotateCw,
        KeyCode::Char('z') => Command::RotateCcw,
        KeyCode::Char(' ') | KeyCode::Enter => Command::HardDrop,
        KeyCode::Esc => Command::SwapNext,
        KeyCode::Char('p') | KeyCode::Pause => Command::Pause,
        KeyCode::Char('n') => Command::Restart,
        KeyCode::Char('+') => Command::SpeedUp,
        KeyCode::Char('-') => Command::SpeedDown,
        KeyCode::Char('h') => return Some(Action::ToggleShadow),
        KeyCode::Char('q') => return Some(Action::Quit),
        _ => return None,
    };
    Some(Action::Game(command))
}
