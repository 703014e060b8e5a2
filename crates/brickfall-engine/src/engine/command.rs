use serde::{Deserialize, Serialize};

/// Everything a player can ask the session to do.
///
/// This is the whole mutation surface of a running game besides the passage
/// of time ([`crate::Session::advance`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    #[display("move left")]
    MoveLeft,
    #[display("move right")]
    MoveRight,
    #[display("soft drop")]
    SoftDrop,
    #[display("hard drop")]
    HardDrop,
    #[display("rotate")]
    RotateCw,
    #[display("rotate back")]
    RotateCcw,
    #[display("swap next")]
    SwapNext,
    #[display("pause")]
    Pause,
    #[display("restart")]
    Restart,
    #[display("speed up")]
    SpeedUp,
    #[display("speed down")]
    SpeedDown,
}

impl Command {
    pub const ALL: [Self; 11] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::SoftDrop,
        Self::HardDrop,
        Self::RotateCw,
        Self::RotateCcw,
        Self::SwapNext,
        Self::Pause,
        Self::Restart,
        Self::SpeedUp,
        Self::SpeedDown,
    ];

    /// Whether the command is still accepted while the game is paused.
    #[must_use]
    pub const fn works_while_paused(self) -> bool {
        matches!(
            self,
            Self::Pause | Self::Restart | Self::SpeedUp | Self::SpeedDown
        )
    }
}
