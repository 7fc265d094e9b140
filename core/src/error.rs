use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad class of a rejection, so a front end can decide how to present it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Out-of-bounds target or an intent that the current phase does not accept.
    IllegalIntent,
    /// The intent is legal but a resource it needs has run out.
    ResourceExhausted,
    /// A configuration that can never produce a valid stage.
    InvariantViolation,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Run already ended, start a new game")]
    AlreadyEnded,
    #[error("Stage is changing, wait for it to settle")]
    Transitioning,
    #[error("Stage has not started yet, reveal a cell first")]
    NotStarted,
    #[error("No reward is being offered")]
    NotChoosingReward,
    #[error("Reward choice out of range")]
    InvalidReward,
    #[error("Safe reveal is not armed")]
    SafeRevealNotArmed,
    #[error("Safe reveal needs a hidden, unflagged cell")]
    IllegalSafeRevealTarget,
    #[error("No safe reveal charges left")]
    NoSafeRevealCharges,
    #[error("No safe cells left to hint")]
    NoSafeCellsLeft,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Mines were already placed on this board")]
    MinesAlreadyPlaced,
    #[error("Invalid run configuration")]
    InvalidConfig,
}

impl GameError {
    pub const fn kind(self) -> ErrorKind {
        use GameError::*;
        match self {
            InvalidCoords
            | AlreadyEnded
            | Transitioning
            | NotStarted
            | NotChoosingReward
            | InvalidReward
            | SafeRevealNotArmed
            | IllegalSafeRevealTarget => ErrorKind::IllegalIntent,
            NoSafeRevealCharges | NoSafeCellsLeft => ErrorKind::ResourceExhausted,
            TooManyMines | MinesAlreadyPlaced | InvalidConfig => ErrorKind::InvariantViolation,
        }
    }

    /// Stable identifier for UI feedback, independent of the display text.
    pub const fn code(self) -> &'static str {
        use GameError::*;
        match self {
            InvalidCoords => "invalid_coords",
            AlreadyEnded => "already_ended",
            Transitioning => "transitioning",
            NotStarted => "not_started",
            NotChoosingReward => "not_choosing_reward",
            InvalidReward => "invalid_reward",
            SafeRevealNotArmed => "safe_reveal_not_armed",
            IllegalSafeRevealTarget => "illegal_safe_reveal_target",
            NoSafeRevealCharges => "no_safe_reveal_charges",
            NoSafeCellsLeft => "no_safe_cells_left",
            TooManyMines => "too_many_mines",
            MinesAlreadyPlaced => "mines_already_placed",
            InvalidConfig => "invalid_config",
        }
    }

    /// Whether the run can simply continue after this rejection.
    pub const fn is_recoverable(self) -> bool {
        !matches!(self.kind(), ErrorKind::InvariantViolation)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
