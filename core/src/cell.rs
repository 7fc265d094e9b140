use serde::{Deserialize, Serialize};

/// Ground-truth state of a single board position.
///
/// `neighbor_mines` is only meaningful once mines have been placed and is never
/// touched afterwards. A cell is never flagged and revealed at the same time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) mine: bool,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) auto_flagged: bool,
    pub(crate) neighbor_mines: u8,
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        self.mine
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(self) -> bool {
        self.flagged
    }

    /// Flag placed by the engine itself, the player cannot remove it.
    pub const fn is_auto_flagged(self) -> bool {
        self.auto_flagged
    }

    pub const fn neighbor_mines(self) -> u8 {
        self.neighbor_mines
    }

    /// Hidden and unflagged, i.e. a cell a reveal could still open.
    pub const fn is_closed(self) -> bool {
        !self.revealed && !self.flagged
    }
}
