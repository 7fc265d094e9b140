use serde::{Deserialize, Serialize};

use crate::*;

/// Classification of an on-demand flag check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Flags match the mines exactly.
    Perfect,
    WrongFlag,
    MissingFlags,
    /// More correct flags than mines; not reachable on a consistent board.
    TooManyFlags,
}

impl Verdict {
    pub const fn is_perfect(self) -> bool {
        matches!(self, Self::Perfect)
    }
}

/// Tally of the player's flags against the mine layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAudit {
    pub correct_flags: CellCount,
    pub incorrect_flags: CellCount,
    pub total_mines: CellCount,
}

impl FlagAudit {
    pub fn of(board: &Board) -> Self {
        let mut correct_flags = 0;
        let mut incorrect_flags = 0;
        for (_, cell) in board.indexed_cells().filter(|(_, cell)| cell.is_flagged()) {
            if cell.is_mine() {
                correct_flags += 1;
            } else {
                incorrect_flags += 1;
            }
        }

        Self {
            correct_flags,
            incorrect_flags,
            total_mines: board.total_mines(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.correct_flags == self.total_mines && self.incorrect_flags == 0 {
            Verdict::Perfect
        } else if self.incorrect_flags > 0 {
            Verdict::WrongFlag
        } else if self.correct_flags < self.total_mines {
            Verdict::MissingFlags
        } else {
            Verdict::TooManyFlags
        }
    }

    /// Correctly flagged mines in whole percent of all mines.
    pub fn accuracy_percent(&self) -> u8 {
        if self.total_mines == 0 {
            return 100;
        }
        (u32::from(self.correct_flags) * 100 / u32::from(self.total_mines)).min(100) as u8
    }
}
