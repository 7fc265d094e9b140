//! Game state engine for a roguelike take on Minesweeper.
//!
//! A [`Run`] owns the meta-progression (stage, score, lives, safe-reveal
//! charges) and one [`Board`] per stage. Front ends feed it [`Intent`]s and
//! draw from the [`Snapshot`] it hands back; the engine never calls out.

use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use intent::*;
pub use ledger::*;
pub use run::*;
pub use snapshot::*;
pub use types::*;
pub use verify::*;

mod board;
mod cell;
mod config;
mod error;
mod generator;
mod intent;
mod ledger;
mod run;
mod snapshot;
mod types;
mod verify;

/// Dimensions and mine count of one stage's board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl StageConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// At least one cell must stay free for the first reveal.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidCoords);
        }
        if mines >= mult(size.0, size.1) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Result of opening cells on a [`Board`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    /// A mine was opened at the given cell.
    Detonated(Coord2),
    /// The last safe cell was opened.
    Cleared,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Detonated(_) => true,
            Cleared => true,
        }
    }
}

/// Merges outcomes when several cells open at once; a detonation always wins.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (Detonated(coords), _) => Detonated(coords),
            (_, Detonated(coords)) => Detonated(coords),
            (Cleared, _) => Cleared,
            (_, Cleared) => Cleared,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_config_needs_a_free_cell() {
        assert_eq!(StageConfig::new((3, 3), 9), Err(GameError::TooManyMines));
        assert_eq!(StageConfig::new((0, 3), 0), Err(GameError::InvalidCoords));
        assert_eq!(StageConfig::new((3, 3), 8).unwrap().total_cells(), 9);
    }

    #[test]
    fn detonation_dominates_merge() {
        use RevealOutcome::*;

        assert_eq!(Revealed | Detonated((1, 2)) | Cleared, Detonated((1, 2)));
        assert_eq!(NoChange | Cleared, Cleared);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
