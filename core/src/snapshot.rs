use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a renderer may know about one cell.
///
/// Mine status and neighbour counts are only filled in for revealed cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub revealed: bool,
    pub flagged: bool,
    pub auto_flagged: bool,
    pub mine: Option<bool>,
    pub neighbor_mines: Option<u8>,
}

impl From<Cell> for CellView {
    fn from(cell: Cell) -> Self {
        let revealed = cell.is_revealed();
        Self {
            revealed,
            flagged: cell.is_flagged(),
            auto_flagged: cell.is_auto_flagged(),
            mine: revealed.then_some(cell.is_mine()),
            neighbor_mines: (revealed && !cell.is_mine()).then_some(cell.neighbor_mines()),
        }
    }
}

/// Read-only state handed to the front end after every intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub stage: Stage,
    pub total_score: u64,
    pub stages_cleared: u32,
    pub perfect_clears: u32,
    pub lives: u32,
    pub safe_reveal_charges: u32,
    pub safe_reveal_armed: bool,
    pub hints_used: u32,
    pub size: Coord2,
    pub total_mines: CellCount,
    pub flagged_count: CellCount,
    pub revealed_count: CellCount,
    pub mines_left: isize,
    pub elapsed_secs: u32,
    pub cells: Array2<CellView>,
    pub hint: Option<Coord2>,
    pub reward_options: Vec<Reward>,
    pub last_outcome: Option<StageOutcome>,
    pub last_summary: Option<StageSummary>,
}

impl Snapshot {
    pub fn from_run(run: &Run) -> Self {
        let board = run.board();
        let ledger = run.ledger();
        let total_mines = run.stage_config().mines;
        let cells = board.cells().mapv(CellView::from);

        Self {
            phase: run.phase(),
            stage: run.stage(),
            total_score: ledger.total_score(),
            stages_cleared: ledger.stages_cleared(),
            perfect_clears: ledger.perfect_clears(),
            lives: ledger.lives(),
            safe_reveal_charges: ledger.safe_reveal_charges(),
            safe_reveal_armed: ledger.safe_reveal_armed(),
            hints_used: ledger.hints_used(),
            size: board.size(),
            total_mines,
            flagged_count: board.flagged_count(),
            revealed_count: board.revealed_count(),
            mines_left: (total_mines as isize) - (board.flagged_count() as isize),
            elapsed_secs: run.elapsed_secs(),
            cells,
            hint: run.hint(),
            reward_options: run.reward_options().to_vec(),
            last_outcome: run.last_outcome(),
            last_summary: run.last_summary(),
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}
