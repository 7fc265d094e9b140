use std::collections::VecDeque;
use std::num::Saturating;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The grid of one stage: mine topology plus what the player has opened or flagged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    total_mines: CellCount,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    mines_placed: bool,
}

impl Board {
    /// Empty board without mines; they are laid on the first reveal.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            total_mines: 0,
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            mines_placed: false,
        }
    }

    /// Board with a fixed mine layout, already past mine placement.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        let mut board = Self::new(size);
        board.lay_mines(&mine_mask)?;
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn total_mines(&self) -> CellCount {
        self.total_mines
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.total_mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Every safe cell is open.
    pub fn is_cleared(&self) -> bool {
        self.mines_placed && self.revealed_count.0 == self.safe_cell_count()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// In-bounds Moore neighbours of `coords`.
    pub fn neighbors(&self, coords: Coord2) -> Neighbors {
        self.cells.iter_neighbors(coords).collect()
    }

    pub fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cell_at(pos).flagged)
            .count() as u8
    }

    /// Lays `mine_count` mines anywhere but `exclude`, then freezes every neighbour count.
    pub fn place_mines<G>(
        &mut self,
        exclude: Coord2,
        mine_count: CellCount,
        generator: &mut G,
    ) -> Result<()>
    where
        G: MineGenerator + ?Sized,
    {
        let exclude = self.validate_coords(exclude)?;
        if self.mines_placed {
            return Err(GameError::MinesAlreadyPlaced);
        }

        let config = StageConfig::new(self.size(), mine_count)?;
        let mine_mask = generator.generate(config, exclude);
        if mine_mask[exclude.to_nd_index()] {
            log::warn!("Generator placed a mine on the excluded cell {exclude:?}");
        }
        self.lay_mines(&mine_mask)
    }

    fn lay_mines(&mut self, mine_mask: &Array2<bool>) -> Result<()> {
        if mine_mask.dim() != self.cells.dim() {
            return Err(GameError::InvalidCoords);
        }

        let mut count = 0;
        for (cell, &mine) in self.cells.iter_mut().zip(mine_mask.iter()) {
            cell.mine = mine;
            if mine {
                count += 1;
            }
        }
        if count >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }

        for ((row, col), cell) in self.cells.indexed_iter_mut() {
            if cell.mine {
                continue;
            }
            let coords = (row as Coord, col as Coord);
            cell.neighbor_mines = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
        }

        self.total_mines = count;
        self.mines_placed = true;
        log::debug!("Laid {} mines on a {:?} board", count, self.size());
        Ok(())
    }

    /// Opens a hidden, unflagged cell, flood-filling through zero cells.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        Ok(self.reveal_single_cell(coords))
    }

    /// Opens every closed neighbour of a numbered cell whose flags already account for its number.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = self.cell_at(coords);

        if !cell.revealed || cell.mine || cell.neighbor_mines == 0 {
            return Ok(RevealOutcome::NoChange);
        }
        if self.count_flagged_neighbors(coords) != cell.neighbor_mines {
            return Ok(RevealOutcome::NoChange);
        }

        Ok(self
            .neighbors(coords)
            .into_iter()
            .map(|neighbor| self.reveal_single_cell(neighbor))
            .reduce(core::ops::BitOr::bitor)
            .unwrap_or(RevealOutcome::NoChange))
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = self.cell_at(coords);
        if !cell.is_closed() {
            return RevealOutcome::NoChange;
        }

        self.open(coords);
        if cell.mine {
            return RevealOutcome::Detonated(coords);
        }
        log::debug!("Revealed {:?}, adjacent mines: {}", coords, cell.neighbor_mines);

        if cell.neighbor_mines == 0 {
            let mut to_visit: VecDeque<Coord2> = self
                .cells
                .iter_neighbors(coords)
                .filter(|&pos| self.cell_at(pos).is_closed())
                .collect();

            while let Some(visit_coords) = to_visit.pop_front() {
                let visit = self.cell_at(visit_coords);
                if !visit.is_closed() {
                    continue;
                }

                self.open(visit_coords);
                log::trace!(
                    "Flood revealed {:?}, adjacent mines: {}",
                    visit_coords,
                    visit.neighbor_mines
                );

                if visit.neighbor_mines == 0 {
                    to_visit.extend(
                        self.cells
                            .iter_neighbors(visit_coords)
                            .filter(|&pos| self.cell_at(pos).is_closed()),
                    );
                }
            }
        }

        if self.is_cleared() {
            RevealOutcome::Cleared
        } else {
            RevealOutcome::Revealed
        }
    }

    fn open(&mut self, coords: Coord2) {
        self.cells[coords.to_nd_index()].revealed = true;
        self.revealed_count += 1;
    }

    /// Flips a player flag; revealed cells and engine flags stay as they are.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        if cell.revealed || cell.auto_flagged {
            return Ok(MarkOutcome::NoChange);
        }

        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        Ok(MarkOutcome::Changed)
    }

    /// Places a flag the player cannot take back.
    pub(crate) fn auto_flag(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.revealed {
            return;
        }
        if !cell.flagged {
            cell.flagged = true;
            self.flagged_count += 1;
        }
        cell.auto_flagged = true;
    }

    /// Flags every mine the player left unflagged, used once a stage is cleared.
    pub(crate) fn flag_remaining_mines(&mut self) {
        let mines: Vec<Coord2> = self
            .indexed_cells()
            .filter(|(_, cell)| cell.mine && cell.is_closed())
            .map(|(coords, _)| coords)
            .collect();
        for coords in mines {
            self.auto_flag(coords);
        }
    }

    /// Uncovers the mines for end-of-stage display. Flagged mines keep their flag.
    pub fn reveal_all_mines(&mut self) {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                let cell = self.cell_at(coords);
                if cell.mine && cell.is_closed() {
                    self.open(coords);
                }
            }
        }
    }

    /// Hidden, unflagged cells without a mine.
    pub fn closed_safe_cells(&self) -> Vec<Coord2> {
        self.indexed_cells()
            .filter(|(_, cell)| !cell.mine && cell.is_closed())
            .map(|(coords, _)| coords)
            .collect()
    }

    pub fn indexed_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }
}
