use rand::Rng;

use super::*;

/// Purely random placement that keeps one start cell free of mines.
///
/// Every placement picks the k-th still-free cell uniformly, so the draw
/// never loops on collisions.
#[derive(Debug)]
pub struct RandomMineGenerator<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> RandomMineGenerator<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + ?Sized> MineGenerator for RandomMineGenerator<'_, R> {
    fn generate(&mut self, config: StageConfig, exclude: Coord2) -> Array2<bool> {
        let total_cells = usize::from(config.total_cells());
        let requested = usize::from(config.mines);

        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        if total_cells == 0 {
            return mines;
        }

        // block the start cell while placing, undone below
        mines[exclude.to_nd_index()] = true;
        let mut free_cells = total_cells - 1;
        if requested > free_cells {
            log::warn!(
                "Cannot fit {} mines beside the start cell, only {} free",
                requested,
                free_cells
            );
        }

        let mut mines_placed = 0;
        {
            let cells = mines
                .as_slice_mut()
                .expect("freshly allocated array is in standard layout");
            while mines_placed < requested && free_cells > 0 {
                let mut place = self.rng.random_range(0..free_cells);
                for (i, cell) in cells.iter_mut().enumerate() {
                    if *cell {
                        place += 1;
                    }
                    if i == place {
                        *cell = true;
                        mines_placed += 1;
                        free_cells -= 1;
                        break;
                    }
                }
            }
        }

        mines[exclude.to_nd_index()] = false;

        // double check mine count
        let count = mines.iter().filter(|&&cell| cell).count();
        if count != requested {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                count,
                requested
            );
        }
        mines
    }
}
