use ndarray::Array2;
use rand::Rng;

use crate::*;
pub use random::*;

mod random;

/// Produces the mine mask for a stage, leaving the first-revealed cell free.
pub trait MineGenerator {
    fn generate(&mut self, config: StageConfig, exclude: Coord2) -> Array2<bool>;
}

const BASE_SIZE: Stage = 8;
const MAX_BASE_SIZE: Stage = 20;
const STAGES_PER_SIZE_STEP: Stage = 3;
const SIZE_JITTER: Coord = 2;
const BASE_MINE_PERCENT: Stage = 10;
const MAX_MINE_PERCENT: Stage = 25;

/// Board side before jitter: grows by one every three stages up to 20.
pub fn base_size(stage: Stage) -> Coord {
    (BASE_SIZE + stage / STAGES_PER_SIZE_STEP).min(MAX_BASE_SIZE) as Coord
}

/// Share of cells holding a mine, in whole percent: 11% at stage 1, capped at 25%.
pub fn mine_percent(stage: Stage) -> Stage {
    BASE_MINE_PERCENT
        .saturating_add(stage)
        .min(MAX_MINE_PERCENT)
}

/// Draws the board dimensions and mine count for `stage`.
///
/// Rows and columns each get an independent jitter of `0..=2` on top of the
/// base size; the mine count is the floor of the cell count times the mine ratio.
pub fn stage_config<R: Rng + ?Sized>(stage: Stage, rng: &mut R) -> StageConfig {
    let base = base_size(stage);
    let rows = base + rng.random_range(0..=SIZE_JITTER);
    let cols = base + rng.random_range(0..=SIZE_JITTER);
    let cells = Stage::from(mult(rows, cols));
    let mines = (cells * mine_percent(stage) / 100) as CellCount;

    log::debug!("Stage {stage} config: {rows}x{cols} with {mines} mines");
    StageConfig::new_unchecked((rows, cols), mines)
}
