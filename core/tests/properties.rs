use std::collections::{BTreeSet, VecDeque};

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use roguesweeper_core::*;

fn random_board(seed: u64, size: Coord2, density: u16, start: Coord2) -> Board {
    let cells = mult(size.0, size.1);
    let mines = (cells - 1) * density / 100;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new(size);
    board
        .place_mines(start, mines, &mut RandomMineGenerator::new(&mut rng))
        .unwrap();
    board
}

/// Zero-connected region around `start` plus its numbered border.
fn expected_flood(board: &Board, start: Coord2) -> BTreeSet<Coord2> {
    let mut region = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(at) = queue.pop_front() {
        if board.cell_at(at).neighbor_mines() != 0 {
            continue;
        }
        for next in board.neighbors(at) {
            let cell = board.cell_at(next);
            if !cell.is_flagged() && region.insert(next) {
                queue.push_back(next);
            }
        }
    }
    region
}

fn board_params() -> impl Strategy<Value = (u64, Coord2, u16, Coord2)> {
    (any::<u64>(), 1u8..=22, 1u8..=22, 0u16..=60, any::<(u8, u8)>()).prop_map(
        |(seed, rows, cols, density, (row, col))| {
            (seed, (rows, cols), density, (row % rows, col % cols))
        },
    )
}

proptest! {
    #[test]
    fn neighbor_counts_match_layout((seed, size, density, start) in board_params()) {
        let board = random_board(seed, size, density, start);

        prop_assert!(!board.cell_at(start).is_mine());
        for (at, cell) in board.indexed_cells().filter(|(_, cell)| !cell.is_mine()) {
            let mines = board
                .neighbors(at)
                .into_iter()
                .filter(|&pos| board.cell_at(pos).is_mine())
                .count();
            prop_assert_eq!(usize::from(cell.neighbor_mines()), mines);
        }
    }

    #[test]
    fn first_reveal_never_detonates(seed in any::<u64>(), row in 0u8..8, col in 0u8..8) {
        let mut run = Run::new(RunConfig::default().with_seed(seed)).unwrap();

        let event = run.reveal((row, col)).unwrap();

        prop_assert!(matches!(event, Event::Revealed | Event::StageCleared(_)));
        prop_assert_eq!(run.ledger().lives(), 3);
    }

    #[test]
    fn flood_fill_reveals_exactly_the_zero_region(
        (seed, size, density, start) in board_params(),
        flags in proptest::collection::vec(any::<(u8, u8)>(), 0..6),
    ) {
        let mut board = random_board(seed, size, density, start);
        for (row, col) in flags {
            let at = (row % size.0, col % size.1);
            if at != start {
                board.toggle_flag(at).unwrap();
            }
        }
        let expected = expected_flood(&board, start);

        board.reveal(start).unwrap();

        let revealed: BTreeSet<Coord2> = board
            .indexed_cells()
            .filter(|(_, cell)| cell.is_revealed())
            .map(|(at, _)| at)
            .collect();
        prop_assert_eq!(revealed, expected);
    }

    #[test]
    fn revealed_count_tracks_cells(
        (seed, size, density, start) in board_params(),
        clicks in proptest::collection::vec((any::<(u8, u8)>(), any::<bool>()), 0..40),
    ) {
        let mut board = random_board(seed, size, density, start);

        for ((row, col), flag) in clicks {
            let at = (row % size.0, col % size.1);
            if flag {
                board.toggle_flag(at).unwrap();
            } else if board.chord_reveal(at).unwrap() == RevealOutcome::NoChange {
                board.reveal(at).unwrap();
            }

            let revealed = board.indexed_cells().filter(|(_, c)| c.is_revealed()).count();
            let flagged = board.indexed_cells().filter(|(_, c)| c.is_flagged()).count();
            prop_assert_eq!(usize::from(board.revealed_count()), revealed);
            prop_assert_eq!(usize::from(board.flagged_count()), flagged);
            prop_assert!(board.indexed_cells().all(|(_, c)| !(c.is_revealed() && c.is_flagged())));
        }
    }

    #[test]
    fn verification_is_perfect_iff_flags_equal_mines(
        (seed, size, density, start) in board_params(),
        flags in proptest::collection::vec(any::<(u8, u8)>(), 0..30),
        flag_all_mines in any::<bool>(),
    ) {
        let mut board = random_board(seed, size, density, start);
        let mines: BTreeSet<Coord2> = board
            .indexed_cells()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(at, _)| at)
            .collect();
        let mut flagged = BTreeSet::new();
        let targets: Vec<Coord2> = if flag_all_mines {
            mines.iter().copied().collect()
        } else {
            flags.into_iter().map(|(row, col)| (row % size.0, col % size.1)).collect()
        };
        for at in targets {
            if flagged.insert(at) {
                board.toggle_flag(at).unwrap();
            }
        }

        let verdict = FlagAudit::of(&board).verdict();

        let wrong = flagged.difference(&mines).count();
        let missing = mines.difference(&flagged).count();
        let expected = match (wrong, missing) {
            (0, 0) => Verdict::Perfect,
            (1.., _) => Verdict::WrongFlag,
            (0, 1..) => Verdict::MissingFlags,
        };
        prop_assert_eq!(verdict, expected);
    }
}
