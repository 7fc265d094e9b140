use roguesweeper_core::*;

fn seeded(seed: u64) -> RunConfig {
    RunConfig::default().with_seed(seed)
}

/// Finds a mine by probing clones of the run; a seeded run replays identically.
fn find_mine(run: &Run) -> Coord2 {
    let snapshot = run.snapshot();
    for ((row, col), view) in snapshot.cells.indexed_iter() {
        if view.revealed || view.flagged {
            continue;
        }
        let at = (row as Coord, col as Coord);
        let mut probe = run.clone();
        if let Ok(Event::LifeLost(_) | Event::RunLost(_)) = probe.reveal(at) {
            return at;
        }
    }
    panic!("no hidden mine left on the board");
}

/// Opens the stage on a first cell that does not clear it outright.
fn start_stage(run: &mut Run) {
    assert_eq!(run.phase(), Phase::Waiting);
    let (rows, cols) = run.snapshot().size;
    let start = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .find(|&at| run.clone().reveal(at) == Ok(Event::Revealed))
        .expect("some first reveal leaves the stage open");

    assert_eq!(run.reveal(start).unwrap(), Event::Revealed);
    assert_eq!(run.phase(), Phase::Playing);
}

#[test]
fn stage_one_normal_clear_scores_by_formula() {
    let mut run = Run::new(seeded(21)).unwrap();
    start_stage(&mut run);

    let snapshot = run.snapshot();
    let (rows, cols) = snapshot.size;
    assert!((8..=10).contains(&rows) && (8..=10).contains(&cols));
    let mines = snapshot.total_mines;
    assert_eq!(mines, mult(rows, cols) * 11 / 100);

    let mut last = Event::Revealed;
    while run.phase() == Phase::Playing {
        let Event::Hint(at) = run.request_hint().unwrap() else {
            panic!("hint expected while playing");
        };
        last = run.reveal(at).unwrap();
    }

    assert_eq!(last, Event::StageCleared(StageOutcome::Normal));
    assert_eq!(run.phase(), Phase::StageComplete);
    let summary = run.last_summary().unwrap();
    let time_bonus = 300u64.saturating_sub(summary.elapsed_secs.into());
    assert_eq!(summary.score, u64::from(mines) * 10 + time_bonus + 5);
    assert_eq!(run.snapshot().total_score, summary.score);
    assert_eq!(run.snapshot().mines_left, 0);
}

#[test]
fn exact_flags_verify_as_perfect_clear() {
    let mines = [(0, 0), (2, 3), (4, 1)];
    let board = Board::from_mine_coords((5, 5), &mines).unwrap();
    let mut run = Run::with_board(seeded(3), board).unwrap();
    run.reveal((0, 1)).unwrap();
    for at in mines {
        run.toggle_flag(at).unwrap();
    }

    let event = run.verify().unwrap();

    assert_eq!(event, Event::StageCleared(StageOutcome::Perfect));
    let snapshot = run.snapshot();
    assert!(snapshot.revealed_count < 25 - 3);
    assert_eq!(snapshot.perfect_clears, 1);
    assert_eq!(snapshot.last_summary.unwrap().flag_accuracy, 100);
}

#[test]
fn lives_run_out_only_on_the_third_detonation() {
    let mut run = Run::new(seeded(77)).unwrap();

    start_stage(&mut run);
    let mine = find_mine(&run);
    assert_eq!(
        run.reveal(mine).unwrap(),
        Event::LifeLost(StageOutcome::Detonated(mine))
    );
    assert_eq!(run.ledger().lives(), 2);
    assert_eq!(run.advance().unwrap(), Event::StageRestarted);

    start_stage(&mut run);
    let mine = find_mine(&run);
    run.reveal(mine).unwrap();
    assert_eq!(run.ledger().lives(), 1);
    run.advance().unwrap();
    assert_eq!(run.phase(), Phase::Waiting);
    assert_eq!(run.stage(), 1);

    start_stage(&mut run);
    let mine = find_mine(&run);
    assert_eq!(
        run.reveal(mine).unwrap(),
        Event::RunLost(StageOutcome::Detonated(mine))
    );
    assert_eq!(run.phase(), Phase::Lost);
    assert_eq!(run.ledger().lives(), 1);
    assert_eq!(run.advance().unwrap(), Event::NoChange);
}

#[test]
fn single_life_never_passes_through_life_lost() {
    let config = RunConfig {
        initial_lives: 1,
        ..seeded(5)
    };
    let board = Board::from_mine_coords((4, 4), &[(0, 0), (3, 3)]).unwrap();
    let mut run = Run::with_board(config, board).unwrap();
    run.reveal((0, 1)).unwrap();
    run.toggle_flag((1, 1)).unwrap();

    assert_eq!(
        run.verify().unwrap(),
        Event::RunLost(StageOutcome::WrongFlag)
    );
    assert_eq!(run.phase(), Phase::Lost);
    assert_eq!(run.snapshot().lives, 1);
}

#[test]
fn full_stage_cycle_through_rewards() {
    let board = Board::from_mine_coords((4, 4), &[(3, 3)]).unwrap();
    let mut run = Run::with_board(seeded(9), board).unwrap();

    assert_eq!(
        run.apply(Intent::Reveal { at: (0, 0) }).unwrap(),
        Event::StageCleared(StageOutcome::Normal)
    );
    assert_eq!(run.apply(Intent::Hint), Err(GameError::Transitioning));
    assert_eq!(run.apply(Intent::Advance).unwrap(), Event::RewardsOffered);
    assert_eq!(run.snapshot().reward_options.len(), 3);

    let event = run.apply(Intent::SelectReward { index: 2 }).unwrap();

    assert!(matches!(event, Event::RewardApplied(_)));
    let snapshot = run.snapshot();
    assert_eq!(snapshot.phase, Phase::Waiting);
    assert_eq!(snapshot.stage, 2);
    assert_eq!(snapshot.stages_cleared, 1);
    assert_eq!(snapshot.lives + snapshot.safe_reveal_charges, 3 + 1 + 1);
    assert!(snapshot.reward_options.is_empty());
}

#[test]
fn json_intents_drive_the_run() {
    let mut run = Run::new(seeded(11)).unwrap();
    let script = r#"[
        {"intent": "arm_safe_reveal"},
        {"intent": "disarm_safe_reveal"},
        {"intent": "toggle_flag", "at": [1, 1]},
        {"intent": "toggle_flag", "at": [1, 1]},
        {"intent": "reveal", "at": [3, 3]}
    ]"#;
    let intents: Vec<Intent> = serde_json::from_str(script).unwrap();

    let events: Vec<Event> = intents
        .into_iter()
        .map(|intent| run.apply(intent).unwrap())
        .collect();

    assert_eq!(
        &events[..4],
        &[
            Event::SafeRevealArmed,
            Event::SafeRevealDisarmed,
            Event::FlagToggled,
            Event::FlagToggled,
        ]
    );
    assert_ne!(run.phase(), Phase::Waiting);
}

#[test]
fn rejections_carry_kind_and_code() {
    let mut run = Run::new(seeded(1)).unwrap();

    let err = run.verify().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIntent);
    assert_eq!(err.code(), "not_started");
    assert!(err.is_recoverable());

    let err = run.select_reward(0).unwrap_err();
    assert_eq!(err, GameError::NotChoosingReward);

    let err = StageConfig::new((2, 2), 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert!(!err.is_recoverable());
}
