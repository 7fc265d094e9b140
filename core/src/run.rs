use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Lifecycle of the current stage and of the run as a whole.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fresh board, mines are laid on the first reveal.
    #[default]
    Waiting,
    Playing,
    /// Stage cleared, waiting for the front end to move on to the rewards.
    StageComplete,
    RewardSelection,
    /// A life paid for a mistake, the stage restarts on [`Run::advance`].
    LifeLost,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    /// Between stages or attempts, while a delayed advance is pending.
    pub const fn is_transitional(self) -> bool {
        matches!(
            self,
            Self::StageComplete | Self::RewardSelection | Self::LifeLost
        )
    }
}

/// Wall-clock time spent on one stage attempt, frozen once the attempt ends.
#[derive(Copy, Clone, Debug, Default)]
struct StageTimer {
    started_at: Option<Instant>,
    frozen_secs: Option<u32>,
}

impl StageTimer {
    fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.frozen_secs = None;
    }

    fn freeze(&mut self) -> u32 {
        let secs = self.elapsed_secs();
        self.frozen_secs = Some(secs);
        secs
    }

    fn elapsed_secs(&self) -> u32 {
        match (self.frozen_secs, self.started_at) {
            (Some(secs), _) => secs,
            (None, Some(started_at)) => {
                u32::try_from(started_at.elapsed().as_secs()).unwrap_or(u32::MAX)
            }
            (None, None) => 0,
        }
    }
}

/// End-of-stage statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub outcome: StageOutcome,
    /// Points earned, zero unless the stage was cleared.
    pub score: u64,
    pub elapsed_secs: u32,
    pub flag_accuracy: u8,
    pub cells_opened: CellCount,
}

/// One game session: the stage sequence plus everything that persists across it.
#[derive(Clone, Debug)]
pub struct Run {
    config: RunConfig,
    seed: u64,
    rng: SmallRng,
    phase: Phase,
    stage: Stage,
    stage_config: StageConfig,
    board: Board,
    ledger: Ledger,
    timer: StageTimer,
    last_outcome: Option<StageOutcome>,
    last_summary: Option<StageSummary>,
    reward_options: Vec<Reward>,
    hint: Option<Coord2>,
}

impl Run {
    /// Starts a run at stage 1, seeded from the config or from the thread RNG.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("New run, seed: {seed}");

        let mut rng = SmallRng::seed_from_u64(seed);
        let stage_config = stage_config(1, &mut rng);
        Ok(Self {
            ledger: Ledger::new(&config),
            config,
            seed,
            rng,
            phase: Phase::Waiting,
            stage: 1,
            stage_config,
            board: Board::new(stage_config.size),
            timer: StageTimer::default(),
            last_outcome: None,
            last_summary: None,
            reward_options: Vec::new(),
            hint: None,
        })
    }

    /// Starts a run whose first stage is a prepared board, e.g. a fixed tutorial layout.
    ///
    /// The board must already have its mines, so the first reveal is not guaranteed safe.
    /// Restarts after a lost life and later stages are generated as usual.
    pub fn with_board(config: RunConfig, board: Board) -> Result<Self> {
        if !board.mines_placed() {
            return Err(GameError::InvalidConfig);
        }

        let mut run = Self::new(config)?;
        run.stage_config = StageConfig::new(board.size(), board.total_mines())?;
        run.board = board;
        Ok(run)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn stage_config(&self) -> StageConfig {
        self.stage_config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn last_outcome(&self) -> Option<StageOutcome> {
        self.last_outcome
    }

    pub fn last_summary(&self) -> Option<StageSummary> {
        self.last_summary
    }

    pub fn reward_options(&self) -> &[Reward] {
        &self.reward_options
    }

    pub fn hint(&self) -> Option<Coord2> {
        self.hint
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.timer.elapsed_secs()
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    /// Read-only view for renderers; hidden mines and counts stay hidden.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_run(self)
    }

    /// Routes an [`Intent`] to the matching operation.
    pub fn apply(&mut self, intent: Intent) -> Result<Event> {
        log::debug!("Intent {intent:?} in phase {:?}", self.phase);
        match intent {
            Intent::Reveal { at } => self.reveal(at),
            Intent::ToggleFlag { at } => self.toggle_flag(at),
            Intent::Chord { at } => self.chord(at),
            Intent::Verify => self.verify(),
            Intent::ArmSafeReveal => self.arm_safe_reveal(),
            Intent::DisarmSafeReveal => self.disarm_safe_reveal(),
            Intent::UseSafeReveal { at } => self.use_safe_reveal(at),
            Intent::Hint => self.request_hint(),
            Intent::SelectReward { index } => self.select_reward(index),
            Intent::Advance => self.advance(),
            Intent::NewGame => Ok(self.new_game()),
        }
    }

    pub fn reveal(&mut self, at: Coord2) -> Result<Event> {
        self.check_board_open()?;
        let at = self.board.validate_coords(at)?;

        if self.phase == Phase::Waiting {
            if !self.board.cell_at(at).is_closed() {
                return Ok(Event::NoChange);
            }
            self.begin_stage(at)?;
        }

        let outcome = self.board.reveal(at)?;
        Ok(self.resolve_reveal(outcome))
    }

    pub fn toggle_flag(&mut self, at: Coord2) -> Result<Event> {
        self.check_board_open()?;

        if !self.board.toggle_flag(at)?.has_update() {
            return Ok(Event::NoChange);
        }
        self.hint = None;
        Ok(Event::FlagToggled)
    }

    pub fn chord(&mut self, at: Coord2) -> Result<Event> {
        self.check_playing()?;

        let outcome = self.board.chord_reveal(at)?;
        Ok(self.resolve_reveal(outcome))
    }

    /// Checks the flags against the mines; anything short of an exact match costs a life.
    pub fn verify(&mut self) -> Result<Event> {
        self.check_playing()?;

        let audit = FlagAudit::of(&self.board);
        let verdict = audit.verdict();
        log::info!("Verification on stage {}: {verdict:?} ({audit:?})", self.stage);

        Ok(if verdict.is_perfect() {
            self.complete_stage(StageOutcome::Perfect)
        } else {
            self.lose_life(verdict.into())
        })
    }

    pub fn arm_safe_reveal(&mut self) -> Result<Event> {
        self.check_board_open()?;

        if self.ledger.safe_reveal_armed() {
            return Ok(Event::NoChange);
        }
        self.ledger.arm_safe_reveal()?;
        Ok(Event::SafeRevealArmed)
    }

    pub fn disarm_safe_reveal(&mut self) -> Result<Event> {
        self.check_board_open()?;

        if !self.ledger.safe_reveal_armed() {
            return Ok(Event::NoChange);
        }
        self.ledger.disarm_safe_reveal();
        Ok(Event::SafeRevealDisarmed)
    }

    /// Spends a charge to open a cell without risking the run on it.
    ///
    /// A mine underneath costs a life and gets a permanent flag instead of
    /// detonating; on the last life the run is lost. Targets that cannot be
    /// opened consume nothing and leave safe-reveal mode armed.
    pub fn use_safe_reveal(&mut self, at: Coord2) -> Result<Event> {
        self.check_playing()?;
        if !self.ledger.safe_reveal_armed() {
            return Err(GameError::SafeRevealNotArmed);
        }
        let at = self.board.validate_coords(at)?;
        let cell = self.board.cell_at(at);
        if !cell.is_closed() {
            return Err(GameError::IllegalSafeRevealTarget);
        }

        self.ledger.consume_safe_reveal()?;
        self.hint = None;

        if !cell.is_mine() {
            let outcome = self.board.reveal(at)?;
            return Ok(self.resolve_reveal(outcome));
        }

        Ok(match self.ledger.spend_life() {
            LifeCheck::Spent => {
                self.board.auto_flag(at);
                log::info!(
                    "Safe reveal found a mine at {at:?}, {} lives left",
                    self.ledger.lives()
                );
                Event::MineAutoFlagged(at)
            }
            LifeCheck::Exhausted => self.end_run(StageOutcome::Detonated(at)),
        })
    }

    /// Points at a random hidden safe cell.
    pub fn request_hint(&mut self) -> Result<Event> {
        self.check_playing()?;

        let safe_cells = self.board.closed_safe_cells();
        let at = *safe_cells
            .choose(&mut self.rng)
            .ok_or(GameError::NoSafeCellsLeft)?;

        self.ledger.record_hint();
        self.hint = Some(at);
        log::debug!("Hint at {at:?}");
        Ok(Event::Hint(at))
    }

    /// Applies the chosen reward and moves on to a freshly generated next stage.
    pub fn select_reward(&mut self, index: usize) -> Result<Event> {
        if self.phase.is_finished() {
            return Err(GameError::AlreadyEnded);
        }
        if self.phase != Phase::RewardSelection {
            return Err(GameError::NotChoosingReward);
        }
        let reward = *self
            .reward_options
            .get(index)
            .ok_or(GameError::InvalidReward)?;

        self.ledger.apply_reward(reward);
        log::info!("Reward picked: {reward:?}");

        self.stage += 1;
        let config = stage_config(self.stage, &mut self.rng);
        self.start_stage(config);
        Ok(Event::RewardApplied(reward))
    }

    /// Settles a pending transition; the front end calls this after its display delay.
    pub fn advance(&mut self) -> Result<Event> {
        Ok(match self.phase {
            Phase::StageComplete if self.config.final_stage == Some(self.stage) => {
                log::info!("Final stage {} cleared, run won", self.stage);
                self.phase = Phase::Won;
                Event::RunWon
            }
            Phase::StageComplete => {
                self.phase = Phase::RewardSelection;
                Event::RewardsOffered
            }
            Phase::LifeLost => {
                log::info!("Restarting stage {}", self.stage);
                self.start_stage(self.stage_config);
                Event::StageRestarted
            }
            _ => Event::NoChange,
        })
    }

    /// Throws the current run away and starts over at stage 1.
    pub fn new_game(&mut self) -> Event {
        log::info!(
            "New game after stage {}, score {}",
            self.stage,
            self.ledger.total_score()
        );
        self.ledger = Ledger::new(&self.config);
        self.stage = 1;
        self.last_outcome = None;
        self.last_summary = None;
        let config = stage_config(1, &mut self.rng);
        self.start_stage(config);
        Event::NewGame
    }

    fn start_stage(&mut self, config: StageConfig) {
        self.stage_config = config;
        self.board = Board::new(config.size);
        self.timer = StageTimer::default();
        self.phase = Phase::Waiting;
        self.reward_options.clear();
        self.hint = None;
        self.ledger.disarm_safe_reveal();
    }

    fn begin_stage(&mut self, first: Coord2) -> Result<()> {
        if !self.board.mines_placed() {
            self.board.place_mines(
                first,
                self.stage_config.mines,
                &mut RandomMineGenerator::new(&mut self.rng),
            )?;
        }
        self.timer.start();
        self.phase = Phase::Playing;
        log::info!(
            "Stage {} started: {:?} with {} mines",
            self.stage,
            self.board.size(),
            self.board.total_mines()
        );
        Ok(())
    }

    fn resolve_reveal(&mut self, outcome: RevealOutcome) -> Event {
        if outcome.has_update() {
            self.hint = None;
        }
        match outcome {
            RevealOutcome::NoChange => Event::NoChange,
            RevealOutcome::Revealed => Event::Revealed,
            RevealOutcome::Cleared => self.complete_stage(StageOutcome::Normal),
            RevealOutcome::Detonated(at) => self.lose_life(StageOutcome::Detonated(at)),
        }
    }

    fn complete_stage(&mut self, outcome: StageOutcome) -> Event {
        let elapsed_secs = self.timer.freeze();
        let perfect = outcome == StageOutcome::Perfect;
        let flag_accuracy = if perfect {
            100
        } else {
            FlagAudit::of(&self.board).accuracy_percent()
        };
        let score = stage_score(
            self.board.total_mines(),
            elapsed_secs,
            self.stage,
            self.config.time_bonus_secs,
        );

        self.ledger.record_clear(score, perfect);
        self.ledger.disarm_safe_reveal();
        if !perfect {
            self.board.flag_remaining_mines();
        }
        self.reward_options = Reward::draw(&mut self.rng, self.config.reward_choices);
        self.record_summary(outcome, score, elapsed_secs, flag_accuracy);
        self.phase = Phase::StageComplete;

        log::info!(
            "Stage {} cleared ({outcome:?}) in {elapsed_secs}s for {score} points, total {}",
            self.stage,
            self.ledger.total_score()
        );
        Event::StageCleared(outcome)
    }

    fn lose_life(&mut self, outcome: StageOutcome) -> Event {
        match self.ledger.spend_life() {
            LifeCheck::Spent => {
                self.close_attempt(outcome);
                self.phase = Phase::LifeLost;
                log::info!(
                    "Life lost on stage {} ({outcome:?}), {} left",
                    self.stage,
                    self.ledger.lives()
                );
                Event::LifeLost(outcome)
            }
            LifeCheck::Exhausted => self.end_run(outcome),
        }
    }

    fn end_run(&mut self, outcome: StageOutcome) -> Event {
        self.close_attempt(outcome);
        self.phase = Phase::Lost;
        log::info!(
            "Run lost on stage {} ({outcome:?}), final score {}",
            self.stage,
            self.ledger.total_score()
        );
        Event::RunLost(outcome)
    }

    fn close_attempt(&mut self, outcome: StageOutcome) {
        let elapsed_secs = self.timer.freeze();
        let flag_accuracy = FlagAudit::of(&self.board).accuracy_percent();
        self.board.reveal_all_mines();
        self.ledger.disarm_safe_reveal();
        self.hint = None;
        self.record_summary(outcome, 0, elapsed_secs, flag_accuracy);
    }

    fn record_summary(
        &mut self,
        outcome: StageOutcome,
        score: u64,
        elapsed_secs: u32,
        flag_accuracy: u8,
    ) {
        let cells_opened = self
            .board
            .indexed_cells()
            .filter(|(_, cell)| cell.is_revealed() && !cell.is_mine())
            .count() as CellCount;
        self.last_outcome = Some(outcome);
        self.last_summary = Some(StageSummary {
            stage: self.stage,
            outcome,
            score,
            elapsed_secs,
            flag_accuracy,
            cells_opened,
        });
    }

    /// Board intents are taken while a stage is waiting or in play.
    fn check_board_open(&self) -> Result<()> {
        if self.phase.is_finished() {
            Err(GameError::AlreadyEnded)
        } else if self.phase.is_transitional() {
            Err(GameError::Transitioning)
        } else {
            Ok(())
        }
    }

    /// Intents that need mines on the board.
    fn check_playing(&self) -> Result<()> {
        self.check_board_open()?;
        if self.phase == Phase::Waiting {
            Err(GameError::NotStarted)
        } else {
            Ok(())
        }
    }
}
