use anyhow::{Result, bail};
use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use roguesweeper_core::*;
use serde::Serialize;

/// Upper bound on intents per run, guards against a driver bug spinning forever.
const MAX_INTENTS: usize = 100_000;

/// How a simulated run finished.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub phase: Phase,
    pub stage: Stage,
    pub stages_cleared: u32,
    pub perfect_clears: u32,
    pub total_score: u64,
    pub lives: u32,
    pub hints_used: u32,
    pub intents: usize,
}

/// Plays a run by leaning on hints, with the occasional blind guess.
pub struct AutoPlayer {
    rng: SmallRng,
    guess_rate: f64,
    max_stages: Stage,
}

impl AutoPlayer {
    pub fn new(rng: SmallRng, guess_rate: f64, max_stages: Stage) -> Self {
        Self {
            rng,
            guess_rate: guess_rate.clamp(0.0, 1.0),
            max_stages,
        }
    }

    pub fn play(&mut self, run: &mut Run) -> Result<RunReport> {
        let mut intents = 0;
        while let Some(intent) = self.next_intent(run) {
            intents += 1;
            if intents > MAX_INTENTS {
                bail!("run did not finish within {MAX_INTENTS} intents");
            }

            match run.apply(intent) {
                Ok(event) if event.ends_stage() => {
                    log::debug!("Stage {} ended: {event:?}", run.stage());
                }
                Ok(_) => {}
                Err(err) if err.is_recoverable() => {
                    log::warn!("Intent {intent:?} rejected: {err} ({})", err.code());
                }
                Err(err) => return Err(err.into()),
            }
        }

        let snapshot = run.snapshot();
        Ok(RunReport {
            seed: run.seed(),
            phase: snapshot.phase,
            stage: snapshot.stage,
            stages_cleared: snapshot.stages_cleared,
            perfect_clears: snapshot.perfect_clears,
            total_score: snapshot.total_score,
            lives: snapshot.lives,
            hints_used: snapshot.hints_used,
            intents,
        })
    }

    fn next_intent(&mut self, run: &Run) -> Option<Intent> {
        let snapshot = run.snapshot();
        match snapshot.phase {
            Phase::Waiting => {
                let (rows, cols) = snapshot.size;
                Some(Intent::Reveal {
                    at: (rows / 2, cols / 2),
                })
            }
            Phase::Playing => Some(self.playing_intent(&snapshot)),
            Phase::StageComplete if snapshot.stage >= self.max_stages => None,
            Phase::StageComplete | Phase::LifeLost => Some(Intent::Advance),
            Phase::RewardSelection => Some(Intent::SelectReward {
                index: self.pick_reward(&snapshot),
            }),
            Phase::Won | Phase::Lost => None,
        }
    }

    fn playing_intent(&mut self, snapshot: &Snapshot) -> Intent {
        if snapshot.safe_reveal_armed {
            return match self.random_closed_cell(snapshot) {
                Some(at) => Intent::UseSafeReveal { at },
                None => Intent::DisarmSafeReveal,
            };
        }
        if let Some(at) = snapshot.hint {
            return Intent::Reveal { at };
        }
        if self.rng.random_bool(self.guess_rate) {
            if snapshot.safe_reveal_charges > 0 {
                return Intent::ArmSafeReveal;
            }
            if let Some(at) = self.random_closed_cell(snapshot) {
                return Intent::Reveal { at };
            }
        }
        Intent::Hint
    }

    fn pick_reward(&mut self, snapshot: &Snapshot) -> usize {
        if snapshot.lives <= 1 {
            if let Some(index) = snapshot
                .reward_options
                .iter()
                .position(|&reward| reward == Reward::ExtraLife)
            {
                return index;
            }
        }
        self.rng.random_range(0..snapshot.reward_options.len().max(1))
    }

    fn random_closed_cell(&mut self, snapshot: &Snapshot) -> Option<Coord2> {
        let closed: Vec<Coord2> = snapshot
            .cells
            .indexed_iter()
            .filter(|(_, view)| !view.revealed && !view.flagged)
            .map(|((row, col), _)| (row as Coord, col as Coord))
            .collect();
        closed.choose(&mut self.rng).copied()
    }
}
