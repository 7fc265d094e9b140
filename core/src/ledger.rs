use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Bonus picked after a cleared stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    ExtraLife,
    SafeRevealCharge,
}

impl Reward {
    const ALL: [Reward; 2] = [Reward::ExtraLife, Reward::SafeRevealCharge];

    /// Draws `count` rewards independently, repeats allowed.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Reward> {
        (0..count)
            .map(|_| Self::ALL[rng.random_range(0..Self::ALL.len())])
            .collect()
    }
}

/// What spending a life amounted to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LifeCheck {
    /// A life was taken and the run goes on.
    Spent,
    /// That was the last life; the run is over and the counter is left untouched.
    Exhausted,
}

/// Points for clearing a stage: ten per mine, a bonus for every second under
/// the time budget, and five per stage number.
pub fn stage_score(
    total_mines: CellCount,
    elapsed_secs: u32,
    stage: Stage,
    time_bonus_secs: u32,
) -> u64 {
    u64::from(total_mines) * 10
        + u64::from(time_bonus_secs.saturating_sub(elapsed_secs))
        + u64::from(stage) * 5
}

/// Run-persistent resources and statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    lives: u32,
    safe_reveal_charges: u32,
    safe_reveal_armed: bool,
    total_score: u64,
    stages_cleared: u32,
    perfect_clears: u32,
    hints_used: u32,
}

impl Ledger {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            lives: config.initial_lives.into(),
            safe_reveal_charges: config.initial_safe_reveals.into(),
            safe_reveal_armed: false,
            total_score: 0,
            stages_cleared: 0,
            perfect_clears: 0,
            hints_used: 0,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn safe_reveal_charges(&self) -> u32 {
        self.safe_reveal_charges
    }

    pub fn safe_reveal_armed(&self) -> bool {
        self.safe_reveal_armed
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn stages_cleared(&self) -> u32 {
        self.stages_cleared
    }

    pub fn perfect_clears(&self) -> u32 {
        self.perfect_clears
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Takes one life unless it is the last one.
    pub fn spend_life(&mut self) -> LifeCheck {
        if self.lives > 1 {
            self.lives -= 1;
            LifeCheck::Spent
        } else {
            LifeCheck::Exhausted
        }
    }

    pub fn arm_safe_reveal(&mut self) -> Result<()> {
        if self.safe_reveal_charges == 0 {
            return Err(GameError::NoSafeRevealCharges);
        }
        self.safe_reveal_armed = true;
        Ok(())
    }

    pub fn disarm_safe_reveal(&mut self) {
        self.safe_reveal_armed = false;
    }

    /// Uses up one charge and leaves safe-reveal mode.
    pub fn consume_safe_reveal(&mut self) -> Result<()> {
        if !self.safe_reveal_armed {
            return Err(GameError::SafeRevealNotArmed);
        }
        if self.safe_reveal_charges == 0 {
            self.safe_reveal_armed = false;
            return Err(GameError::NoSafeRevealCharges);
        }
        self.safe_reveal_charges -= 1;
        self.safe_reveal_armed = false;
        Ok(())
    }

    pub fn record_hint(&mut self) {
        self.hints_used = self.hints_used.saturating_add(1);
    }

    pub fn record_clear(&mut self, score: u64, perfect: bool) {
        self.total_score = self.total_score.saturating_add(score);
        self.stages_cleared += 1;
        if perfect {
            self.perfect_clears += 1;
        }
    }

    pub fn apply_reward(&mut self, reward: Reward) {
        match reward {
            Reward::ExtraLife => self.lives = self.lives.saturating_add(1),
            Reward::SafeRevealCharge => {
                self.safe_reveal_charges = self.safe_reveal_charges.saturating_add(1)
            }
        }
    }
}
