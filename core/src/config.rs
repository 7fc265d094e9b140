use serde::{Deserialize, Serialize};

use crate::*;

/// Upper bound on rewards offered per cleared stage.
pub const MAX_REWARD_CHOICES: usize = 8;

/// Tunables for a run. Missing fields fall back to the defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub initial_lives: u8,
    pub initial_safe_reveals: u8,
    /// Number of rewards offered after each cleared stage.
    pub reward_choices: usize,
    /// Seconds after which a stage no longer earns a time bonus.
    pub time_bonus_secs: u32,
    /// Clearing this stage wins the run; `None` keeps stages coming forever.
    pub final_stage: Option<Stage>,
    /// Fixed seed for reproducible runs; drawn at random when absent.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            initial_safe_reveals: 1,
            reward_choices: 3,
            time_bonus_secs: 300,
            final_stage: None,
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_lives == 0 || !(1..=MAX_REWARD_CHOICES).contains(&self.reward_choices) {
            return Err(GameError::InvalidConfig);
        }
        if self.final_stage == Some(0) {
            return Err(GameError::InvalidConfig);
        }
        Ok(())
    }
}
