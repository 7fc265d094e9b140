use serde::{Deserialize, Serialize};

use crate::*;

/// Player action forwarded by a front end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Reveal { at: Coord2 },
    ToggleFlag { at: Coord2 },
    Chord { at: Coord2 },
    Verify,
    ArmSafeReveal,
    DisarmSafeReveal,
    UseSafeReveal { at: Coord2 },
    Hint,
    SelectReward { index: usize },
    /// Fired by the front end once its stage-end or life-lost delay elapses.
    Advance,
    NewGame,
}

/// How a stage ended, kept for end-of-stage and end-of-run messaging.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Normal,
    Perfect,
    WrongFlag,
    MissingFlags,
    TooManyFlags,
    Detonated(Coord2),
}

impl StageOutcome {
    pub const fn is_clear(self) -> bool {
        matches!(self, Self::Normal | Self::Perfect)
    }
}

impl From<Verdict> for StageOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Perfect => Self::Perfect,
            Verdict::WrongFlag => Self::WrongFlag,
            Verdict::MissingFlags => Self::MissingFlags,
            Verdict::TooManyFlags => Self::TooManyFlags,
        }
    }
}

/// What an accepted intent changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    NoChange,
    Revealed,
    FlagToggled,
    SafeRevealArmed,
    SafeRevealDisarmed,
    /// Safe reveal found a mine; a life paid for it and the mine is now flagged.
    MineAutoFlagged(Coord2),
    Hint(Coord2),
    StageCleared(StageOutcome),
    LifeLost(StageOutcome),
    RunLost(StageOutcome),
    RewardsOffered,
    RewardApplied(Reward),
    StageRestarted,
    RunWon,
    NewGame,
}

impl Event {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn ends_stage(self) -> bool {
        matches!(
            self,
            Self::StageCleared(_) | Self::LifeLost(_) | Self::RunLost(_)
        )
    }
}
