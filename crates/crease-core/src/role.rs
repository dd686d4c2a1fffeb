// Player role classification from batting and bowling points.

use std::fmt;

use serde::Serialize;

/// Above this many points a discipline is a player's specialism.
pub const SPECIALIST_MIN: f64 = 40.0;
/// Below this many points a specialist's other discipline is negligible.
pub const SECONDARY_MAX: f64 = 15.0;
/// Both disciplines at or above this make an all-rounder.
pub const ALLROUNDER_MIN: f64 = 20.0;

/// Role inferred from a player's points before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Bowler,
    AllRounder,
    Other,
}

impl Role {
    /// Classify by thresholds, first match wins:
    /// batter, then bowler, then all-rounder, else other.
    pub fn classify(bat_points: f64, bowl_points: f64) -> Role {
        if bat_points > SPECIALIST_MIN && bowl_points < SECONDARY_MAX {
            Role::Batter
        } else if bowl_points > SPECIALIST_MIN && bat_points < SECONDARY_MAX {
            Role::Bowler
        } else if bat_points >= ALLROUNDER_MIN && bowl_points >= ALLROUNDER_MIN {
            Role::AllRounder
        } else {
            Role::Other
        }
    }

    /// Counts toward the batting-coverage minimum.
    pub fn counts_for_batting(self) -> bool {
        matches!(self, Role::Batter | Role::AllRounder)
    }

    /// Counts toward the bowling-coverage minimum.
    pub fn counts_for_bowling(self) -> bool {
        matches!(self, Role::Bowler | Role::AllRounder)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Batter => "batter",
            Role::Bowler => "bowler",
            Role::AllRounder => "allrounder",
            Role::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display role given to a selected player after optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Batter,
    Bowler,
}

impl fmt::Display for AssignedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignedRole::Batter => "batter",
            AssignedRole::Bowler => "bowler",
        })
    }
}
