// Points model: per-year normalized batting and bowling points.
//
// BatPoints  = (runs + fours + 2*sixes - 2*ducks) / year_count
// BowlPoints = wickets * 25 / year_count + economy_bonus(economy)
//
// The weights are fixed; the optimizer's optimum is sensitive to them.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{AggregatedPlayer, AggregatedRoster};
use crate::role::Role;

pub const SIX_WEIGHT: f64 = 2.0;
pub const DUCK_PENALTY: f64 = 2.0;
pub const WICKET_WEIGHT: f64 = 25.0;

/// Economy bonus steps as (inclusive upper bound, bonus).
const ECONOMY_STEPS: [(f64, f64); 3] = [(4.0, 6.0), (5.0, 4.0), (6.0, 2.0)];
/// Economy strictly above this is penalized.
const EXPENSIVE_ECONOMY: f64 = 9.0;
const EXPENSIVE_PENALTY: f64 = -4.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("no seasons with batting data in the selected range; cannot normalize points")]
    ZeroYearRange,
}

// ---------------------------------------------------------------------------
// Scoring functions
// ---------------------------------------------------------------------------

/// Step bonus for a bowler's economy rate. `None` (no overs bowled) earns
/// nothing.
pub fn economy_bonus(economy: Option<f64>) -> f64 {
    let Some(econ) = economy else {
        return 0.0;
    };
    if let Some(&(_, bonus)) = ECONOMY_STEPS.iter().find(|(upper, _)| econ <= *upper) {
        return bonus;
    }
    if econ > EXPENSIVE_ECONOMY {
        EXPENSIVE_PENALTY
    } else {
        0.0
    }
}

pub fn bat_points(player: &AggregatedPlayer, year_count: usize) -> f64 {
    (player.runs + player.fours + SIX_WEIGHT * player.sixes - DUCK_PENALTY * player.ducks)
        / year_count as f64
}

pub fn bowl_points(player: &AggregatedPlayer, year_count: usize) -> f64 {
    player.wickets * WICKET_WEIGHT / year_count as f64 + economy_bonus(player.economy_rate())
}

// ---------------------------------------------------------------------------
// Scored player
// ---------------------------------------------------------------------------

/// An aggregated player with points and an inferred role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlayer {
    pub stats: AggregatedPlayer,
    bat_points: f64,
    bowl_points: f64,
    total_points: f64,
    role: Role,
}

impl ScoredPlayer {
    /// Total and role are derived here so they always agree with the two
    /// point values.
    pub fn new(stats: AggregatedPlayer, bat_points: f64, bowl_points: f64) -> Self {
        ScoredPlayer {
            stats,
            bat_points,
            bowl_points,
            total_points: bat_points + bowl_points,
            role: Role::classify(bat_points, bowl_points),
        }
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn bat_points(&self) -> f64 {
        self.bat_points
    }

    pub fn bowl_points(&self) -> f64 {
        self.bowl_points
    }

    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Score every player in the roster.
pub fn score_roster(roster: &AggregatedRoster) -> Result<Vec<ScoredPlayer>, ScoringError> {
    if roster.year_count == 0 {
        return Err(ScoringError::ZeroYearRange);
    }
    let scored: Vec<ScoredPlayer> = roster
        .players
        .iter()
        .map(|p| {
            ScoredPlayer::new(
                p.clone(),
                bat_points(p, roster.year_count),
                bowl_points(p, roster.year_count),
            )
        })
        .collect();
    debug!(
        "scored {} players over {} seasons",
        scored.len(),
        roster.year_count
    );
    Ok(scored)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn economy_bonus_boundaries() {
        let cases = [
            (4.0, 6.0),
            (4.0001, 4.0),
            (5.0, 4.0),
            (5.0001, 2.0),
            (6.0, 2.0),
            (6.0001, 0.0),
            (9.0, 0.0),
            (9.0001, -4.0),
        ];
        for (econ, expected) in cases {
            assert_eq!(economy_bonus(Some(econ)), expected, "economy {econ}");
        }
    }

    #[test]
    fn economy_bonus_extremes() {
        assert_eq!(economy_bonus(Some(0.0)), 6.0);
        assert_eq!(economy_bonus(Some(7.5)), 0.0);
        assert_eq!(economy_bonus(Some(36.0)), -4.0);
    }

    #[test]
    fn undefined_economy_earns_no_bonus() {
        assert_eq!(economy_bonus(None), 0.0);
    }

    #[test]
    fn bat_points_formula() {
        let mut p = AggregatedPlayer::new("A");
        p.runs = 500.0;
        p.fours = 50.0;
        p.sixes = 10.0;
        p.ducks = 3.0;
        // (500 + 50 + 20 - 6) / 2
        assert!(approx_eq(bat_points(&p, 2), 282.0));
        assert!(approx_eq(bat_points(&p, 1), 564.0));
    }

    #[test]
    fn bowl_points_formula() {
        let mut p = AggregatedPlayer::new("B");
        p.wickets = 8.0;
        p.runs_conceded = 180.0;
        p.overs = 40.0; // economy 4.5 -> +4
        // 8 * 25 / 4 + 4
        assert!(approx_eq(bowl_points(&p, 4), 54.0));
    }

    #[test]
    fn non_bowler_gets_zero_bowl_points() {
        let p = AggregatedPlayer::new("C");
        assert_eq!(bowl_points(&p, 3), 0.0);
    }

    #[test]
    fn scored_player_total_is_exact_sum() {
        let sp = ScoredPlayer::new(AggregatedPlayer::new("D"), 0.1, 0.2);
        assert_eq!(sp.total_points(), 0.1 + 0.2);
        assert_eq!(sp.role(), Role::Other);
    }

    #[test]
    fn score_roster_rejects_zero_years() {
        let roster = AggregatedRoster {
            year_count: 0,
            players: vec![AggregatedPlayer::new("E")],
        };
        assert_eq!(score_roster(&roster).unwrap_err(), ScoringError::ZeroYearRange);
    }

    #[test]
    fn score_roster_classifies_and_totals() {
        let mut batter = AggregatedPlayer::new("Bat");
        batter.runs = 90.0;
        let mut bowler = AggregatedPlayer::new("Bowl");
        bowler.wickets = 4.0;
        bowler.runs_conceded = 100.0;
        bowler.overs = 10.0; // economy 10 -> -4

        let roster = AggregatedRoster {
            year_count: 2,
            players: vec![batter, bowler],
        };
        let scored = score_roster(&roster).unwrap();

        assert!(approx_eq(scored[0].bat_points(), 45.0));
        assert_eq!(scored[0].role(), Role::Batter);
        // 4 * 25 / 2 - 4
        assert!(approx_eq(scored[1].bowl_points(), 46.0));
        assert_eq!(scored[1].role(), Role::Bowler);

        for p in &scored {
            assert_eq!(p.total_points(), p.bat_points() + p.bowl_points());
        }
    }
}
