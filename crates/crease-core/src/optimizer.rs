// Squad optimizer: exact 0/1 integer program choosing the best XI.
//
// maximize   sum(x_p * total_p)
// subject to sum(x_p)                          == 11
//            sum(x_p | p bats:  batter/allrounder) >= 6
//            sum(x_p | p bowls: bowler/allrounder) >= 5
//            x_p in {0, 1}
//
// Solved with good_lp on the pure-Rust microlp branch-and-bound backend.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use good_lp::{
    constraint, microlp, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::role::AssignedRole;
use crate::scoring::ScoredPlayer;

pub const SQUAD_SIZE: usize = 11;
pub const MIN_BATTING: usize = 6;
pub const MIN_BOWLING: usize = 5;
/// Selected players relabeled as batters after optimization; the rest bowl.
pub const ASSIGNED_BATTERS: usize = 6;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Which constraint could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Infeasibility {
    SquadSize { available: usize },
    BattingCoverage { available: usize },
    BowlingCoverage { available: usize },
    /// The solver proved infeasibility without a counting explanation.
    Solver,
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::SquadSize { available } => write!(
                f,
                "squad size: need {SQUAD_SIZE} players, only {available} available"
            ),
            Infeasibility::BattingCoverage { available } => write!(
                f,
                "batting coverage: need {MIN_BATTING} batters or all-rounders, only {available} available"
            ),
            Infeasibility::BowlingCoverage { available } => write!(
                f,
                "bowling coverage: need {MIN_BOWLING} bowlers or all-rounders, only {available} available"
            ),
            Infeasibility::Solver => f.write_str("solver reported the constraints infeasible"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    #[error("no feasible XI: {0}")]
    Infeasible(Infeasibility),

    #[error("solver did not finish within {0:?}")]
    Timeout(Duration),

    #[error("solver failure: {0}")]
    Solver(String),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A selected player with the display role given after optimization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPlayer {
    pub player: ScoredPlayer,
    pub assigned_role: AssignedRole,
}

/// The optimal XI, ordered by total points descending (ties by name).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub players: Vec<SelectedPlayer>,
}

impl SelectionResult {
    /// Objective value: summed total points of the XI.
    pub fn objective(&self) -> f64 {
        self.players.iter().map(|s| s.player.total_points()).sum()
    }

    pub fn batters(&self) -> impl Iterator<Item = &SelectedPlayer> {
        self.players
            .iter()
            .filter(|s| s.assigned_role == AssignedRole::Batter)
    }

    pub fn bowlers(&self) -> impl Iterator<Item = &SelectedPlayer> {
        self.players
            .iter()
            .filter(|s| s.assigned_role == AssignedRole::Bowler)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|s| s.player.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Feasibility
// ---------------------------------------------------------------------------

/// Count-based feasibility check.
///
/// All-rounders count toward both groups, so the three counts are sufficient:
/// take up to six all-rounders, top up batting and bowling from the
/// specialists, and fill the remaining slots from anyone.
pub fn check_feasibility(players: &[ScoredPlayer]) -> Result<(), Infeasibility> {
    let batting = players.iter().filter(|p| p.role().counts_for_batting()).count();
    let bowling = players.iter().filter(|p| p.role().counts_for_bowling()).count();

    if players.len() < SQUAD_SIZE {
        return Err(Infeasibility::SquadSize {
            available: players.len(),
        });
    }
    if batting < MIN_BATTING {
        return Err(Infeasibility::BattingCoverage { available: batting });
    }
    if bowling < MIN_BOWLING {
        return Err(Infeasibility::BowlingCoverage { available: bowling });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Solve
// ---------------------------------------------------------------------------

/// Select the XI maximizing total points under the squad constraints.
///
/// Players are fed to the solver in name order so identical inputs build an
/// identical model. When several selections tie on the objective the solver
/// returns one of them.
pub fn select_xi(players: &[ScoredPlayer]) -> Result<SelectionResult, OptimizerError> {
    check_feasibility(players).map_err(|reason| {
        warn!("selection infeasible: {}", reason);
        OptimizerError::Infeasible(reason)
    })?;

    let mut ordered: Vec<&ScoredPlayer> = players.iter().collect();
    ordered.sort_by(|a, b| a.name().cmp(b.name()));

    let mut problem = variables!();
    let picks: Vec<Variable> = ordered
        .iter()
        .map(|_| problem.add(variable().binary()))
        .collect();

    let objective: Expression = ordered
        .iter()
        .zip(&picks)
        .map(|(p, &x)| p.total_points() * x)
        .sum();
    let squad: Expression = picks.iter().copied().sum();
    let batting: Expression = ordered
        .iter()
        .zip(&picks)
        .filter(|(p, _)| p.role().counts_for_batting())
        .map(|(_, &x)| x)
        .sum();
    let bowling: Expression = ordered
        .iter()
        .zip(&picks)
        .filter(|(p, _)| p.role().counts_for_bowling())
        .map(|(_, &x)| x)
        .sum();

    debug!("solving XI over {} candidates", ordered.len());
    let solution = problem
        .maximise(objective)
        .using(microlp)
        .with(constraint!(squad == SQUAD_SIZE as f64))
        .with(constraint!(batting >= MIN_BATTING as f64))
        .with(constraint!(bowling >= MIN_BOWLING as f64))
        .solve()
        .map_err(|e| match e {
            ResolutionError::Infeasible => OptimizerError::Infeasible(Infeasibility::Solver),
            other => OptimizerError::Solver(other.to_string()),
        })?;

    let selected: Vec<ScoredPlayer> = ordered
        .iter()
        .zip(&picks)
        .filter(|(_, x)| solution.value(**x) > 0.5)
        .map(|(p, _)| (*p).clone())
        .collect();

    if selected.len() != SQUAD_SIZE {
        return Err(OptimizerError::Solver(format!(
            "solver returned {} players instead of {SQUAD_SIZE}",
            selected.len()
        )));
    }

    let result = assign_roles(selected);
    info!("selected XI with {:.2} total points", result.objective());
    Ok(result)
}

/// Solve on the blocking pool, giving up after `timeout`.
///
/// A blocking solve cannot be cancelled: on timeout the thread is left to
/// finish and its result is discarded. Callers that exit after a timeout
/// should shut their runtime down with `shutdown_background` so the process
/// does not wait for it.
pub async fn select_xi_with_timeout(
    players: Vec<ScoredPlayer>,
    timeout: Duration,
) -> Result<SelectionResult, OptimizerError> {
    let handle = tokio::task::spawn_blocking(move || select_xi(&players));
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(OptimizerError::Solver(format!(
            "solver task failed: {join_err}"
        ))),
        Err(_) => {
            warn!("XI solve exceeded {:?}", timeout);
            Err(OptimizerError::Timeout(timeout))
        }
    }
}

// ---------------------------------------------------------------------------
// Post-selection roles
// ---------------------------------------------------------------------------

fn by_points_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Relabel the XI by batting rank: the six highest BatPoints bat, the rest
/// bowl. The pre-selection role is ignored.
fn assign_roles(mut selected: Vec<ScoredPlayer>) -> SelectionResult {
    selected.sort_by(|a, b| {
        by_points_desc(a.bat_points(), b.bat_points()).then_with(|| a.name().cmp(b.name()))
    });

    let mut players: Vec<SelectedPlayer> = selected
        .into_iter()
        .enumerate()
        .map(|(rank, player)| SelectedPlayer {
            player,
            assigned_role: if rank < ASSIGNED_BATTERS {
                AssignedRole::Batter
            } else {
                AssignedRole::Bowler
            },
        })
        .collect();

    players.sort_by(|a, b| {
        by_points_desc(a.player.total_points(), b.player.total_points())
            .then_with(|| a.player.name().cmp(b.player.name()))
    });

    SelectionResult { players }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
