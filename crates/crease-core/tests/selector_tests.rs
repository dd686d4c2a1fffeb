// Integration tests for the optimal-XI pipeline.
//
// These drive the public API from a JSON corpus through aggregation, scoring,
// role classification and the ILP solve, and check the selected XI against a
// hand-computed optimum.

use std::time::Duration;

use crease_core::aggregate::YearRange;
use crease_core::corpus::{Corpus, MatchFormat};
use crease_core::optimizer::{
    select_xi, Infeasibility, OptimizerError, ASSIGNED_BATTERS, SQUAD_SIZE,
};
use crease_core::role::{AssignedRole, Role};
use crease_core::scoring::ScoredPlayer;
use crease_core::selector::{scored_players, select_optimal_xi, SelectionQuery, SelectorError};
use serde_json::{json, Value};

// ===========================================================================
// Fixture
// ===========================================================================
//
// One ODI season, so points are not divided down. Expected (bat, bowl, total):
//
//   B1 (100,  0) 100 batter      W1 (10, 81)  91 bowler
//   B2 ( 90,  0)  90 batter      W2 ( 0, 77)  77 bowler
//   B3 ( 80,  0)  80 batter      W3 ( 2, 71)  73 bowler
//   B4 ( 70,  0)  70 batter      W4 ( 0, 56)  56 bowler
//   B5 ( 60,  2)  62 batter      W5 ( 0, 46)  46 bowler
//   B6 ( 41,  0)  41 batter      A1 (30, 31)  61 allrounder
//   O1 ( 19, 50)  69 other       A2 (22, 21)  43 allrounder
//   O2 ( 19, 56)  75 other
//
// The eleven highest totals hold only four bowling-eligible players
// (W1, W2, W3, A1). The cheapest repair swaps O1 (69) for W4 (56).

const EXPECTED_XI: [&str; 11] = [
    "B1", "W1", "B2", "B3", "W2", "O2", "W3", "B4", "B5", "A1", "W4",
];
const EXPECTED_OBJECTIVE: f64 = 835.0;

fn batting_rows() -> Value {
    json!([
        {"Player Name": "B1", "Runs": "80", "4s": "10", "6s": "6", "Ducks": "1"},
        {"Player Name": "B2", "Runs": "90", "4s": "0", "6s": "0", "Ducks": "0"},
        {"Player Name": "B3", "Runs": "80", "4s": "-", "6s": "0", "Ducks": "0"},
        {"Player Name": "B4", "Runs": "70"},
        {"Player Name": "B5", "Runs": "60", "4s": "0", "6s": "0", "Ducks": "0"},
        {"Player Name": "B6", "Runs": "41"},
        {"Player Name": "W1", "Runs": "10"},
        {"Player Name": "W3", "Runs": "2"},
        {"Player Name": "O1", "Runs": "19"},
        {"Player Name": "O2", "Runs": "19"},
        {"Player Name": "A1", "Runs": "30"},
        {"Player Name": "A2", "Runs": "22"}
    ])
}

fn bowling_rows() -> Value {
    json!([
        {"Player Name": "W1", "Wickets": "3", "Overs": "10", "Runs": "35"},
        {"Player Name": "B5", "Wickets": "0", "Overs": "2", "Runs": "11"},
        {"Player Name": "W2", "Wickets": "3", "Overs": "20", "Runs": "110"},
        {"Player Name": "O2", "Wickets": "2", "Overs": "10", "Runs": "30"},
        {"Player Name": "W3", "Wickets": "3", "Overs": "5", "Runs": "50"},
        {"Player Name": "O1", "Wickets": "2", "Overs": "10", "Runs": "70"},
        {"Player Name": "A1", "Wickets": "1", "Overs": "7.3", "Runs": "24"},
        {"Player Name": "W4", "Wickets": "2", "Overs": "9", "Runs": "27"},
        {"Player Name": "W5", "Wickets": "2", "Overs": "4", "Runs": "40"},
        {"Player Name": "A2", "Wickets": "1", "Overs": "3", "Runs": "30"}
    ])
}

fn fifteen_player_corpus() -> Corpus {
    Corpus::from_value(json!({
        "odi": {
            "batting": {"2020": batting_rows()},
            "bowling": {"2020": bowling_rows()}
        }
    }))
    .unwrap()
}

/// The same season repeated twice; per-year normalization should cancel out.
fn two_season_corpus() -> Corpus {
    Corpus::from_value(json!({
        "odi": {
            "batting": {"2020": batting_rows(), "2021": batting_rows()},
            "bowling": {"2020": bowling_rows(), "2021": bowling_rows()}
        }
    }))
    .unwrap()
}

/// A season with bowling rows but no batting table sits next to the fixture.
fn corpus_with_bowling_only_season() -> Corpus {
    Corpus::from_value(json!({
        "odi": {
            "batting": {"2020": batting_rows()},
            "bowling": {
                "2019": [{"Player Name": "W5", "Wickets": "40", "Overs": "60", "Runs": "200"}],
                "2020": bowling_rows()
            }
        }
    }))
    .unwrap()
}

fn odi(start: i32, end: i32) -> SelectionQuery {
    SelectionQuery {
        format: MatchFormat::Odi,
        range: YearRange::new(start, end).unwrap(),
    }
}

fn find<'a>(players: &'a [ScoredPlayer], name: &str) -> &'a ScoredPlayer {
    players.iter().find(|p| p.name() == name).unwrap()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ===========================================================================
// Scoring through the pipeline
// ===========================================================================

#[test]
fn fixture_points_and_roles_match_hand_computation() {
    let players = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    assert_eq!(players.len(), 15);

    let expected: [(&str, f64, f64, Role); 15] = [
        ("B1", 100.0, 0.0, Role::Batter),
        ("B2", 90.0, 0.0, Role::Batter),
        ("B3", 80.0, 0.0, Role::Batter),
        ("B4", 70.0, 0.0, Role::Batter),
        ("B5", 60.0, 2.0, Role::Batter),
        ("B6", 41.0, 0.0, Role::Batter),
        ("W1", 10.0, 81.0, Role::Bowler),
        ("W2", 0.0, 77.0, Role::Bowler),
        ("W3", 2.0, 71.0, Role::Bowler),
        ("W4", 0.0, 56.0, Role::Bowler),
        ("W5", 0.0, 46.0, Role::Bowler),
        ("A1", 30.0, 31.0, Role::AllRounder),
        ("A2", 22.0, 21.0, Role::AllRounder),
        ("O1", 19.0, 50.0, Role::Other),
        ("O2", 19.0, 56.0, Role::Other),
    ];
    for (name, bat, bowl, role) in expected {
        let p = find(&players, name);
        assert!(approx_eq(p.bat_points(), bat), "{name} bat {}", p.bat_points());
        assert!(approx_eq(p.bowl_points(), bowl), "{name} bowl {}", p.bowl_points());
        assert_eq!(p.role(), role, "{name}");
    }
}

#[test]
fn total_is_exact_sum_for_every_player() {
    let players = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    for p in &players {
        assert_eq!(p.total_points(), p.bat_points() + p.bowl_points(), "{}", p.name());
    }
}

#[test]
fn bowling_only_players_are_zero_filled() {
    let players = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    let w2 = find(&players, "W2");
    assert_eq!(w2.stats.runs, 0.0);
    assert_eq!(w2.bat_points(), 0.0);

    let b2 = find(&players, "B2");
    assert_eq!(b2.stats.overs, 0.0);
    assert_eq!(b2.stats.economy_rate(), None);
    assert_eq!(b2.bowl_points(), 0.0);
}

#[test]
fn overs_notation_feeds_economy() {
    let players = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    let a1 = find(&players, "A1");
    assert!(approx_eq(a1.stats.overs, 7.5));
    assert!(approx_eq(a1.stats.economy_rate().unwrap(), 3.2));
}

// ===========================================================================
// Optimal XI
// ===========================================================================

#[tokio::test]
async fn selects_known_optimal_eleven() {
    let result = select_optimal_xi(&fifteen_player_corpus(), &odi(2020, 2020), Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(result.players.len(), SQUAD_SIZE);
    let mut names: Vec<&str> = result.players.iter().map(|s| s.player.name()).collect();
    names.sort_unstable();
    let mut expected = EXPECTED_XI.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);
    assert!(approx_eq(result.objective(), EXPECTED_OBJECTIVE));
    assert!(!result.contains("O1"));
}

#[tokio::test]
async fn assigned_roles_follow_bat_points_rank() {
    let result = select_optimal_xi(&fifteen_player_corpus(), &odi(2020, 2020), Duration::from_secs(30))
        .await
        .unwrap();

    let mut batters: Vec<&str> = result.batters().map(|s| s.player.name()).collect();
    batters.sort_unstable();
    assert_eq!(batters, vec!["A1", "B1", "B2", "B3", "B4", "B5"]);

    let mut bowlers: Vec<&str> = result.bowlers().map(|s| s.player.name()).collect();
    bowlers.sort_unstable();
    assert_eq!(bowlers, vec!["O2", "W1", "W2", "W3", "W4"]);

    assert_eq!(result.batters().count(), ASSIGNED_BATTERS);
    assert_eq!(result.bowlers().count(), SQUAD_SIZE - ASSIGNED_BATTERS);
}

#[tokio::test]
async fn presentation_order_is_total_points_desc() {
    let result = select_optimal_xi(&fifteen_player_corpus(), &odi(2020, 2020), Duration::from_secs(30))
        .await
        .unwrap();
    let order: Vec<&str> = result.players.iter().map(|s| s.player.name()).collect();
    assert_eq!(order, EXPECTED_XI.to_vec());

    let o2 = result.players.iter().find(|s| s.player.name() == "O2").unwrap();
    assert_eq!(o2.assigned_role, AssignedRole::Bowler);
}

#[tokio::test]
async fn repeated_seasons_normalize_to_the_same_xi() {
    let one = select_optimal_xi(&fifteen_player_corpus(), &odi(2020, 2020), Duration::from_secs(30))
        .await
        .unwrap();
    let two = select_optimal_xi(&two_season_corpus(), &odi(2011, 2025), Duration::from_secs(30))
        .await
        .unwrap();
    assert!(approx_eq(one.objective(), two.objective()));
    let a: Vec<&str> = one.players.iter().map(|s| s.player.name()).collect();
    let b: Vec<&str> = two.players.iter().map(|s| s.player.name()).collect();
    assert_eq!(a, b);
}

#[test]
fn bowling_only_season_is_outside_the_normalized_range() {
    let baseline = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    let widened = scored_players(&corpus_with_bowling_only_season(), &odi(2019, 2020)).unwrap();
    assert_eq!(baseline, widened);
    assert!(approx_eq(find(&widened, "W5").bowl_points(), 46.0));
}

#[test]
fn repeated_queries_are_identical() {
    let corpus = fifteen_player_corpus();
    let players = scored_players(&corpus, &odi(2020, 2020)).unwrap();
    let first = select_xi(&players).unwrap();
    let second = select_xi(&players).unwrap();
    assert_eq!(first, second);
}

#[test]
fn raising_a_score_never_lowers_the_optimum() {
    let players = scored_players(&fifteen_player_corpus(), &odi(2020, 2020)).unwrap();
    let baseline = select_xi(&players).unwrap().objective();

    for bump_name in ["W4", "B1", "A1"] {
        let bumped: Vec<ScoredPlayer> = players
            .iter()
            .map(|p| {
                if p.name() == bump_name {
                    ScoredPlayer::new(p.stats.clone(), p.bat_points(), p.bowl_points() + 10.0)
                } else {
                    p.clone()
                }
            })
            .collect();
        let objective = select_xi(&bumped).unwrap().objective();
        assert!(objective >= baseline, "bumping {bump_name}: {objective} < {baseline}");
    }
}

// ===========================================================================
// Failure states
// ===========================================================================

#[tokio::test]
async fn range_without_batting_is_no_data() {
    let err = select_optimal_xi(&fifteen_player_corpus(), &odi(2015, 2018), Duration::from_secs(30))
        .await
        .unwrap_err();
    assert!(err.is_no_data());
    assert!(matches!(err, SelectorError::NoData { .. }));
}

#[test]
fn too_few_bowling_eligible_is_reported() {
    let players: Vec<ScoredPlayer> = scored_players(&fifteen_player_corpus(), &odi(2020, 2020))
        .unwrap()
        .into_iter()
        .filter(|p| !matches!(p.name(), "W4" | "W5" | "A2" | "W3"))
        .collect();
    // W1, W2, A1 remain bowling-eligible
    let err = select_xi(&players).unwrap_err();
    assert_eq!(
        err,
        OptimizerError::Infeasible(Infeasibility::BowlingCoverage { available: 3 })
    );
}

#[test]
fn too_few_batting_eligible_is_reported() {
    let players: Vec<ScoredPlayer> = scored_players(&fifteen_player_corpus(), &odi(2020, 2020))
        .unwrap()
        .into_iter()
        .filter(|p| !matches!(p.name(), "B4" | "B5" | "B6"))
        .collect();
    // B1, B2, B3, A1, A2 remain batting-eligible
    let err = select_xi(&players).unwrap_err();
    assert_eq!(
        err,
        OptimizerError::Infeasible(Infeasibility::BattingCoverage { available: 5 })
    );
}

#[test]
fn fewer_than_eleven_players_is_reported() {
    let players: Vec<ScoredPlayer> = scored_players(&fifteen_player_corpus(), &odi(2020, 2020))
        .unwrap()
        .into_iter()
        .take(10)
        .collect();
    let err = select_xi(&players).unwrap_err();
    assert_eq!(
        err,
        OptimizerError::Infeasible(Infeasibility::SquadSize { available: 10 })
    );
}
