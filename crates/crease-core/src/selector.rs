// Query pipeline: corpus slice -> aggregate -> score -> optimal XI.

use std::time::Duration;

use tracing::info;

use crate::aggregate::{aggregate_players, YearRange};
use crate::corpus::{Corpus, MatchFormat};
use crate::optimizer::{select_xi_with_timeout, Infeasibility, OptimizerError, SelectionResult};
use crate::scoring::{score_roster, ScoredPlayer, ScoringError};

/// One optimal-XI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionQuery {
    pub format: MatchFormat,
    pub range: YearRange,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectorError {
    #[error("format `{0}` is not present in the corpus")]
    UnknownFormat(MatchFormat),

    #[error("no {format} batting data between {range}")]
    NoData { format: MatchFormat, range: YearRange },

    #[error("no feasible XI: {0}")]
    Infeasible(Infeasibility),

    #[error("solver did not finish within {0:?}")]
    Timeout(Duration),

    #[error("solver failure: {0}")]
    Solver(String),
}

impl SelectorError {
    /// Nothing to select from: show an empty-data view.
    pub fn is_no_data(&self) -> bool {
        matches!(self, SelectorError::UnknownFormat(_) | SelectorError::NoData { .. })
    }

    /// Data exists but no XI satisfies the squad rules.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SelectorError::Infeasible(_))
    }
}

impl From<OptimizerError> for SelectorError {
    fn from(e: OptimizerError) -> Self {
        match e {
            OptimizerError::Infeasible(reason) => SelectorError::Infeasible(reason),
            OptimizerError::Timeout(d) => SelectorError::Timeout(d),
            OptimizerError::Solver(msg) => SelectorError::Solver(msg),
        }
    }
}

/// Aggregate and score every player for the query.
pub fn scored_players(
    corpus: &Corpus,
    query: &SelectionQuery,
) -> Result<Vec<ScoredPlayer>, SelectorError> {
    let records = corpus
        .format(query.format)
        .ok_or(SelectorError::UnknownFormat(query.format))?;
    let roster = aggregate_players(records, query.range);
    score_roster(&roster).map_err(|e| match e {
        ScoringError::ZeroYearRange => SelectorError::NoData {
            format: query.format,
            range: query.range,
        },
    })
}

/// Compute the optimal XI for `query`, giving the solver at most `timeout`.
pub async fn select_optimal_xi(
    corpus: &Corpus,
    query: &SelectionQuery,
    timeout: Duration,
) -> Result<SelectionResult, SelectorError> {
    let players = scored_players(corpus, query)?;
    info!(
        "selecting {} XI for {} from {} players",
        query.format,
        query.range,
        players.len()
    );
    Ok(select_xi_with_timeout(players, timeout).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(format: MatchFormat, start: i32, end: i32) -> SelectionQuery {
        SelectionQuery {
            format,
            range: YearRange::new(start, end).unwrap(),
        }
    }

    #[test]
    fn missing_format_is_no_data() {
        let corpus = Corpus::from_value(json!({"odi": {"batting": {}, "bowling": {}}})).unwrap();
        let err = scored_players(&corpus, &query(MatchFormat::Test, 2011, 2025)).unwrap_err();
        assert_eq!(err, SelectorError::UnknownFormat(MatchFormat::Test));
        assert!(err.is_no_data());
        assert!(!err.is_infeasible());
    }

    #[test]
    fn empty_range_is_no_data_not_divide_by_zero() {
        let corpus = Corpus::from_value(json!({
            "odi": {
                "batting": {"2019": [{"Player Name": "A", "Runs": "10"}]},
                "bowling": {"2021": [{"Player Name": "B", "Wickets": "2", "Overs": "4"}]}
            }
        }))
        .unwrap();
        let err = scored_players(&corpus, &query(MatchFormat::Odi, 2020, 2022)).unwrap_err();
        assert!(err.is_no_data());
    }

    #[tokio::test]
    async fn small_pool_is_infeasible() {
        let corpus = Corpus::from_value(json!({
            "odi": {
                "batting": {"2019": [{"Player Name": "A", "Runs": "100"}]},
                "bowling": {}
            }
        }))
        .unwrap();
        let err = select_optimal_xi(&corpus, &query(MatchFormat::Odi, 2019, 2019), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(err, SelectorError::Infeasible(Infeasibility::SquadSize { available: 1 }));
        assert!(err.is_infeasible());
    }

    #[test]
    fn optimizer_errors_map_one_to_one() {
        let d = Duration::from_secs(1);
        assert_eq!(SelectorError::from(OptimizerError::Timeout(d)), SelectorError::Timeout(d));
        assert_eq!(
            SelectorError::from(OptimizerError::Solver("x".into())),
            SelectorError::Solver("x".into())
        );
    }
}
