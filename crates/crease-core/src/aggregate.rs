// Record aggregation: collapse per-year batting and bowling lines into one
// row per player for a format and an inclusive year range.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::corpus::FormatRecords;

// ---------------------------------------------------------------------------
// Year range
// ---------------------------------------------------------------------------

/// Inclusive range of seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: i32, end: i32) -> Option<Self> {
        (start <= end).then_some(YearRange { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Aggregated player
// ---------------------------------------------------------------------------

/// Summed counting stats for one player over the selected years.
///
/// A player seen only in batting (or only in bowling) keeps zeros for the
/// other discipline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPlayer {
    pub name: String,
    pub runs: f64,
    pub fours: f64,
    pub sixes: f64,
    pub ducks: f64,
    pub wickets: f64,
    pub runs_conceded: f64,
    /// Decimal overs (already converted from overs notation).
    pub overs: f64,
}

impl AggregatedPlayer {
    /// Zero-filled row for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        AggregatedPlayer {
            name: name.into(),
            runs: 0.0,
            fours: 0.0,
            sixes: 0.0,
            ducks: 0.0,
            wickets: 0.0,
            runs_conceded: 0.0,
            overs: 0.0,
        }
    }

    /// Runs conceded per over from the summed totals. `None` when the player
    /// bowled no overs.
    pub fn economy_rate(&self) -> Option<f64> {
        (self.overs > 0.0).then(|| self.runs_conceded / self.overs)
    }

    pub fn economy_rate_or_zero(&self) -> f64 {
        self.economy_rate().unwrap_or(0.0)
    }
}

/// Output of aggregation for one query.
#[derive(Debug, Clone)]
pub struct AggregatedRoster {
    /// Number of in-range years that have at least one batting record.
    pub year_count: usize,
    /// One row per distinct player, ordered by name.
    pub players: Vec<AggregatedPlayer>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum every in-range batting and bowling line per player name, outer-joining
/// the two disciplines.
///
/// The seasons are those with batting rows; bowling is read for the same
/// seasons so both disciplines are normalized by the same `year_count`.
pub fn aggregate_players(records: &FormatRecords, range: YearRange) -> AggregatedRoster {
    let mut by_name: BTreeMap<String, AggregatedPlayer> = BTreeMap::new();

    let seasons: Vec<_> = records
        .batting
        .range(range.start..=range.end)
        .filter(|(_, rows)| !rows.is_empty())
        .collect();

    for &(year, rows) in &seasons {
        for rec in rows {
            let row = by_name
                .entry(rec.name.clone())
                .or_insert_with(|| AggregatedPlayer::new(rec.name.as_str()));
            row.runs += rec.runs;
            row.fours += rec.fours;
            row.sixes += rec.sixes;
            row.ducks += rec.ducks;
        }
        debug!("aggregated {} batting rows for {}", rows.len(), year);

        let Some(rows) = records.bowling.get(year) else {
            continue;
        };
        for rec in rows {
            let row = by_name
                .entry(rec.name.clone())
                .or_insert_with(|| AggregatedPlayer::new(rec.name.as_str()));
            row.wickets += rec.wickets;
            row.runs_conceded += rec.runs;
            row.overs += rec.overs;
        }
        debug!("aggregated {} bowling rows for {}", rows.len(), year);
    }

    let year_count = seasons.len();
    AggregatedRoster {
        year_count,
        players: by_name.into_values().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
