// Player career summaries and per-format leader boards.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::aggregate::YearRange;
use crate::corpus::{Corpus, FormatRecords, MatchFormat};

// ---------------------------------------------------------------------------
// Player summary
// ---------------------------------------------------------------------------

/// Summed batting numbers for one player in one format.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattingLine {
    pub innings: f64,
    pub not_outs: f64,
    pub runs: f64,
    pub balls_faced: f64,
    pub fours: f64,
    pub sixes: f64,
}

impl BattingLine {
    /// Runs per dismissal; innings without a dismissal count as one.
    pub fn average(&self) -> f64 {
        self.runs / (self.innings - self.not_outs).max(1.0)
    }

    pub fn strike_rate(&self) -> f64 {
        if self.balls_faced > 0.0 {
            self.runs / self.balls_faced * 100.0
        } else {
            0.0
        }
    }

    fn add(&mut self, other: &BattingLine) {
        self.innings += other.innings;
        self.not_outs += other.not_outs;
        self.runs += other.runs;
        self.balls_faced += other.balls_faced;
        self.fours += other.fours;
        self.sixes += other.sixes;
    }
}

/// Summed bowling numbers for one player in one format.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BowlingLine {
    pub innings: f64,
    pub overs: f64,
    pub runs_conceded: f64,
    pub wickets: f64,
}

impl BowlingLine {
    pub fn economy(&self) -> Option<f64> {
        (self.overs > 0.0).then(|| self.runs_conceded / self.overs)
    }

    /// Runs conceded per wicket.
    pub fn average(&self) -> Option<f64> {
        (self.wickets > 0.0).then(|| self.runs_conceded / self.wickets)
    }

    fn add(&mut self, other: &BowlingLine) {
        self.innings += other.innings;
        self.overs += other.overs;
        self.runs_conceded += other.runs_conceded;
        self.wickets += other.wickets;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatSummary {
    pub format: MatchFormat,
    pub batting: Option<BattingLine>,
    pub bowling: Option<BowlingLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub range: YearRange,
    /// Formats the player appears in, in canonical format order.
    pub formats: Vec<FormatSummary>,
}

impl PlayerSummary {
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Counting stats summed across formats.
    pub fn totals(&self) -> (BattingLine, BowlingLine) {
        let mut bat = BattingLine::default();
        let mut bowl = BowlingLine::default();
        for f in &self.formats {
            if let Some(b) = &f.batting {
                bat.add(b);
            }
            if let Some(b) = &f.bowling {
                bowl.add(b);
            }
        }
        (bat, bowl)
    }
}

/// Summarize one player's batting and bowling per format over `range`.
pub fn player_summary(corpus: &Corpus, name: &str, range: YearRange) -> PlayerSummary {
    let name = name.trim();
    let mut formats = Vec::new();

    for format in corpus.formats() {
        let Some(records) = corpus.format(format) else {
            continue;
        };

        let mut batting: Option<BattingLine> = None;
        for rec in records
            .batting
            .range(range.start()..=range.end())
            .flat_map(|(_, rows)| rows)
            .filter(|r| r.name == name)
        {
            batting.get_or_insert_with(Default::default).add(&BattingLine {
                innings: rec.innings,
                not_outs: rec.not_outs,
                runs: rec.runs,
                balls_faced: rec.balls_faced,
                fours: rec.fours,
                sixes: rec.sixes,
            });
        }

        let mut bowling: Option<BowlingLine> = None;
        for rec in records
            .bowling
            .range(range.start()..=range.end())
            .flat_map(|(_, rows)| rows)
            .filter(|r| r.name == name)
        {
            bowling.get_or_insert_with(Default::default).add(&BowlingLine {
                innings: rec.innings,
                overs: rec.overs,
                runs_conceded: rec.runs,
                wickets: rec.wickets,
            });
        }

        if batting.is_some() || bowling.is_some() {
            formats.push(FormatSummary {
                format,
                batting,
                bowling,
            });
        }
    }

    PlayerSummary {
        name: name.to_string(),
        range,
        formats,
    }
}

// ---------------------------------------------------------------------------
// Format leaders
// ---------------------------------------------------------------------------

/// One leader-board row. `average` is the batting average for run scorers and
/// runs per wicket for wicket takers; `None` when it is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leader {
    pub name: String,
    pub value: f64,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatLeaders {
    pub run_scorers: Vec<Leader>,
    pub wicket_takers: Vec<Leader>,
}

/// Highest value first, ties by name.
fn rank_desc<T>(rows: &mut [T], key: impl Fn(&T) -> (f64, &str)) {
    rows.sort_by(|a, b| {
        let (av, an) = key(a);
        let (bv, bn) = key(b);
        bv.partial_cmp(&av)
            .unwrap_or(Ordering::Equal)
            .then_with(|| an.cmp(bn))
    });
}

fn top_n(mut leaders: Vec<Leader>, limit: usize) -> Vec<Leader> {
    rank_desc(&mut leaders, |l| (l.value, l.name.as_str()));
    leaders.truncate(limit);
    leaders
}

/// Top `limit` run scorers and wicket takers for one format over `range`.
pub fn format_leaders(records: &FormatRecords, range: YearRange, limit: usize) -> FormatLeaders {
    let mut batting: HashMap<&str, BattingLine> = HashMap::new();
    for rec in records
        .batting
        .range(range.start()..=range.end())
        .flat_map(|(_, rows)| rows)
    {
        batting.entry(rec.name.as_str()).or_default().add(&BattingLine {
            innings: rec.innings,
            not_outs: rec.not_outs,
            runs: rec.runs,
            ..Default::default()
        });
    }

    let mut bowling: HashMap<&str, BowlingLine> = HashMap::new();
    for rec in records
        .bowling
        .range(range.start()..=range.end())
        .flat_map(|(_, rows)| rows)
    {
        bowling.entry(rec.name.as_str()).or_default().add(&BowlingLine {
            runs_conceded: rec.runs,
            wickets: rec.wickets,
            ..Default::default()
        });
    }

    let run_scorers = batting
        .into_iter()
        .map(|(name, line)| Leader {
            name: name.to_string(),
            value: line.runs,
            average: Some(line.average()),
        })
        .collect();
    let wicket_takers = bowling
        .into_iter()
        .map(|(name, line)| Leader {
            name: name.to_string(),
            value: line.wickets,
            average: line.average(),
        })
        .collect();

    FormatLeaders {
        run_scorers: top_n(run_scorers, limit),
        wicket_takers: top_n(wicket_takers, limit),
    }
}

// ---------------------------------------------------------------------------
// Season contributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub name: String,
    pub value: f64,
}

/// The largest individual shares of one season total, plus everyone else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contributions {
    pub top: Vec<Contribution>,
    /// Sum over players not in `top`.
    pub others: f64,
}

impl Contributions {
    pub fn total(&self) -> f64 {
        self.top.iter().map(|c| c.value).sum::<f64>() + self.others
    }

    fn from_totals(totals: HashMap<&str, f64>, limit: usize) -> Contributions {
        let mut all: Vec<Contribution> = totals
            .into_iter()
            .map(|(name, value)| Contribution {
                name: name.to_string(),
                value,
            })
            .collect();
        rank_desc(&mut all, |c| (c.value, c.name.as_str()));
        let rest = all.split_off(limit.min(all.len()));
        Contributions {
            top: all,
            others: rest.iter().map(|c| c.value).sum(),
        }
    }
}

/// Who scored the runs and took the wickets in one format and season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearContributions {
    pub year: i32,
    pub runs: Contributions,
    pub wickets: Contributions,
}

/// Split one season's runs and wickets into the top `limit` players and the
/// remainder.
pub fn year_contributions(records: &FormatRecords, year: i32, limit: usize) -> YearContributions {
    let mut runs: HashMap<&str, f64> = HashMap::new();
    for rec in records.batting.get(&year).into_iter().flatten() {
        *runs.entry(rec.name.as_str()).or_default() += rec.runs;
    }

    let mut wickets: HashMap<&str, f64> = HashMap::new();
    for rec in records.bowling.get(&year).into_iter().flatten() {
        *wickets.entry(rec.name.as_str()).or_default() += rec.wickets;
    }

    YearContributions {
        year,
        runs: Contributions::from_totals(runs, limit),
        wickets: Contributions::from_totals(wickets, limit),
    }
}

// ---------------------------------------------------------------------------
// Player comparison
// ---------------------------------------------------------------------------

/// A player's runs and wickets in one season; `None` when they have no row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeasonLine {
    pub runs: Option<f64>,
    pub wickets: Option<f64>,
}

/// Both players' numbers for one format and season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonComparison {
    pub format: MatchFormat,
    pub year: i32,
    pub first: SeasonLine,
    pub second: SeasonLine,
}

/// Two players side by side: per-format summaries plus a season-by-season
/// table covering every season either of them played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerComparison {
    pub first: PlayerSummary,
    pub second: PlayerSummary,
    pub seasons: Vec<SeasonComparison>,
}

fn season_lines(
    records: &FormatRecords,
    name: &str,
    range: YearRange,
) -> BTreeMap<i32, SeasonLine> {
    let mut lines: BTreeMap<i32, SeasonLine> = BTreeMap::new();
    for (&year, rows) in records.batting.range(range.start()..=range.end()) {
        for rec in rows.iter().filter(|r| r.name == name) {
            *lines.entry(year).or_default().runs.get_or_insert(0.0) += rec.runs;
        }
    }
    for (&year, rows) in records.bowling.range(range.start()..=range.end()) {
        for rec in rows.iter().filter(|r| r.name == name) {
            *lines.entry(year).or_default().wickets.get_or_insert(0.0) += rec.wickets;
        }
    }
    lines
}

/// Compare two players over `range` across every format in the corpus.
pub fn compare_players(
    corpus: &Corpus,
    first: &str,
    second: &str,
    range: YearRange,
) -> PlayerComparison {
    let (first, second) = (first.trim(), second.trim());
    let mut seasons = Vec::new();

    for format in corpus.formats() {
        let Some(records) = corpus.format(format) else {
            continue;
        };
        let mut a = season_lines(records, first, range);
        let mut b = season_lines(records, second, range);
        let years: BTreeSet<i32> = a.keys().chain(b.keys()).copied().collect();
        for year in years {
            seasons.push(SeasonComparison {
                format,
                year,
                first: a.remove(&year).unwrap_or_default(),
                second: b.remove(&year).unwrap_or_default(),
            });
        }
    }

    PlayerComparison {
        first: player_summary(corpus, first, range),
        second: player_summary(corpus, second, range),
        seasons,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
