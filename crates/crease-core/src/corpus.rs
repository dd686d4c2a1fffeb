// Corpus loading and defensive record parsing.
//
// The corpus is the nested JSON produced by the scraping pipeline:
// format -> style ("batting" | "bowling") -> year -> list of record objects.
// Every numeric cell is coerced leniently; bad cells become zero instead of
// failing the whole load.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Match formats
// ---------------------------------------------------------------------------

/// The fixed set of match formats carried by the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchFormat {
    Test,
    Odi,
    T20,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 3] = [MatchFormat::Test, MatchFormat::Odi, MatchFormat::T20];

    /// Key used for this format in the corpus JSON and CSV file names.
    pub fn key(self) -> &'static str {
        match self {
            MatchFormat::Test => "test",
            MatchFormat::Odi => "odi",
            MatchFormat::T20 => "t20",
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match format `{0}` (expected test, odi or t20)")]
pub struct UnknownFormat(pub String);

impl FromStr for MatchFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(MatchFormat::Test),
            "odi" => Ok(MatchFormat::Odi),
            "t20" => Ok(MatchFormat::T20),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid corpus JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Lenient numeric coercion
// ---------------------------------------------------------------------------

/// Coerce a JSON cell to a finite number. Anything that is not a number or a
/// numeric string (e.g. `"-"`, `""`, `null`) becomes `0.0`.
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Convert cricket overs notation to a true decimal count of overs.
///
/// The digits after the dot are balls out of six, so `"10.3"` is ten overs
/// and three balls = 10.5 overs. Malformed text yields `0.0`.
pub fn overs_to_float(text: &str) -> f64 {
    let text = text.trim();
    let parsed = match text.split_once('.') {
        Some((whole, balls)) => match (whole.parse::<u32>(), balls.parse::<u32>()) {
            (Ok(w), Ok(b)) => Some(w as f64 + b as f64 / 6.0),
            _ => None,
        },
        None => text.parse::<f64>().ok(),
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_f64).unwrap_or(0.0))
}

fn lenient_overs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => overs_to_float(&s),
        Some(Value::Number(n)) => overs_to_float(&n.to_string()),
        _ => 0.0,
    })
}

fn trimmed_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One player's batting line for a single year of one format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BattingRecord {
    #[serde(rename = "Player Name", default, deserialize_with = "trimmed_name")]
    pub name: String,
    #[serde(rename = "Innings", default, deserialize_with = "lenient_f64")]
    pub innings: f64,
    #[serde(rename = "Not Outs", default, deserialize_with = "lenient_f64")]
    pub not_outs: f64,
    #[serde(rename = "Runs", default, deserialize_with = "lenient_f64")]
    pub runs: f64,
    #[serde(rename = "Balls Faced", default, deserialize_with = "lenient_f64")]
    pub balls_faced: f64,
    #[serde(rename = "4s", default, deserialize_with = "lenient_f64")]
    pub fours: f64,
    #[serde(rename = "6s", default, deserialize_with = "lenient_f64")]
    pub sixes: f64,
    #[serde(rename = "Ducks", default, deserialize_with = "lenient_f64")]
    pub ducks: f64,
}

/// One player's bowling line for a single year of one format.
///
/// `overs` is already converted from overs notation to decimal overs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BowlingRecord {
    #[serde(rename = "Player Name", default, deserialize_with = "trimmed_name")]
    pub name: String,
    #[serde(rename = "Innings", default, deserialize_with = "lenient_f64")]
    pub innings: f64,
    #[serde(rename = "Overs", default, deserialize_with = "lenient_overs")]
    pub overs: f64,
    /// Runs conceded.
    #[serde(rename = "Runs", default, deserialize_with = "lenient_f64")]
    pub runs: f64,
    #[serde(rename = "Wickets", default, deserialize_with = "lenient_f64")]
    pub wickets: f64,
}

/// All batting and bowling records for one format, keyed by year.
#[derive(Debug, Clone, Default)]
pub struct FormatRecords {
    pub batting: BTreeMap<i32, Vec<BattingRecord>>,
    pub bowling: BTreeMap<i32, Vec<BowlingRecord>>,
}

/// The full record corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    formats: HashMap<MatchFormat, FormatRecords>,
}

impl Corpus {
    pub fn new(formats: HashMap<MatchFormat, FormatRecords>) -> Self {
        Corpus { formats }
    }

    pub fn format(&self, format: MatchFormat) -> Option<&FormatRecords> {
        self.formats.get(&format)
    }

    /// Formats present in the corpus, in canonical order.
    pub fn formats(&self) -> Vec<MatchFormat> {
        MatchFormat::ALL
            .into_iter()
            .filter(|f| self.formats.contains_key(f))
            .collect()
    }

    /// Parse a corpus from any JSON reader.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Corpus, serde_json::Error> {
        let value: Value = serde_json::from_reader(rdr)?;
        Self::from_value(value)
    }

    /// Parse a corpus from an already-decoded JSON value.
    ///
    /// Only the top level must be an object. Sections, styles and year
    /// buckets of the wrong shape are skipped with a warning.
    pub fn from_value(value: Value) -> Result<Corpus, serde_json::Error> {
        let Value::Object(root) = value else {
            return Err(serde_json::Error::custom(
                "corpus must be an object keyed by match format",
            ));
        };

        let mut formats: HashMap<MatchFormat, FormatRecords> = HashMap::new();
        for (format_key, section) in root {
            let format = match format_key.parse::<MatchFormat>() {
                Ok(f) => f,
                Err(e) => {
                    warn!("skipping corpus section: {}", e);
                    continue;
                }
            };
            let Value::Object(styles) = section else {
                warn!("skipping {} section: expected an object of styles", format_key);
                continue;
            };
            let records = parse_section(format, styles);
            match formats.entry(format) {
                Entry::Vacant(slot) => {
                    slot.insert(records);
                }
                Entry::Occupied(mut slot) => {
                    warn!("merging duplicate `{}` section into {}", format_key, format);
                    slot.get_mut().merge(records);
                }
            }
        }
        Ok(Corpus { formats })
    }
}

impl FormatRecords {
    /// Append another section's rows year by year.
    fn merge(&mut self, other: FormatRecords) {
        for (year, rows) in other.batting {
            self.batting.entry(year).or_default().extend(rows);
        }
        for (year, rows) in other.bowling {
            self.bowling.entry(year).or_default().extend(rows);
        }
    }
}

fn parse_section(format: MatchFormat, styles: Map<String, Value>) -> FormatRecords {
    let mut records = FormatRecords::default();
    for (style, years) in styles {
        if style != "batting" && style != "bowling" {
            warn!("skipping unknown style `{}` in {} section", style, format);
            continue;
        }
        let Value::Object(years) = years else {
            warn!("skipping {} {} section: expected an object of years", format, style);
            continue;
        };
        if style == "batting" {
            records.batting = parse_years::<BattingRecord>(format, &style, years);
        } else {
            records.bowling = parse_years::<BowlingRecord>(format, &style, years);
        }
    }
    records
}

trait NamedRecord {
    fn name(&self) -> &str;
}

impl NamedRecord for BattingRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedRecord for BowlingRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

fn parse_years<T>(
    format: MatchFormat,
    style: &str,
    years: Map<String, Value>,
) -> BTreeMap<i32, Vec<T>>
where
    T: for<'de> Deserialize<'de> + NamedRecord,
{
    let mut out: BTreeMap<i32, Vec<T>> = BTreeMap::new();
    for (year_key, rows) in years {
        let year = match year_key.trim().parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                warn!("skipping {} {} bucket with non-numeric year `{}`", format, style, year_key);
                continue;
            }
        };
        let Value::Array(rows) = rows else {
            warn!("skipping {} {} bucket for {}: expected a list of records", format, style, year);
            continue;
        };
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if !row.is_object() {
                warn!("skipping non-object {} {} record for {}", format, style, year);
                continue;
            }
            match serde_json::from_value::<T>(row) {
                Ok(rec) if rec.name().is_empty() => {
                    debug!("skipping unnamed {} {} record for {}", format, style, year);
                }
                Ok(rec) => records.push(rec),
                Err(e) => warn!("skipping malformed {} {} record for {}: {}", format, style, year, e),
            }
        }
        out.entry(year).or_default().extend(records);
    }
    out
}

/// Load the corpus JSON file at `path`.
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let file = std::fs::File::open(path).map_err(|e| CorpusError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Corpus::from_reader(std::io::BufReader::new(file)).map_err(|e| CorpusError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
