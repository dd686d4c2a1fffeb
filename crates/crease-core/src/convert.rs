// Build the nested JSON corpus from a directory of scraped CSV tables.
//
// Input files are named `<format>_<style>_<year>.csv`, e.g. `odi_batting_2019.csv`.
// Cells are kept as strings; numeric coercion happens when the corpus is loaded.

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::corpus::{CorpusError, MatchFormat};

const STYLES: [&str; 2] = ["batting", "bowling"];

/// Split a corpus CSV file name into (format, style, year).
fn parse_file_name(file_name: &str) -> Option<(MatchFormat, &'static str, i32)> {
    let stem = file_name.strip_suffix(".csv")?;
    let mut parts = stem.splitn(3, '_');
    let format = parts.next()?.parse::<MatchFormat>().ok()?;
    let style_part = parts.next()?;
    let style = STYLES.into_iter().find(|s| *s == style_part)?;
    let year = parts.next()?.parse::<i32>().ok()?;
    Some((format, style, year))
}

fn rows_from_reader<R: Read>(rdr: R) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let row: Map<String, Value> = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, cell)| (h.trim().to_string(), Value::String(cell.trim().to_string())))
                    .collect();
                rows.push(Value::Object(row));
            }
            Err(e) => warn!("skipping malformed CSV row: {}", e),
        }
    }
    Ok(rows)
}

fn empty_format_section() -> Value {
    let mut styles = Map::new();
    for style in STYLES {
        styles.insert(style.to_string(), Value::Object(Map::new()));
    }
    Value::Object(styles)
}

/// Scan `dir` for corpus CSV files and assemble the nested corpus JSON.
///
/// Every format and both styles are always present, possibly empty.
pub fn build_corpus_json(dir: &Path) -> Result<Value, CorpusError> {
    let io_err = |e: std::io::Error| CorpusError::Io {
        path: dir.display().to_string(),
        source: e,
    };

    let mut corpus = Map::new();
    for format in MatchFormat::ALL {
        corpus.insert(format.key().to_string(), empty_format_section());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|e| e.file_name());

    let mut loaded = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((format, style, year)) = parse_file_name(file_name) else {
            debug!("ignoring {}", path.display());
            continue;
        };

        let file = std::fs::File::open(&path).map_err(|e| CorpusError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let rows = rows_from_reader(file).map_err(|e| CorpusError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("{}: {} rows", file_name, rows.len());

        if let Some(years) = corpus
            .get_mut(format.key())
            .and_then(|f| f.get_mut(style))
            .and_then(Value::as_object_mut)
        {
            years.insert(year.to_string(), Value::Array(rows));
            loaded += 1;
        }
    }

    info!("built corpus from {} CSV files in {}", loaded, dir.display());
    Ok(Value::Object(corpus))
}

/// Write the corpus JSON to `path`, pretty-printed.
pub fn write_corpus_json(corpus: &Value, path: &Path) -> Result<(), CorpusError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CorpusError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|e| CorpusError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_pretty(corpus, file, path)
}

/// Serialize through a buffer and flush it, so a failed final write is
/// reported instead of lost when the buffer drops.
fn write_pretty<W: Write>(corpus: &Value, inner: W, path: &Path) -> Result<(), CorpusError> {
    let mut writer = BufWriter::new(inner);
    serde_json::to_writer_pretty(&mut writer, corpus).map_err(|e| CorpusError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    writer.flush().map_err(|e| CorpusError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
