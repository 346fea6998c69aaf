//! CSV source - header resolution and typed row extraction
//!
//! Column lookup happens exactly once: `ColumnMap::resolve` turns the
//! header record into typed indices before the row loop, and every row
//! after that is read by position. Missing required columns abort the run
//! before any storage write.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::record::{Medal, ParsedRow, Season, normalize_height};
use crate::{Error, Result};

/// Columns the source must carry, matched case-insensitively after trim.
/// `games` (the combined games label) is required to be present but is not
/// consumed downstream; `noc` is the short country code.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "name", "sex", "age", "height", "weight", "team", "noc", "games", "year", "season", "city",
    "sport", "event", "medal",
];

/// A recoverable per-row failure: the row is skipped and counted, the run
/// continues. Never escapes the per-row processing boundary.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based data row number (header excluded)
    pub row: u64,
    pub message: String,
}

impl RowError {
    pub fn new(row: u64, message: impl Into<String>) -> Self {
        let mut message = message.into();
        // Bounded detail in logs; back off to a char boundary first
        if message.len() > 100 {
            let mut end = 100;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        Self { row, message }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// Resolved header positions, built once per source.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    name: usize,
    sex: usize,
    age: usize,
    height: usize,
    weight: usize,
    team: usize,
    noc: usize,
    year: usize,
    season: usize,
    city: usize,
    sport: usize,
    event: usize,
    medal: usize,
}

impl ColumnMap {
    /// Resolve the required columns against a header record. Header cells
    /// are trimmed and lowercased before matching. All missing columns are
    /// reported together in the error.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing.join(", ")));
        }

        // Unwraps are safe: every required column was just checked
        let idx = |wanted: &str| find(wanted).unwrap();
        Ok(Self {
            name: idx("name"),
            sex: idx("sex"),
            age: idx("age"),
            height: idx("height"),
            weight: idx("weight"),
            team: idx("team"),
            noc: idx("noc"),
            year: idx("year"),
            season: idx("season"),
            city: idx("city"),
            sport: idx("sport"),
            event: idx("event"),
            medal: idx("medal"),
        })
    }

    /// Extract only the year, for the range filter probe. Rows whose year
    /// cannot be read are row errors, not silently filtered.
    pub fn year_of(&self, record: &StringRecord, row: u64) -> std::result::Result<u16, RowError> {
        let raw = field(record, self.year);
        raw.parse::<u16>()
            .map_err(|_| RowError::new(row, format!("year: invalid integer '{}'", raw)))
    }

    /// Coerce a full record into a typed row.
    pub fn parse(
        &self,
        record: &StringRecord,
        row: u64,
    ) -> std::result::Result<ParsedRow, RowError> {
        let year = self.year_of(record, row)?;

        let name = field(record, self.name).to_string();
        if name.is_empty() {
            return Err(RowError::new(row, "name: empty"));
        }
        let country_code = field(record, self.noc).to_uppercase();
        if country_code.is_empty() {
            return Err(RowError::new(row, "noc: empty"));
        }

        let season: Season = field(record, self.season)
            .parse()
            .map_err(|e: Error| RowError::new(row, e.to_string()))?;

        let sex = field(record, self.sex)
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| matches!(c, 'M' | 'F'));

        let age = optional_number::<u32>(record, self.age, "age", row)?;
        let weight_kg = optional_number::<f64>(record, self.weight, "weight", row)?;
        let height_m =
            optional_number::<f64>(record, self.height, "height", row)?.map(normalize_height);

        Ok(ParsedRow {
            name,
            sex,
            age,
            height_m,
            weight_kg,
            team: field(record, self.team).to_string(),
            country_code,
            year,
            season,
            host_city: field(record, self.city).to_string(),
            sport: field(record, self.sport).to_string(),
            discipline: field(record, self.event).to_string(),
            medal: Medal::from_raw(field(record, self.medal)),
        })
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

/// Empty and "NA" cells are absent values; anything else must coerce.
fn optional_number<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    label: &str,
    row: u64,
) -> std::result::Result<Option<T>, RowError> {
    let raw = field(record, idx);
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| RowError::new(row, format!("{}: invalid number '{}'", label, raw)))
}

/// A CSV row source with its columns already resolved.
pub struct RowSource<R: io::Read> {
    reader: Reader<R>,
    columns: ColumnMap,
}

impl RowSource<File> {
    /// Open a CSV file and resolve its header.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = ReaderBuilder::new().from_path(path)?;
        Self::with_reader(reader)
    }
}

impl<R: io::Read> RowSource<R> {
    /// Wrap any reader (used by tests with in-memory CSV text).
    pub fn from_reader(inner: R) -> Result<Self> {
        Self::with_reader(ReaderBuilder::new().from_reader(inner))
    }

    fn with_reader(mut reader: Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let columns = ColumnMap::resolve(&headers)?;
        Ok(Self { reader, columns })
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Iterate raw records. Decoding failures from the csv reader surface
    /// per record so the importer can count them as row errors.
    pub fn records(&mut self) -> impl Iterator<Item = csv::Result<StringRecord>> + '_ {
        self.reader.records()
    }
}
