//! Importer - the CSV to relational model ETL engine
//!
//! One pass over the source rows, strictly in order, on one connection:
//! resolve-or-insert country, games edition, athlete, and event, then
//! record the participation. Natural-key caches owned by the run keep the
//! query volume down; batched commits are durability checkpoints, not a
//! transactional boundary. Recovery from a mid-run crash is re-running
//! the import, which the idempotent inserts make safe.

use std::collections::{HashMap, HashSet};
use std::io;
use std::ops::RangeInclusive;
use std::time::Instant;

use crate::Result;
use crate::record::ParsedRow;
use crate::source::{RowError, RowSource};
use crate::storage::{NewAthlete, SqliteStore};
use crate::ui::ImportProgress;

/// Year window of the original dataset extract
pub const DEFAULT_YEAR_RANGE: RangeInclusive<u16> = 2006..=2016;

/// Rows per commit checkpoint
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Row errors beyond this many are counted but not logged
const LOGGED_ROW_ERRORS: u64 = 5;

/// Caller-supplied import parameters
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Inclusive filter on the source's year column
    pub year_range: RangeInclusive<u16>,
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            year_range: DEFAULT_YEAR_RANGE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Summary of one import run. Entity counts are distinct natural keys
/// seen by this run, not database totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total_rows: u64,
    pub rows_in_range: u64,
    pub countries: usize,
    pub games: usize,
    pub athletes: usize,
    pub events: usize,
    pub errors: u64,
}

/// Natural-key lookup tables scoped to a single run. Entries are added
/// only after the corresponding storage write succeeds, so a rejected row
/// never poisons later lookups.
#[derive(Debug, Default)]
struct EntityCaches {
    countries: HashSet<String>,
    games: HashSet<u16>,
    athletes: HashMap<(String, String), i64>,
    events: HashMap<(String, String, u16), i64>,
}

pub struct Importer {
    options: ImportOptions,
}

impl Importer {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Load every in-range row from `source` into `store`.
    ///
    /// Malformed rows and per-row storage rejections are counted and
    /// skipped; only storage-level failures at batch boundaries (or a
    /// broken reader) abort the run.
    pub fn run<R: io::Read>(
        &self,
        store: &mut SqliteStore,
        source: &mut RowSource<R>,
    ) -> Result<ImportReport> {
        let columns = source.columns().clone();
        let mut caches = EntityCaches::default();
        let mut report = ImportReport::default();
        let progress = ImportProgress::new();
        let started = Instant::now();

        let mut since_commit = 0usize;
        store.begin_transaction()?;

        for record in source.records() {
            report.total_rows += 1;
            let row_no = report.total_rows;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    note_error(&mut report, &RowError::new(row_no, e.to_string()));
                    continue;
                }
            };

            // Cheap probe first: out-of-range rows are filtered before the
            // rest of the row is even coerced
            let year = match columns.year_of(&record, row_no) {
                Ok(year) => year,
                Err(e) => {
                    note_error(&mut report, &e);
                    continue;
                }
            };
            if !self.options.year_range.contains(&year) {
                continue;
            }
            report.rows_in_range += 1;

            let row = match columns.parse(&record, row_no) {
                Ok(row) => row,
                Err(e) => {
                    note_error(&mut report, &e);
                    continue;
                }
            };

            // Constraint rejections (FK, CHECK) are row errors too
            if let Err(e) = load_row(store, &mut caches, &row) {
                note_error(&mut report, &RowError::new(row_no, e.to_string()));
                continue;
            }

            since_commit += 1;
            if since_commit >= self.options.batch_size {
                store.commit()?;
                store.begin_transaction()?;
                since_commit = 0;
                progress.checkpoint(report.rows_in_range, report.errors);
                tracing::debug!(
                    rows = report.rows_in_range,
                    errors = report.errors,
                    "batch committed"
                );
            }
        }

        // Flush the remainder below the last full batch
        store.commit()?;

        report.countries = caches.countries.len();
        report.games = caches.games.len();
        report.athletes = caches.athletes.len();
        report.events = caches.events.len();

        progress.finish_with_summary(started.elapsed(), report.rows_in_range, report.errors);
        Ok(report)
    }
}

/// Resolve-or-insert the row's entities in dependency order, then record
/// the participation.
fn load_row(store: &SqliteStore, caches: &mut EntityCaches, row: &ParsedRow) -> Result<()> {
    if !caches.countries.contains(&row.country_code) {
        store.insert_country(&row.country_code, &row.team)?;
        caches.countries.insert(row.country_code.clone());
    }

    if !caches.games.contains(&row.year) {
        store.insert_games(row.year, row.season.as_str(), &row.host_city)?;
        caches.games.insert(row.year);
    }

    let athlete_key = row.athlete_key();
    let athlete_id = match caches.athletes.get(&athlete_key) {
        Some(id) => *id,
        None => {
            let id = store.resolve_athlete(&NewAthlete {
                name: &row.name,
                sex: row.sex,
                weight_kg: row.weight_kg,
                height_m: row.height_m,
                age: row.age,
                country_code: &row.country_code,
            })?;
            caches.athletes.insert(athlete_key, id);
            id
        }
    };

    let event_key = row.event_key();
    let event_id = match caches.events.get(&event_key) {
        Some(id) => *id,
        None => {
            let id = store.resolve_event(&row.sport, &row.discipline, row.year)?;
            caches.events.insert(event_key, id);
            id
        }
    };

    store.insert_participation(athlete_id, event_id, row.medal)
}

fn note_error(report: &mut ImportReport, err: &RowError) {
    report.errors += 1;
    if report.errors <= LOGGED_ROW_ERRORS {
        tracing::warn!("skipping {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Medal;

    const HEADER: &str = "ID,Name,Sex,Age,Height,Weight,Team,NOC,Games,Year,Season,City,Sport,Event,Medal";

    fn run_import(store: &mut SqliteStore, rows: &[&str]) -> ImportReport {
        let text = format!("{}\n{}\n", HEADER, rows.join("\n"));
        let mut source = RowSource::from_reader(text.as_bytes()).unwrap();
        let importer = Importer::new(ImportOptions {
            year_range: 2006..=2016,
            batch_size: 2,
        });
        importer.run(store, &mut source).unwrap()
    }

    #[test]
    fn test_athlete_deduplicated_by_name_and_country() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = run_import(
            &mut store,
            &[
                "1,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
                "1,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,200m Men,Gold",
            ],
        );

        assert_eq!(report.athletes, 1);
        assert_eq!(report.events, 2);
        assert_eq!(store.count_athletes().unwrap(), 1);
        assert_eq!(store.count_participations().unwrap(), 2);
    }

    #[test]
    fn test_event_deduplicated_by_sport_discipline_year() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = run_import(
            &mut store,
            &[
                "1,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
                "2,Yohan Blake,M,22,180,79,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Silver",
            ],
        );

        assert_eq!(report.events, 1);
        assert_eq!(store.count_events().unwrap(), 1);
        assert_eq!(store.count_participations().unwrap(), 2);
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let rows = [
            "1,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
            "2,Yohan Blake,M,22,180,79,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Silver",
        ];

        run_import(&mut store, &rows);
        let before = store.stats().unwrap();
        let report = run_import(&mut store, &rows);
        let after = store.stats().unwrap();

        assert_eq!(before, after);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_year_filter_excludes_row_entirely() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = run_import(
            &mut store,
            &[
                "1,Carl Lewis,M,35,188,80,United States,USA,1996 Summer,1996,Summer,Atlanta,Athletics,Long Jump Men,Gold",
                "2,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
            ],
        );

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.rows_in_range, 1);
        assert_eq!(report.athletes, 1);
        assert_eq!(store.count_participations().unwrap(), 1);
        assert_eq!(store.count_games().unwrap(), 1);
    }

    #[test]
    fn test_malformed_row_counted_and_skipped() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let report = run_import(
            &mut store,
            &[
                "1,Broken Row,M,not-a-number,180,80,Chile,CHI,2012 Summer,2012,Summer,London,Boxing,Lightweight Men,none",
                "2,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
            ],
        );

        assert_eq!(report.errors, 1);
        assert_eq!(report.athletes, 1);
        assert_eq!(store.count_athletes().unwrap(), 1);
    }

    #[test]
    fn test_medal_normalized_into_storage() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        run_import(
            &mut store,
            &[
                "1,Usain Bolt,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,Gold",
                "2,Also Ran,M,24,NA,NA,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,NA",
            ],
        );

        let gold = store
            .resolve_athlete(&NewAthlete {
                name: "Usain Bolt",
                sex: None,
                weight_kg: None,
                height_m: None,
                age: None,
                country_code: "JAM",
            })
            .unwrap();
        let event = store.resolve_event("Athletics", "100m Men", 2012).unwrap();
        assert_eq!(
            store.get_participation_medal(gold, event).unwrap().unwrap(),
            "gold"
        );

        let also_ran = store
            .resolve_athlete(&NewAthlete {
                name: "Also Ran",
                sex: None,
                weight_kg: None,
                height_m: None,
                age: None,
                country_code: "JAM",
            })
            .unwrap();
        assert_eq!(
            store.get_participation_medal(also_ran, event).unwrap().unwrap(),
            "none"
        );
        assert_eq!(Medal::from_raw("NA"), Medal::None);
    }

    #[test]
    fn test_missing_column_aborts_before_any_insert() {
        let store = SqliteStore::open_in_memory().unwrap();

        // Header resolution fails before an importer can even be handed
        // the source, so nothing reaches storage
        let text = "ID,Name,Sex,Age\n1,Usain Bolt,M,25\n";
        assert!(RowSource::from_reader(text.as_bytes()).is_err());
        assert_eq!(store.count_athletes().unwrap(), 0);
        assert_eq!(store.count_countries().unwrap(), 0);
    }

    #[test]
    fn test_height_normalized_into_storage() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        run_import(
            &mut store,
            &[
                "1,Tall Cm,M,25,195,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,100m Men,none",
                "2,Tall M,M,25,1.95,94,Jamaica,JAM,2012 Summer,2012,Summer,London,Athletics,200m Men,none",
            ],
        );

        // Both spellings of the same height land as meters
        assert_eq!(store.athlete_height("Tall Cm", "JAM").unwrap(), Some(1.95));
        assert_eq!(store.athlete_height("Tall M", "JAM").unwrap(), Some(1.95));
    }
}
