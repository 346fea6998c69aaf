//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use super::schema;
use crate::Result;
use crate::record::Medal;

/// SQLite-backed storage for the Olympics schema
pub struct SqliteStore {
    conn: Connection,
}

/// Column values for an athlete insert; the surrogate id comes back from
/// the store.
#[derive(Debug, Clone)]
pub struct NewAthlete<'a> {
    pub name: &'a str,
    pub sex: Option<char>,
    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,
    pub age: Option<u32>,
    pub country_code: &'a str,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.configure()?;
        store.ensure_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.configure()?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn configure(&self) -> Result<()> {
        // SQLite does not enforce foreign keys unless asked
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Create any missing tables and indexes
    pub fn ensure_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Drop and recreate every table, discarding all data
    pub fn recreate_schema(&self) -> Result<()> {
        for stmt in schema::DROP_TABLES {
            self.conn.execute(stmt, [])?;
        }
        self.ensure_schema()
    }

    // ========== Country Operations ==========

    /// Insert a country; a no-op if the code already exists
    pub fn insert_country(&self, code: &str, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO countries (code, name) VALUES (?1, ?2)",
            params![code, name],
        )?;
        Ok(())
    }

    /// Get a country's display name by code
    pub fn get_country_name(&self, code: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT name FROM countries WHERE code = ?1",
                [code],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Games Operations ==========

    /// Insert a games edition; a no-op if the year already exists
    pub fn insert_games(&self, year: u16, season: &str, host_city: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO games (year, season, host_city) VALUES (?1, ?2, ?3)",
            params![year, season, host_city],
        )?;
        Ok(())
    }

    // ========== Athlete Operations ==========

    /// Resolve an athlete by natural key (name, country_code), inserting
    /// if absent. Returns the surrogate id either way.
    pub fn resolve_athlete(&self, athlete: &NewAthlete) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM athletes WHERE name = ?1 AND country_code = ?2",
                params![athlete.name, athlete.country_code],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            r#"
            INSERT INTO athletes (name, sex, weight_kg, height_m, age, country_code)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                athlete.name,
                athlete.sex.map(String::from),
                athlete.weight_kg,
                athlete.height_m,
                athlete.age,
                athlete.country_code,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get an athlete's stored height by natural key
    pub fn athlete_height(&self, name: &str, country_code: &str) -> Result<Option<f64>> {
        let height: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT height_m FROM athletes WHERE name = ?1 AND country_code = ?2",
                params![name, country_code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(height.flatten())
    }

    // ========== Event Operations ==========

    /// Resolve an event by natural key (sport, discipline, games_year),
    /// inserting if absent. Returns the surrogate id either way.
    pub fn resolve_event(&self, sport: &str, discipline: &str, games_year: u16) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM events WHERE sport = ?1 AND discipline = ?2 AND games_year = ?3",
                params![sport, discipline, games_year],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO events (sport, discipline, games_year) VALUES (?1, ?2, ?3)",
            params![sport, discipline, games_year],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ========== Participation Operations ==========

    /// Insert a participation; re-importing the same (athlete, event) pair
    /// is a no-op, keeping the first recorded outcome.
    pub fn insert_participation(&self, athlete_id: i64, event_id: i64, medal: Medal) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO participations (athlete_id, event_id, medal)
            VALUES (?1, ?2, ?3)
            "#,
            params![athlete_id, event_id, medal.as_str()],
        )?;
        Ok(())
    }

    /// Get the stored outcome for a participation
    pub fn get_participation_medal(&self, athlete_id: i64, event_id: i64) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT medal FROM participations WHERE athlete_id = ?1 AND event_id = ?2",
                params![athlete_id, event_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    // ========== Statistics ==========

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count all countries
    pub fn count_countries(&self) -> Result<usize> {
        self.count("countries")
    }

    /// Count all games editions
    pub fn count_games(&self) -> Result<usize> {
        self.count("games")
    }

    /// Count all athletes
    pub fn count_athletes(&self) -> Result<usize> {
        self.count("athletes")
    }

    /// Count all events
    pub fn count_events(&self) -> Result<usize> {
        self.count("events")
    }

    /// Count all participations
    pub fn count_participations(&self) -> Result<usize> {
        self.count("participations")
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            countries: self.count_countries()?,
            games: self.count_games()?,
            athletes: self.count_athletes()?,
            events: self.count_events()?,
            participations: self.count_participations()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub countries: usize,
    pub games: usize,
    pub athletes: usize,
    pub events: usize,
    pub participations: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Countries: {}", self.countries)?;
        writeln!(f, "  Games: {}", self.games)?;
        writeln!(f, "  Athletes: {}", self.athletes)?;
        writeln!(f, "  Events: {}", self.events)?;
        writeln!(f, "  Participations: {}", self.participations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_athlete<'a>(name: &'a str, code: &'a str) -> NewAthlete<'a> {
        NewAthlete {
            name,
            sex: Some('M'),
            weight_kg: Some(75.0),
            height_m: Some(1.80),
            age: Some(24),
            country_code: code,
        }
    }

    fn store_with_brazil() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_country("BRA", "Brazil").unwrap();
        store.insert_games(2016, "Summer", "Rio de Janeiro").unwrap();
        store
    }

    #[test]
    fn test_country_insert_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.insert_country("BRA", "Brazil").unwrap();
        store.insert_country("BRA", "Brasil").unwrap();

        assert_eq!(store.count_countries().unwrap(), 1);
        assert_eq!(store.get_country_name("BRA").unwrap().unwrap(), "Brazil");
    }

    #[test]
    fn test_games_insert_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.insert_games(2016, "Summer", "Rio de Janeiro").unwrap();
        store.insert_games(2016, "Summer", "Rio de Janeiro").unwrap();

        assert_eq!(store.count_games().unwrap(), 1);
    }

    #[test]
    fn test_athlete_resolve_returns_same_id() {
        let store = store_with_brazil();

        let first = store.resolve_athlete(&sample_athlete("Rebeca Andrade", "BRA")).unwrap();
        let second = store.resolve_athlete(&sample_athlete("Rebeca Andrade", "BRA")).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_athletes().unwrap(), 1);
    }

    #[test]
    fn test_athlete_requires_country() {
        let store = SqliteStore::open_in_memory().unwrap();

        // No countries inserted: foreign key must reject the insert
        assert!(store.resolve_athlete(&sample_athlete("Nobody", "XXX")).is_err());
    }

    #[test]
    fn test_event_resolve_returns_same_id() {
        let store = store_with_brazil();

        let first = store.resolve_event("Gymnastics", "Vault Women", 2016).unwrap();
        let second = store.resolve_event("Gymnastics", "Vault Women", 2016).unwrap();
        let other = store.resolve_event("Gymnastics", "Floor Women", 2016).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.count_events().unwrap(), 2);
    }

    #[test]
    fn test_participation_keeps_first_outcome() {
        let store = store_with_brazil();
        let athlete = store.resolve_athlete(&sample_athlete("Rebeca Andrade", "BRA")).unwrap();
        let event = store.resolve_event("Gymnastics", "Vault Women", 2016).unwrap();

        store.insert_participation(athlete, event, Medal::Silver).unwrap();
        store.insert_participation(athlete, event, Medal::Gold).unwrap();

        assert_eq!(store.count_participations().unwrap(), 1);
        assert_eq!(
            store.get_participation_medal(athlete, event).unwrap().unwrap(),
            "silver"
        );
    }

    #[test]
    fn test_recreate_schema_empties_store() {
        let store = store_with_brazil();
        store.resolve_athlete(&sample_athlete("Rebeca Andrade", "BRA")).unwrap();

        store.recreate_schema().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(
            stats,
            DbStats { countries: 0, games: 0, athletes: 0, events: 0, participations: 0 }
        );
    }
}
