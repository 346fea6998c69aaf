//! Database schema definitions

/// SQL to create the countries table
pub const CREATE_COUNTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    code TEXT PRIMARY KEY CHECK(length(code) <= 3),
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the games table (one row per Olympic edition)
pub const CREATE_GAMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    year INTEGER PRIMARY KEY,
    season TEXT NOT NULL CHECK(season IN ('Summer', 'Winter')),
    host_city TEXT NOT NULL
)
"#;

/// SQL to create the athletes table
/// Surrogate id; (name, country_code) is the natural key
pub const CREATE_ATHLETES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS athletes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    sex TEXT CHECK(sex IN ('M', 'F')),
    weight_kg REAL CHECK(weight_kg > 0),
    height_m REAL CHECK(height_m > 0),
    age INTEGER CHECK(age > 0),
    country_code TEXT NOT NULL
        REFERENCES countries(code) ON DELETE RESTRICT ON UPDATE CASCADE,
    UNIQUE(name, country_code)
)
"#;

/// SQL to create the events table
/// Surrogate id; (sport, discipline, games_year) is the natural key
pub const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sport TEXT NOT NULL,
    discipline TEXT NOT NULL,
    games_year INTEGER NOT NULL
        REFERENCES games(year) ON DELETE RESTRICT ON UPDATE CASCADE,
    UNIQUE(sport, discipline, games_year)
)
"#;

/// SQL to create the participations table (athlete x event, with outcome)
pub const CREATE_PARTICIPATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS participations (
    athlete_id INTEGER NOT NULL
        REFERENCES athletes(id) ON DELETE CASCADE ON UPDATE CASCADE,
    event_id INTEGER NOT NULL
        REFERENCES events(id) ON DELETE CASCADE ON UPDATE CASCADE,
    medal TEXT NOT NULL DEFAULT 'none'
        CHECK(medal IN ('gold', 'silver', 'bronze', 'none')),
    PRIMARY KEY (athlete_id, event_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_athletes_country ON athletes(country_code)",
    "CREATE INDEX IF NOT EXISTS idx_events_year ON events(games_year)",
    "CREATE INDEX IF NOT EXISTS idx_participations_event ON participations(event_id)",
];

/// Drop statements, dependents first so foreign keys never dangle
pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS participations",
    "DROP TABLE IF EXISTS events",
    "DROP TABLE IF EXISTS athletes",
    "DROP TABLE IF EXISTS games",
    "DROP TABLE IF EXISTS countries",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_COUNTRIES_TABLE,
        CREATE_GAMES_TABLE,
        CREATE_ATHLETES_TABLE,
        CREATE_EVENTS_TABLE,
        CREATE_PARTICIPATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
