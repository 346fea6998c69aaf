//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - countries(code, name)
//! - games(year, season, host_city)
//! - athletes(id, name, sex, weight_kg, height_m, age, country_code)
//! - events(id, sport, discipline, games_year)
//! - participations(athlete_id, event_id, medal)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, NewAthlete, SqliteStore};
