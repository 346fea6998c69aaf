//! Domain values - the typed shape of one source row
//!
//! Everything the importer knows about a row lives here:
//! - `Medal`: normalized outcome of a participation
//! - `Season`: games season label
//! - `ParsedRow`: a fully-coerced source row
//! - `normalize_height`: the cm-vs-meters unit policy

use std::str::FromStr;

/// Outcome of a participation. Unrecognized or missing source values
/// collapse to `None` rather than failing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    None,
}

impl Medal {
    /// Normalize a raw outcome cell. Case-insensitive on the three medal
    /// names; everything else (NA, empty, garbage) is `None`.
    pub fn from_raw(raw: &str) -> Medal {
        match raw.trim().to_lowercase().as_str() {
            "gold" => Medal::Gold,
            "silver" => Medal::Silver,
            "bronze" => Medal::Bronze,
            _ => Medal::None,
        }
    }

    /// Get the storage form of the medal
    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
            Medal::None => "none",
        }
    }

    /// Whether this outcome puts the athlete on the podium
    pub fn is_podium(&self) -> bool {
        !matches!(self, Medal::None)
    }
}

/// Games season label. The schema only admits these two values, so an
/// unrecognized season is a row-level error rather than a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    /// Get the storage form of the season
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

impl FromStr for Season {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            _ => Err(crate::Error::InvalidValue(format!("Unknown season: {}", s))),
        }
    }
}

/// Normalize a raw height reading to meters.
///
/// Policy inherited from the source data, which mixes units: a value >= 3
/// cannot be meters for a human, so it is read as centimeters and divided
/// by 100 (rounded to 2 decimals); anything below 3 is taken as already in
/// meters. A genuine sub-3.0 centimeter reading would be misclassified;
/// the threshold stays as-is until the source's true units are confirmed.
pub fn normalize_height(raw: f64) -> f64 {
    if raw >= 3.0 {
        (raw / 100.0 * 100.0).round() / 100.0
    } else {
        raw
    }
}

/// One fully-typed source row, ready for loading.
///
/// Optional fields were empty or "NA" in the source; fields that were
/// present but uncoercible never make it into a `ParsedRow` (the row is
/// rejected with a `RowError` instead).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub name: String,
    pub sex: Option<char>,
    pub age: Option<u32>,
    /// Meters, after `normalize_height`
    pub height_m: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Country display name (the source's "team" column)
    pub team: String,
    /// Uppercased short country code
    pub country_code: String,
    pub year: u16,
    pub season: Season,
    pub host_city: String,
    pub sport: String,
    /// The source's "event" column: the discipline within the sport
    pub discipline: String,
    pub medal: Medal,
}

impl ParsedRow {
    /// Natural key used to deduplicate athletes within and across runs
    pub fn athlete_key(&self) -> (String, String) {
        (self.name.clone(), self.country_code.clone())
    }

    /// Natural key used to deduplicate events
    pub fn event_key(&self) -> (String, String, u16) {
        (self.sport.clone(), self.discipline.clone(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_from_raw() {
        assert_eq!(Medal::from_raw("Gold"), Medal::Gold);
        assert_eq!(Medal::from_raw("silver"), Medal::Silver);
        assert_eq!(Medal::from_raw(" Bronze "), Medal::Bronze);
        assert_eq!(Medal::from_raw("NA"), Medal::None);
        assert_eq!(Medal::from_raw(""), Medal::None);
        assert_eq!(Medal::from_raw("Participation Trophy"), Medal::None);
    }

    #[test]
    fn test_season_parse() {
        assert_eq!("Summer".parse::<Season>().unwrap(), Season::Summer);
        assert_eq!("winter".parse::<Season>().unwrap(), Season::Winter);
        assert!("Spring".parse::<Season>().is_err());
    }

    #[test]
    fn test_height_cm_converted() {
        assert_eq!(normalize_height(185.0), 1.85);
        assert_eq!(normalize_height(167.0), 1.67);
    }

    #[test]
    fn test_height_meters_unchanged() {
        assert_eq!(normalize_height(1.85), 1.85);
        assert_eq!(normalize_height(2.26), 2.26);
    }

    #[test]
    fn test_height_boundary() {
        // 3.0 is the cm threshold: read as 0.03m, not 3 meters
        assert_eq!(normalize_height(3.0), 0.03);
        assert_eq!(normalize_height(2.99), 2.99);
    }
}
