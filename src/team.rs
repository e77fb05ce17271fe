//! Teams and roster loading.

use std::io::Read;

use serde::Serialize;

use crate::error::RosterError;

/// Preference scores at or below this value mark a course the team cannot cook.
pub const FORBIDDEN_PREFERENCE: f64 = -1000.0;

/// Columns preceding the per-course preference scores.
const FIXED_COLUMNS: usize = 4;

/// A participating team. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub diet: String,
    /// One score per course; positive means "likes to cook this course".
    pub preferences: Vec<f64>,
}

impl Team {
    /// Creates a team with neutral preferences for `courses` courses.
    pub fn new(name: impl Into<String>, address: impl Into<String>, courses: usize) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            contact: String::new(),
            diet: String::new(),
            preferences: vec![0.0; courses],
        }
    }

    pub fn preference(&self, course: usize) -> f64 {
        self.preferences.get(course).copied().unwrap_or(0.0)
    }

    /// Whether the team may host `course`.
    pub fn can_host(&self, course: usize) -> bool {
        self.preference(course) > FORBIDDEN_PREFERENCE
    }
}

/// Reads a roster in `name,address,contact,diet[,pref1..prefK]` format.
///
/// The first row is a header. With `with_preferences` the header must have
/// exactly `4 + courses` columns; without, both the short and the long form
/// are accepted and all preferences are neutral.
pub fn load_roster<R: Read>(
    reader: R,
    courses: usize,
    with_preferences: bool,
) -> Result<Vec<Team>, RosterError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let found = csv.headers()?.len();
    let long_form = FIXED_COLUMNS + courses;
    let header_ok = if with_preferences {
        found == long_form
    } else {
        found == FIXED_COLUMNS || found == long_form
    };
    if !header_ok {
        let expected = if with_preferences {
            long_form.to_string()
        } else {
            format!("{} or {}", FIXED_COLUMNS, long_form)
        };
        return Err(RosterError::MalformedHeader { found, expected });
    }

    let mut teams = Vec::new();
    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let row = index + 2;
        let required = if with_preferences { long_form } else { FIXED_COLUMNS };
        if record.len() < required {
            return Err(RosterError::ShortRow {
                row,
                expected: required,
                found: record.len(),
            });
        }

        let preferences = if with_preferences {
            (0..courses)
                .map(|course| {
                    let column = FIXED_COLUMNS + course;
                    let value = &record[column];
                    value.parse::<f64>().map_err(|_| RosterError::BadPreference {
                        row,
                        column: column + 1,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![0.0; courses]
        };

        teams.push(Team {
            name: record[0].to_string(),
            address: record[1].to_string(),
            contact: record[2].to_string(),
            diet: record[3].to_string(),
            preferences,
        });
    }

    Ok(teams)
}
