//! Test fixtures for dinner-planner.
//!
//! Provides:
//! - Real Hamburg addresses (from OpenStreetMap)
//! - Builders for teams, rosters and distance tables
//! - A hand-made valid rotation for four teams and two courses

#![allow(dead_code)]

pub mod hamburg_locations;

pub use hamburg_locations::*;

use dinner_planner::assembler::ProblemData;
use dinner_planner::config::ModelOptions;
use dinner_planner::matrix::DistanceMatrix;
use dinner_planner::model::{ArcKey, DinnerModel, Slot};
use dinner_planner::solver::{Solution, SolveStatus};
use dinner_planner::team::{FORBIDDEN_PREFERENCE, Team};

// ============================================================================
// Teams
// ============================================================================

/// Builder for test teams with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestTeam {
    name: String,
    address: String,
    contact: String,
    diet: String,
    preferences: Vec<f64>,
}

impl TestTeam {
    pub fn new(name: &str, courses: usize) -> Self {
        Self {
            name: name.to_string(),
            address: format!("{} Street 1", name),
            contact: String::new(),
            diet: String::new(),
            preferences: vec![0.0; courses],
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn contact(mut self, contact: &str) -> Self {
        self.contact = contact.to_string();
        self
    }

    pub fn diet(mut self, diet: &str) -> Self {
        self.diet = diet.to_string();
        self
    }

    pub fn prefers(mut self, course: usize, score: f64) -> Self {
        self.preferences[course] = score;
        self
    }

    pub fn cannot_cook(self, course: usize) -> Self {
        self.prefers(course, FORBIDDEN_PREFERENCE)
    }

    pub fn build(self) -> Team {
        Team {
            name: self.name,
            address: self.address,
            contact: self.contact,
            diet: self.diet,
            preferences: self.preferences,
        }
    }
}

/// `teams` teams with distinct addresses and neutral preferences.
pub fn roster(teams: usize, courses: usize) -> Vec<Team> {
    (0..teams)
        .map(|team| TestTeam::new(&format!("team{}", team), courses).build())
        .collect()
}

// ============================================================================
// Problem data
// ============================================================================

/// Every leg between distinct teams takes `minutes`.
pub fn uniform_data(teams: Vec<Team>, courses: usize, minutes: u32, afterparty: u32) -> ProblemData {
    let matrix = DistanceMatrix::uniform(teams.len(), courses, minutes, afterparty);
    ProblemData::new(teams, matrix).expect("valid problem data")
}

/// Four teams, two courses, 10 minutes between any two homes, no afterparty.
pub fn four_teams() -> ProblemData {
    uniform_data(roster(4, 2), 2, 10, 0)
}

/// Options that keep only the hard rotation rules and the worst-case term.
pub fn max_only() -> ModelOptions {
    ModelOptions {
        include_average_duration: false,
        use_preferences: false,
        ..ModelOptions::default()
    }
}

// ============================================================================
// Hand-made rotation
// ============================================================================

/// A valid rotation for [`four_teams`]:
///
/// | course | group 0          | group 1          |
/// |--------|------------------|------------------|
/// | 0      | chef 0, guest 1  | chef 2, guest 3  |
/// | 1      | chef 1, guest 2  | chef 3, guest 0  |
pub struct HandMade {
    /// `(team, group, course)` seats.
    pub seats: Vec<(usize, usize, usize)>,
    /// `(team, group, course)` chefs.
    pub chefs: Vec<(usize, usize, usize)>,
    pub arcs: Vec<ArcKey>,
}

impl HandMade {
    pub fn new() -> Self {
        let seats = vec![
            (0, 0, 0),
            (1, 0, 0),
            (2, 1, 0),
            (3, 1, 0),
            (1, 0, 1),
            (2, 0, 1),
            (3, 1, 1),
            (0, 1, 1),
        ];
        let chefs = vec![(0, 0, 0), (2, 1, 0), (1, 0, 1), (3, 1, 1)];
        let arc = |team, course, from, to, group| ArcKey {
            course,
            from,
            to,
            team,
            group,
        };
        let arcs = vec![
            arc(0, 0, 0, 0, 0),
            arc(0, 1, 0, 3, 1),
            arc(1, 0, 1, 0, 0),
            arc(1, 1, 0, 1, 0),
            arc(2, 0, 2, 2, 1),
            arc(2, 1, 2, 1, 0),
            arc(3, 0, 3, 2, 1),
            arc(3, 1, 2, 3, 1),
        ];
        Self { seats, chefs, arcs }
    }

    /// Values for every variable of `model`.
    pub fn values(&self, model: &DinnerModel) -> Vec<f64> {
        let vars = model.vars();
        let mut values = vec![0.0; model.milp().variables().len()];
        for &(team, group, course) in &self.seats {
            values[vars.assign(Slot::new(team, group, course)).index()] = 1.0;
        }
        for &(team, group, course) in &self.chefs {
            values[vars.chef(Slot::new(team, group, course)).index()] = 1.0;
        }
        for &key in &self.arcs {
            let var = vars.arc(key).expect("hand-made arc exists in the model");
            values[var.index()] = 1.0;
        }
        if let Some(max) = vars.max_duration() {
            values[max.index()] = 20.0;
        }
        values
    }

    pub fn solution(&self, model: &DinnerModel) -> Solution {
        let values = self.values(model);
        let objective = model.milp().objective().eval(&values);
        Solution::new(SolveStatus::Optimal, values, Some(objective))
    }
}
