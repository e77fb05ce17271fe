//! Error types shared across the planner.

use std::time::Duration;

use thiserror::Error;

use crate::solver::SolveStatus;

/// Failure raised by a travel-time or geocoding backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no route found from {from} to {to}")]
    NoRoute { from: String, to: String },
    #[error("could not find address `{0}`")]
    AddressNotFound(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("cache i/o failed: {0}")]
    CacheIo(#[from] std::io::Error),
    #[error("cache file is corrupt: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

/// Distance data that cannot be used to build a model.
#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("missing travel time from team {from} to team {to} for course {course}")]
    MissingLeg {
        from: usize,
        to: usize,
        course: usize,
    },
    #[error("missing travel time from team {team} to the afterparty")]
    MissingAfterparty { team: usize },
    #[error("team {team} has non-zero self distance {minutes} in course {course}")]
    SelfDistance {
        team: usize,
        course: usize,
        minutes: u32,
    },
    #[error("distance provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Problems reading the team roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed header: found {found} columns, expected {expected}")]
    MalformedHeader { found: usize, expected: String },
    #[error("row {row}: column {column} is not a number: `{value}`")]
    BadPreference {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("row {row}: expected {expected} columns, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A solution that does not describe a consistent rotation.
///
/// These indicate a defect in model construction or in the solver adapter,
/// never bad user input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("solver status {0:?} carries no incumbent")]
    NoIncumbent(SolveStatus),
    #[error("course {course}, group {group} has {found} chefs")]
    ChefCount {
        course: usize,
        group: usize,
        found: usize,
    },
    #[error("team {team} has {found} active arcs in course {course}")]
    ArcCount {
        team: usize,
        course: usize,
        found: usize,
    },
    #[error("team {team} leaves from {found} in course {course}, expected {expected}")]
    BrokenChain {
        team: usize,
        course: usize,
        expected: usize,
        found: usize,
    },
    #[error("team {team} travels to {found} in course {course}, but the chef is {chef}")]
    WrongDestination {
        team: usize,
        course: usize,
        chef: usize,
        found: usize,
    },
}

/// Back-end failure of the MILP solver.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to start solver thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("solver thread terminated without a result")]
    Disconnected,
    #[error("model is unbounded")]
    Unbounded,
    #[error("solver failed: {0}")]
    Backend(String),
}

/// Top-level error of the planning pipeline.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("the number of teams {teams} must be divisible by the number of courses {courses}")]
    TeamCountNotDivisible { teams: usize, courses: usize },
    #[error("the roster is empty")]
    EmptyRoster,
    #[error("at least one course is required")]
    NoCourses,
    #[error("{locations} locations given for {teams} teams")]
    LocationCount { teams: usize, locations: usize },
    #[error("team index {index} is out of range for {teams} teams")]
    UnknownTeam { index: usize, teams: usize },
    #[error("{requested} large teams requested but only {teams} teams exist")]
    TooManyLargeTeams { requested: usize, teams: usize },
    #[error("roster: {0}")]
    Roster(#[from] RosterError),
    #[error("distance resolution failed: {0}")]
    Distance(#[from] DistanceError),
    #[error("no feasible assignment exists; try relaxing: {}", relax.join(", "))]
    Infeasible { relax: Vec<&'static str> },
    #[error("no solution found within {budget:?}; consider a larger time budget")]
    TimedOut { budget: Duration },
    #[error("solver: {0}")]
    Solver(#[from] SolverError),
    #[error("inconsistent solution: {0}")]
    Decode(#[from] DecodeError),
}
