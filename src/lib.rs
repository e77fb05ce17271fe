//! dinner-planner core
//!
//! Builds and solves the assignment model of a rotating dinner: every team
//! hosts one course and visits other teams for the rest, travelling as
//! little as possible.

pub mod assembler;
pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod haversine;
pub mod matrix;
pub mod model;
pub mod motis;
pub mod nominatim;
pub mod osrm;
pub mod planner;
pub mod rate_limit;
pub mod report;
pub mod solver;
pub mod team;
pub mod traits;
