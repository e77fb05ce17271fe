//! Problem data assembly: validated teams plus a complete distance table.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::EventSchedule;
use crate::error::{DistanceError, PlanError, ProviderError};
use crate::matrix::{DistanceMatrix, TravelTimes};
use crate::team::Team;
use crate::traits::{GeoPoint, Geocoder, TravelTimeProvider};

/// Everything the model builder needs, already resolved.
#[derive(Debug, Clone)]
pub struct ProblemData {
    pub teams: Vec<Team>,
    pub travel: TravelTimes,
    /// Groups of team indices sharing one address (only groups of two or more).
    pub shared_addresses: Vec<Vec<usize>>,
}

impl ProblemData {
    /// Validates preconditions and freezes the distance table.
    pub fn new(teams: Vec<Team>, matrix: DistanceMatrix) -> Result<Self, PlanError> {
        check_roster(teams.len(), matrix.courses())?;
        if matrix.teams() != teams.len() {
            return Err(PlanError::LocationCount {
                teams: teams.len(),
                locations: matrix.teams(),
            });
        }
        let travel = matrix.resolve()?;
        let shared_addresses = shared_addresses(&teams);
        Ok(Self {
            teams,
            travel,
            shared_addresses,
        })
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn course_count(&self) -> usize {
        self.travel.courses()
    }

    pub fn group_count(&self) -> usize {
        self.teams.len() / self.course_count()
    }
}

/// Team count must be positive and divisible by the course count.
pub fn check_roster(teams: usize, courses: usize) -> Result<(), PlanError> {
    if courses == 0 {
        return Err(PlanError::NoCourses);
    }
    if teams == 0 {
        return Err(PlanError::EmptyRoster);
    }
    if teams % courses != 0 {
        return Err(PlanError::TeamCountNotDivisible { teams, courses });
    }
    Ok(())
}

/// Teams grouped by identical address, in order of first appearance.
pub fn shared_addresses(teams: &[Team]) -> Vec<Vec<usize>> {
    let mut by_address: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, team) in teams.iter().enumerate() {
        by_address.entry(team.address.as_str()).or_default().push(index);
    }

    let mut shared: Vec<Vec<usize>> = by_address
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(address, members)| {
            warn!(address, teams = members.len(), "several teams share one address");
            members
        })
        .collect();
    shared.sort_by_key(|members| members[0]);
    shared
}

/// Resolves every team address, in roster order.
pub fn geocode_roster<G: Geocoder>(geocoder: &G, teams: &[Team]) -> Result<Vec<GeoPoint>, ProviderError> {
    info!(teams = teams.len(), "geocoding addresses");
    teams.iter().map(|team| geocoder.locate(&team.address)).collect()
}

/// Collects travel times from a provider.
pub struct Assembler<'a, P> {
    provider: &'a P,
    schedule: &'a EventSchedule,
    symmetric: bool,
}

impl<'a, P> Assembler<'a, P>
where
    P: TravelTimeProvider + Sync,
{
    pub fn new(provider: &'a P, schedule: &'a EventSchedule) -> Self {
        Self {
            provider,
            schedule,
            symmetric: true,
        }
    }

    /// Query both directions of every pair instead of mirroring one.
    pub fn asymmetric(mut self) -> Self {
        self.symmetric = false;
        self
    }

    /// Builds the problem data. Any unresolved route aborts assembly.
    pub fn assemble(
        &self,
        teams: Vec<Team>,
        locations: &[GeoPoint],
        afterparty: Option<GeoPoint>,
    ) -> Result<ProblemData, PlanError> {
        let courses = self.schedule.course_count();
        check_roster(teams.len(), courses)?;
        if locations.len() != teams.len() {
            return Err(PlanError::LocationCount {
                teams: teams.len(),
                locations: locations.len(),
            });
        }

        let n = teams.len();
        let pairs: Vec<(usize, usize, usize)> = (0..courses)
            .flat_map(|course| {
                (0..n).flat_map(move |from| (0..n).map(move |to| (from, to, course)))
            })
            .filter(|&(from, to, _)| if self.symmetric { from < to } else { from != to })
            .collect();

        info!(
            provider = self.provider.name(),
            routes = pairs.len(),
            symmetric = self.symmetric,
            "resolving travel times"
        );

        let legs = pairs
            .par_iter()
            .map(|&(from, to, course)| {
                self.provider
                    .duration_between(locations[from], locations[to], self.schedule.course_time(course))
                    .map(|minutes| (from, to, course, minutes))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(DistanceError::from)?;

        let mut matrix = DistanceMatrix::new(n, courses);
        for (from, to, course, minutes) in legs {
            if self.symmetric {
                matrix.set_symmetric(from, to, course, minutes);
            } else {
                matrix.set(from, to, course, minutes);
            }
        }

        let afterparty_legs: Vec<u32> = match afterparty {
            Some(point) => locations
                .par_iter()
                .map(|&location| {
                    self.provider
                        .duration_to_afterparty(location, point, self.schedule.afterparty_time())
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(DistanceError::from)?,
            None => vec![0; n],
        };
        for (team, minutes) in afterparty_legs.into_iter().enumerate() {
            matrix.set_afterparty(team, minutes);
        }

        ProblemData::new(teams, matrix)
    }
}
