//! Solution decoding: group rosters, team itineraries, statistics.
//!
//! Decoding is a pure function of the model, the problem data and the
//! solver's values. Every structural rule the model promises is re-checked
//! here, so a defect in the formulation or in the solver adapter surfaces as
//! a [`DecodeError`] instead of a silently wrong plan.

use serde::Serialize;

use crate::assembler::ProblemData;
use crate::error::DecodeError;
use crate::model::{ArcKey, DinnerModel, Slot};
use crate::solver::Solution;

/// Who sits at one table in one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRoster {
    pub chef: Option<usize>,
    pub guests: Vec<usize>,
}

impl GroupRoster {
    /// Chef first, then guests.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.chef.into_iter().chain(self.guests.iter().copied())
    }
}

/// One trip of a team, from the location of `from` to the table at `to`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub course: usize,
    pub group: usize,
    pub from: usize,
    pub to: usize,
    pub minutes: u32,
    /// The travelling team cooks this course.
    pub hosting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    pub team: usize,
    pub legs: Vec<Leg>,
    pub afterparty_minutes: u32,
}

impl Itinerary {
    pub fn total_minutes(&self) -> u32 {
        self.legs.iter().map(|leg| leg.minutes).sum::<u32>() + self.afterparty_minutes
    }

    /// Course this team hosts, if any.
    pub fn hosted_course(&self) -> Option<usize> {
        self.legs.iter().find(|leg| leg.hosting).map(|leg| leg.course)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub min_total_minutes: u32,
    pub max_total_minutes: u32,
    pub mean_total_minutes: f64,
    /// Mean per trip, counting the afterparty trip.
    pub mean_leg_minutes: f64,
}

impl Statistics {
    pub fn from_itineraries(itineraries: &[Itinerary], courses: usize) -> Self {
        let totals: Vec<u32> = itineraries.iter().map(Itinerary::total_minutes).collect();
        let mean_total = if totals.is_empty() {
            0.0
        } else {
            totals.iter().map(|&total| total as f64).sum::<f64>() / totals.len() as f64
        };
        Self {
            min_total_minutes: totals.iter().copied().min().unwrap_or(0),
            max_total_minutes: totals.iter().copied().max().unwrap_or(0),
            mean_total_minutes: mean_total,
            mean_leg_minutes: mean_total / (courses + 1) as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedPlan {
    /// `courses[course][group]`.
    pub courses: Vec<Vec<GroupRoster>>,
    pub itineraries: Vec<Itinerary>,
    pub large_teams: Vec<usize>,
    pub statistics: Statistics,
}

impl DecodedPlan {
    /// Group of `team` in `course`.
    pub fn group_of(&self, team: usize, course: usize) -> Option<usize> {
        self.courses
            .get(course)?
            .iter()
            .position(|roster| roster.members().any(|member| member == team))
    }
}

/// Decodes an incumbent into rosters and itineraries.
pub fn decode(
    model: &DinnerModel,
    data: &ProblemData,
    solution: &Solution,
) -> Result<DecodedPlan, DecodeError> {
    if !solution.status().has_incumbent() {
        return Err(DecodeError::NoIncumbent(solution.status()));
    }

    let courses = decode_rosters(model, solution)?;
    let itineraries = (0..model.dims().teams)
        .map(|team| decode_itinerary(model, data, solution, &courses, team))
        .collect::<Result<Vec<_>, _>>()?;

    let large_teams = (0..model.dims().teams)
        .filter(|&team| {
            model
                .vars()
                .large(team)
                .is_some_and(|var| solution.is_set(var))
        })
        .collect();

    let statistics = Statistics::from_itineraries(&itineraries, model.dims().courses);
    Ok(DecodedPlan {
        courses,
        itineraries,
        large_teams,
        statistics,
    })
}

fn decode_rosters(model: &DinnerModel, solution: &Solution) -> Result<Vec<Vec<GroupRoster>>, DecodeError> {
    let dims = model.dims();
    let vars = model.vars();
    (0..dims.courses)
        .map(|course| {
            (0..dims.groups)
                .map(|group| {
                    let chefs: Vec<usize> = (0..dims.teams)
                        .filter(|&team| solution.is_set(vars.chef(Slot::new(team, group, course))))
                        .collect();
                    let [chef] = chefs[..] else {
                        return Err(DecodeError::ChefCount {
                            course,
                            group,
                            found: chefs.len(),
                        });
                    };
                    let guests = (0..dims.teams)
                        .filter(|&team| {
                            team != chef
                                && solution.is_set(vars.assign(Slot::new(team, group, course)))
                        })
                        .collect();
                    Ok(GroupRoster {
                        chef: Some(chef),
                        guests,
                    })
                })
                .collect()
        })
        .collect()
}

fn decode_itinerary(
    model: &DinnerModel,
    data: &ProblemData,
    solution: &Solution,
    courses: &[Vec<GroupRoster>],
    team: usize,
) -> Result<Itinerary, DecodeError> {
    let mut position = team;
    let mut legs = Vec::with_capacity(courses.len());

    for (course, rosters) in courses.iter().enumerate() {
        let active: Vec<ArcKey> = model
            .vars()
            .team_arcs(team, course)
            .filter(|&&(_, var)| solution.is_set(var))
            .map(|&(key, _)| key)
            .collect();
        let [key] = active[..] else {
            return Err(DecodeError::ArcCount {
                team,
                course,
                found: active.len(),
            });
        };

        if key.from != position {
            return Err(DecodeError::BrokenChain {
                team,
                course,
                expected: position,
                found: key.from,
            });
        }
        let chef = rosters[key.group].chef.unwrap_or(key.to);
        if key.to != chef {
            return Err(DecodeError::WrongDestination {
                team,
                course,
                chef,
                found: key.to,
            });
        }

        legs.push(Leg {
            course,
            group: key.group,
            from: key.from,
            to: key.to,
            minutes: data.travel.leg(key.from, key.to, course),
            hosting: chef == team,
        });
        position = key.to;
    }

    Ok(Itinerary {
        team,
        legs,
        afterparty_minutes: data.travel.afterparty(position),
    })
}
