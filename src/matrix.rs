//! Travel-time tables keyed by (origin team, destination team, course).

use crate::error::DistanceError;

/// Partially filled distance table, as collected from a provider.
///
/// Self distances are pre-set to zero. Every other entry must be filled
/// before the table can be [`resolve`](DistanceMatrix::resolve)d.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    teams: usize,
    courses: usize,
    legs: Vec<Option<u32>>,
    afterparty: Vec<Option<u32>>,
}

impl DistanceMatrix {
    pub fn new(teams: usize, courses: usize) -> Self {
        let mut legs = vec![None; teams * teams * courses];
        for course in 0..courses {
            for team in 0..teams {
                legs[(course * teams + team) * teams + team] = Some(0);
            }
        }
        Self {
            teams,
            courses,
            legs,
            afterparty: vec![None; teams],
        }
    }

    /// Fully populated table computed from closures.
    pub fn from_fn(
        teams: usize,
        courses: usize,
        mut leg: impl FnMut(usize, usize, usize) -> u32,
        mut afterparty: impl FnMut(usize) -> u32,
    ) -> Self {
        let mut matrix = Self::new(teams, courses);
        for course in 0..courses {
            for from in 0..teams {
                for to in 0..teams {
                    if from != to {
                        matrix.set(from, to, course, leg(from, to, course));
                    }
                }
            }
        }
        for team in 0..teams {
            matrix.set_afterparty(team, afterparty(team));
        }
        matrix
    }

    /// Every leg between distinct teams takes `minutes`.
    pub fn uniform(teams: usize, courses: usize, minutes: u32, afterparty: u32) -> Self {
        Self::from_fn(teams, courses, |_, _, _| minutes, |_| afterparty)
    }

    fn index(&self, from: usize, to: usize, course: usize) -> usize {
        (course * self.teams + from) * self.teams + to
    }

    pub fn teams(&self) -> usize {
        self.teams
    }

    pub fn courses(&self) -> usize {
        self.courses
    }

    pub fn set(&mut self, from: usize, to: usize, course: usize, minutes: u32) {
        let index = self.index(from, to, course);
        self.legs[index] = Some(minutes);
    }

    /// Sets both directions of a leg.
    pub fn set_symmetric(&mut self, a: usize, b: usize, course: usize, minutes: u32) {
        self.set(a, b, course, minutes);
        self.set(b, a, course, minutes);
    }

    /// Removes a leg, leaving a hole.
    pub fn clear(&mut self, from: usize, to: usize, course: usize) {
        let index = self.index(from, to, course);
        self.legs[index] = None;
    }

    pub fn set_afterparty(&mut self, team: usize, minutes: u32) {
        self.afterparty[team] = Some(minutes);
    }

    pub fn get(&self, from: usize, to: usize, course: usize) -> Option<u32> {
        self.legs[self.index(from, to, course)]
    }

    /// Checks completeness and freezes the table.
    pub fn resolve(self) -> Result<TravelTimes, DistanceError> {
        let mut legs = Vec::with_capacity(self.legs.len());
        for course in 0..self.courses {
            for from in 0..self.teams {
                for to in 0..self.teams {
                    let minutes = self
                        .get(from, to, course)
                        .ok_or(DistanceError::MissingLeg { from, to, course })?;
                    if from == to && minutes != 0 {
                        return Err(DistanceError::SelfDistance {
                            team: from,
                            course,
                            minutes,
                        });
                    }
                    legs.push(minutes);
                }
            }
        }

        let afterparty = self
            .afterparty
            .iter()
            .enumerate()
            .map(|(team, minutes)| minutes.ok_or(DistanceError::MissingAfterparty { team }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TravelTimes {
            teams: self.teams,
            courses: self.courses,
            legs,
            afterparty,
        })
    }
}

/// Complete travel-time table. Every lookup is infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimes {
    teams: usize,
    courses: usize,
    legs: Vec<u32>,
    afterparty: Vec<u32>,
}

impl TravelTimes {
    pub fn teams(&self) -> usize {
        self.teams
    }

    pub fn courses(&self) -> usize {
        self.courses
    }

    /// Minutes to travel from team `from` to team `to` for `course`.
    pub fn leg(&self, from: usize, to: usize, course: usize) -> u32 {
        self.legs[(course * self.teams + from) * self.teams + to]
    }

    /// Minutes from team `team` to the afterparty.
    pub fn afterparty(&self, team: usize) -> u32 {
        self.afterparty[team]
    }

    /// Cost of an arc as it counts towards a team's total: the leg itself,
    /// plus the trip to the afterparty after the last course.
    pub fn routed(&self, from: usize, to: usize, course: usize) -> u32 {
        let leg = self.leg(from, to, course);
        if course + 1 == self.courses {
            leg + self.afterparty(to)
        } else {
            leg
        }
    }
}
