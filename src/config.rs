//! Run configuration: event schedule and model toggles.

use chrono::NaiveDateTime;

/// Start times of every course and of the afterparty.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSchedule {
    course_times: Vec<NaiveDateTime>,
    afterparty_time: NaiveDateTime,
}

impl EventSchedule {
    /// Builds a schedule of `courses` courses.
    ///
    /// Missing course times fall back to the first given time, as does a
    /// missing afterparty time. Returns `None` when no time is given at all.
    pub fn new(
        courses: usize,
        times: &[NaiveDateTime],
        afterparty_time: Option<NaiveDateTime>,
    ) -> Option<Self> {
        let first = *times.first()?;
        let course_times = (0..courses)
            .map(|course| times.get(course).copied().unwrap_or(first))
            .collect();

        Some(Self {
            course_times,
            afterparty_time: afterparty_time.unwrap_or(first),
        })
    }

    /// Every course (and the afterparty) starts at `start`.
    pub fn uniform(courses: usize, start: NaiveDateTime) -> Self {
        Self {
            course_times: vec![start; courses],
            afterparty_time: start,
        }
    }

    pub fn course_count(&self) -> usize {
        self.course_times.len()
    }

    pub fn course_time(&self, course: usize) -> NaiveDateTime {
        self.course_times[course]
    }

    pub fn afterparty_time(&self) -> NaiveDateTime {
        self.afterparty_time
    }
}

/// Toggles and weights of the optimisation model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// No pair of teams may share a group twice.
    pub unique_meetings: bool,
    /// Reward hosting a preferred course in the objective.
    pub use_preferences: bool,
    /// Minimise the worst team's total travel time.
    pub include_max_duration: bool,
    /// Minimise the average total travel time.
    pub include_average_duration: bool,
    pub average_weight: f64,
    pub preference_weight: f64,
    /// Lower bound on every team's routed travel time (afterparty leg excluded).
    pub min_travel_minutes: Option<u32>,
    /// Legs between distinct hosts at or below this duration are forbidden.
    /// `None` lets teams "stay" at (nearly) the same place.
    pub same_place_threshold: Option<u32>,
    /// `(guest, chef)`: `guest` never eats at a table cooked by `chef`.
    pub cook_incompatible: Vec<(usize, usize)>,
    /// Number of teams to designate as large; large teams never meet.
    pub large_teams: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            unique_meetings: true,
            use_preferences: true,
            include_max_duration: true,
            include_average_duration: true,
            average_weight: 0.1,
            preference_weight: 20.0,
            min_travel_minutes: Some(1),
            same_place_threshold: Some(1),
            cook_incompatible: Vec::new(),
            large_teams: 0,
        }
    }
}

impl ModelOptions {
    /// Makes every pair of `teams` mutually cook-incompatible.
    pub fn with_incompatible_group(mut self, teams: &[usize]) -> Self {
        for (position, &a) in teams.iter().enumerate() {
            for &b in &teams[position + 1..] {
                if a != b {
                    self.cook_incompatible.push((a, b));
                    self.cook_incompatible.push((b, a));
                }
            }
        }
        self
    }

    /// Optional hard constraints currently active, phrased as the toggle
    /// that relaxes them.
    pub fn relaxable_constraints(&self) -> Vec<&'static str> {
        let mut relax = Vec::new();
        if self.unique_meetings {
            relax.push("allow teams to meet again");
        }
        if self.large_teams > 0 {
            relax.push("fewer large teams");
        }
        if self.same_place_threshold.is_some() {
            relax.push("allow staying at the same place");
        }
        if self.min_travel_minutes.is_some_and(|minutes| minutes > 0) {
            relax.push("lower the minimum travel time");
        }
        if !self.cook_incompatible.is_empty() {
            relax.push("drop cook-incompatible pairs");
        }
        relax
    }
}
