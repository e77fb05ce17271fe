//! Objective: worst travel time, average travel time, satisfied preferences.

use crate::model::constraints::{Ctx, routed_minutes};
use crate::model::linear::LinearExpr;
use crate::model::vars::Slot;
use crate::team::Team;

/// `[M] + w₁ · (1/N) Σ_t Σ r·x − w₂ · Σ h(t,g,c) · p(t,c) / P`
///
/// where `P` is the largest preference magnitude among hostable courses.
/// Each term is switched independently by [`ModelOptions`](crate::config::ModelOptions).
pub(crate) fn objective(ctx: &Ctx) -> LinearExpr {
    let mut objective = LinearExpr::new();

    if let Some(max) = ctx.vars.max_duration() {
        objective.add(max, 1.0);
    }

    if ctx.options.include_average_duration {
        let scale = ctx.options.average_weight / ctx.dims.teams as f64;
        for team in 0..ctx.dims.teams {
            for &(var, minutes) in routed_minutes(ctx, team).terms() {
                objective.add(var, scale * minutes);
            }
        }
    }

    if ctx.options.use_preferences {
        if let Some(magnitude) = preference_magnitude(&ctx.data.teams) {
            for (team, member) in ctx.data.teams.iter().enumerate() {
                for course in 0..ctx.dims.courses {
                    if !member.can_host(course) {
                        continue;
                    }
                    let weight =
                        -ctx.options.preference_weight * member.preference(course) / magnitude;
                    for group in 0..ctx.dims.groups {
                        objective.add(ctx.vars.chef(Slot::new(team, group, course)), weight);
                    }
                }
            }
        }
    }

    objective
}

/// Largest `|preference|` over hostable (team, course) entries, or `None`
/// when every such preference is zero.
pub fn preference_magnitude(teams: &[Team]) -> Option<f64> {
    let magnitude = teams
        .iter()
        .flat_map(|team| {
            (0..team.preferences.len())
                .filter(|&course| team.can_host(course))
                .map(|course| team.preference(course).abs())
        })
        .fold(0.0_f64, f64::max);
    (magnitude > 0.0).then_some(magnitude)
}
