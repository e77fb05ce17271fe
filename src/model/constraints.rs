//! Constraint generators, one per family.
//!
//! Notation: `a(t,g,c)` assignment, `h(t,g,c)` chef (host), `x(c,i,j,t,g)`
//! arc, `L(t)` large-team flag, `M` max duration, `d(i,j,c)` leg minutes,
//! `r(i,j,c)` routed minutes (leg plus afterparty after the last course).

use crate::assembler::ProblemData;
use crate::config::ModelOptions;
use crate::model::linear::{Constraint, ConstraintFamily, LinearExpr, Sense};
use crate::model::vars::{DecisionVars, Dims, Slot};

pub(crate) struct Ctx<'a> {
    pub data: &'a ProblemData,
    pub options: &'a ModelOptions,
    pub vars: &'a DecisionVars,
    pub dims: Dims,
}

fn push(out: &mut Vec<Constraint>, family: ConstraintFamily, expr: LinearExpr, sense: Sense, rhs: f64) {
    out.push(Constraint::new(family, expr, sense, rhs));
}

/// `Σ_g a(t,g,c) = 1` for every team and course.
pub(crate) fn team_coverage(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for team in 0..ctx.dims.teams {
        for course in 0..ctx.dims.courses {
            let expr = (0..ctx.dims.groups)
                .map(|group| (ctx.vars.assign(Slot::new(team, group, course)), 1.0))
                .collect();
            push(out, ConstraintFamily::TeamCoverage, expr, Sense::Eq, 1.0);
        }
    }
}

/// `Σ_t a(t,g,c) = K` for every group and course.
pub(crate) fn group_size(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for group in 0..ctx.dims.groups {
        for course in 0..ctx.dims.courses {
            let expr = (0..ctx.dims.teams)
                .map(|team| (ctx.vars.assign(Slot::new(team, group, course)), 1.0))
                .collect();
            push(out, ConstraintFamily::GroupSize, expr, Sense::Eq, ctx.dims.courses as f64);
        }
    }
}

/// `a(t1,g1,c1) + a(t2,g1,c1) + a(t1,g2,c2) + a(t2,g2,c2) ≤ 3`
/// for `c1 < c2`, all `g1, g2`, `t1 < t2`.
pub(crate) fn unique_meeting(ctx: &Ctx, out: &mut Vec<Constraint>) {
    let Dims {
        teams,
        groups,
        courses,
    } = ctx.dims;
    for c1 in 0..courses {
        for c2 in c1 + 1..courses {
            for g1 in 0..groups {
                for g2 in 0..groups {
                    for t1 in 0..teams {
                        for t2 in t1 + 1..teams {
                            let expr = [
                                (ctx.vars.assign(Slot::new(t1, g1, c1)), 1.0),
                                (ctx.vars.assign(Slot::new(t2, g1, c1)), 1.0),
                                (ctx.vars.assign(Slot::new(t1, g2, c2)), 1.0),
                                (ctx.vars.assign(Slot::new(t2, g2, c2)), 1.0),
                            ]
                            .into_iter()
                            .collect();
                            push(out, ConstraintFamily::UniqueMeeting, expr, Sense::Le, 3.0);
                        }
                    }
                }
            }
        }
    }
}

/// `h(t,g,c) = 0` for all `g` when team `t` cannot cook course `c`.
pub(crate) fn chef_eligibility(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for (team, member) in ctx.data.teams.iter().enumerate() {
        for course in 0..ctx.dims.courses {
            if member.can_host(course) {
                continue;
            }
            for group in 0..ctx.dims.groups {
                let expr = [(ctx.vars.chef(Slot::new(team, group, course)), 1.0)]
                    .into_iter()
                    .collect();
                push(out, ConstraintFamily::ChefEligibility, expr, Sense::Eq, 0.0);
            }
        }
    }
}

/// `Σ_t h(t,g,c) = 1` for every group and course.
pub(crate) fn one_chef_per_group(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for group in 0..ctx.dims.groups {
        for course in 0..ctx.dims.courses {
            let expr = (0..ctx.dims.teams)
                .map(|team| (ctx.vars.chef(Slot::new(team, group, course)), 1.0))
                .collect();
            push(out, ConstraintFamily::OneChefPerGroup, expr, Sense::Eq, 1.0);
        }
    }
}

/// `Σ_{g,c} h(t,g,c) = 1` for every team.
pub(crate) fn one_hosting_course(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for team in 0..ctx.dims.teams {
        let expr = (0..ctx.dims.groups)
            .flat_map(|group| {
                (0..ctx.dims.courses).map(move |course| Slot::new(team, group, course))
            })
            .map(|slot| (ctx.vars.chef(slot), 1.0))
            .collect();
        push(out, ConstraintFamily::OneHostingCourse, expr, Sense::Eq, 1.0);
    }
}

/// `h(t,g,c) - a(t,g,c) ≤ 0`.
pub(crate) fn chef_assigned(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for slot in ctx.dims.slots() {
        let expr = [(ctx.vars.chef(slot), 1.0), (ctx.vars.assign(slot), -1.0)]
            .into_iter()
            .collect();
        push(out, ConstraintFamily::ChefAssigned, expr, Sense::Le, 0.0);
    }
}

/// `Σ_{i,j} x(c,i,j,t,g) - a(t,g,c) = 0`: one leg exactly when seated.
pub(crate) fn arc_assigned(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for slot in ctx.dims.slots() {
        let mut expr: LinearExpr = ctx.vars.arcs_of(slot).map(|&(_, var)| (var, 1.0)).collect();
        expr.add(ctx.vars.assign(slot), -1.0);
        push(out, ConstraintFamily::ArcAssigned, expr, Sense::Eq, 0.0);
    }
}

/// `x(c,i,j,t,g) - h(j,g,c) ≤ 0`: every leg ends at the group's chef.
pub(crate) fn arc_to_chef(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for &(key, var) in ctx.vars.arcs() {
        let chef = ctx.vars.chef(Slot::new(key.to, key.group, key.course));
        let expr = [(var, 1.0), (chef, -1.0)].into_iter().collect();
        push(out, ConstraintFamily::ArcToChef, expr, Sense::Le, 0.0);
    }
}

/// `Σ_{g,j} x(c,i,j,t,g) - Σ_{g,r} x(c-1,r,i,t,g) = 0` for `c ≥ 1`, every
/// team `t` and location `i`: a team leaves course `c` from where it
/// arrived in course `c-1`.
pub(crate) fn handoff(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for course in 1..ctx.dims.courses {
        for team in 0..ctx.dims.teams {
            for location in 0..ctx.dims.teams {
                let mut expr = LinearExpr::new();
                for &(key, var) in ctx.vars.team_arcs(team, course) {
                    if key.from == location {
                        expr.add(var, 1.0);
                    }
                }
                for &(key, var) in ctx.vars.team_arcs(team, course - 1) {
                    if key.to == location {
                        expr.add(var, -1.0);
                    }
                }
                if !expr.is_empty() {
                    push(out, ConstraintFamily::Handoff, expr, Sense::Eq, 0.0);
                }
            }
        }
    }
}

/// `Σ r(i,j,c) · x(c,i,j,t,g) - M ≤ 0` for every team.
pub(crate) fn max_duration(ctx: &Ctx, out: &mut Vec<Constraint>) {
    let Some(max) = ctx.vars.max_duration() else {
        return;
    };
    for team in 0..ctx.dims.teams {
        let mut expr = routed_minutes(ctx, team);
        expr.add(max, -1.0);
        push(out, ConstraintFamily::MaxDuration, expr, Sense::Le, 0.0);
    }
}

/// `Σ d(i,j,c) · x(c,i,j,t,g) ≥ min` for every team (afterparty excluded).
pub(crate) fn min_travel(ctx: &Ctx, out: &mut Vec<Constraint>) {
    let Some(minutes) = ctx.options.min_travel_minutes.filter(|&minutes| minutes > 0) else {
        return;
    };
    for team in 0..ctx.dims.teams {
        let expr = (0..ctx.dims.courses)
            .flat_map(|course| ctx.vars.team_arcs(team, course))
            .map(|&(key, var)| (var, ctx.data.travel.leg(key.from, key.to, key.course) as f64))
            .collect();
        push(out, ConstraintFamily::MinTravel, expr, Sense::Ge, minutes as f64);
    }
}

/// `a(u,g,c) + h(v,g,c) ≤ 1` for every configured pair `(u, v)`: `u` never
/// eats at a table cooked by `v`.
pub(crate) fn incompatible_cook(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for &(guest, chef) in &ctx.options.cook_incompatible {
        if guest == chef {
            continue;
        }
        for course in 0..ctx.dims.courses {
            for group in 0..ctx.dims.groups {
                let expr = [
                    (ctx.vars.assign(Slot::new(guest, group, course)), 1.0),
                    (ctx.vars.chef(Slot::new(chef, group, course)), 1.0),
                ]
                .into_iter()
                .collect();
                push(out, ConstraintFamily::IncompatibleCook, expr, Sense::Le, 1.0);
            }
        }
    }
}

/// `Σ_t L(t) = large_teams` and, for `t1 < t2`,
/// `a(t1,g,c) + a(t2,g,c) + L(t1) + L(t2) ≤ 3`.
pub(crate) fn large_teams(ctx: &Ctx, out: &mut Vec<Constraint>) {
    if ctx.options.large_teams == 0 {
        return;
    }
    let flags: Vec<_> = (0..ctx.dims.teams).filter_map(|team| ctx.vars.large(team)).collect();
    let count = flags.iter().map(|&var| (var, 1.0)).collect();
    push(
        out,
        ConstraintFamily::LargeTeamCount,
        count,
        Sense::Eq,
        ctx.options.large_teams as f64,
    );

    for course in 0..ctx.dims.courses {
        for group in 0..ctx.dims.groups {
            for t1 in 0..ctx.dims.teams {
                for t2 in t1 + 1..ctx.dims.teams {
                    let expr = [
                        (ctx.vars.assign(Slot::new(t1, group, course)), 1.0),
                        (ctx.vars.assign(Slot::new(t2, group, course)), 1.0),
                        (flags[t1], 1.0),
                        (flags[t2], 1.0),
                    ]
                    .into_iter()
                    .collect();
                    push(out, ConstraintFamily::LargeTeamSeparation, expr, Sense::Le, 3.0);
                }
            }
        }
    }
}

/// `Σ_{t∈S, g} h(t,g,c) ≤ max(1, ⌈|S| / K⌉)` for every address shared by
/// the team set `S` and every course.
pub(crate) fn shared_address(ctx: &Ctx, out: &mut Vec<Constraint>) {
    for members in &ctx.data.shared_addresses {
        let cap = members.len().div_ceil(ctx.dims.courses).max(1);
        for course in 0..ctx.dims.courses {
            let expr = members
                .iter()
                .flat_map(|&team| {
                    (0..ctx.dims.groups).map(move |group| Slot::new(team, group, course))
                })
                .map(|slot| (ctx.vars.chef(slot), 1.0))
                .collect();
            push(out, ConstraintFamily::SharedAddress, expr, Sense::Le, cap as f64);
        }
    }
}

/// `Σ r(i,j,c) · x(c,i,j,t,g)` over every arc of `team`.
pub(crate) fn routed_minutes(ctx: &Ctx, team: usize) -> LinearExpr {
    (0..ctx.dims.courses)
        .flat_map(|course| ctx.vars.team_arcs(team, course))
        .map(|&(key, var)| (var, ctx.data.travel.routed(key.from, key.to, key.course) as f64))
        .collect()
}
