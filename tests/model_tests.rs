//! Model construction tests
//!
//! Preconditions, constraint families, arc domain and objective terms.

mod fixtures;

use fixtures::*;

use dinner_planner::assembler::ProblemData;
use dinner_planner::config::ModelOptions;
use dinner_planner::error::{DistanceError, PlanError};
use dinner_planner::matrix::DistanceMatrix;
use dinner_planner::model::{ArcKey, ConstraintFamily, Sense, Slot, build_model};

fn count(model: &dinner_planner::model::DinnerModel, family: ConstraintFamily) -> usize {
    model.family_counts().get(&family).copied().unwrap_or(0)
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_team_count_must_divide_by_courses() {
    let result = ProblemData::new(roster(5, 2), DistanceMatrix::uniform(5, 2, 10, 0));
    assert!(matches!(
        result,
        Err(PlanError::TeamCountNotDivisible {
            teams: 5,
            courses: 2
        })
    ));
}

#[test]
fn test_missing_leg_fails_before_any_constraint() {
    let mut matrix = DistanceMatrix::uniform(4, 2, 10, 0);
    matrix.clear(0, 1, 1);

    let result = ProblemData::new(roster(4, 2), matrix);
    assert!(matches!(
        result,
        Err(PlanError::Distance(DistanceError::MissingLeg {
            from: 0,
            to: 1,
            course: 1
        }))
    ));
}

#[test]
fn test_unknown_incompatible_team() {
    let data = four_teams();
    let options = ModelOptions::default().with_incompatible_group(&[1, 7]);
    assert!(matches!(
        build_model(&data, &options),
        Err(PlanError::UnknownTeam { index: 7, teams: 4 })
    ));
}

#[test]
fn test_too_many_large_teams() {
    let data = four_teams();
    let options = ModelOptions {
        large_teams: 5,
        ..ModelOptions::default()
    };
    assert!(matches!(
        build_model(&data, &options),
        Err(PlanError::TooManyLargeTeams {
            requested: 5,
            teams: 4
        })
    ));
}

// ============================================================================
// Constraint families
// ============================================================================

#[test]
fn test_six_teams_three_courses_structure() {
    let data = uniform_data(roster(6, 3), 3, 10, 0);
    let model = build_model(&data, &max_only()).unwrap();

    assert_eq!(model.dims().groups, 2);
    assert_eq!(count(&model, ConstraintFamily::TeamCoverage), 18);
    assert_eq!(count(&model, ConstraintFamily::GroupSize), 6);
    assert_eq!(count(&model, ConstraintFamily::OneChefPerGroup), 6);
    assert_eq!(count(&model, ConstraintFamily::OneHostingCourse), 6);
    assert_eq!(count(&model, ConstraintFamily::ChefAssigned), 36);
    assert_eq!(count(&model, ConstraintFamily::ArcAssigned), 36);
    assert_eq!(count(&model, ConstraintFamily::MaxDuration), 6);
    assert_eq!(count(&model, ConstraintFamily::MinTravel), 6);
    // 3 course pairs, 2x2 group pairs, 15 team pairs.
    assert_eq!(count(&model, ConstraintFamily::UniqueMeeting), 180);
    // Course 0: one origin, six destinations; later courses: 30 ordered pairs.
    assert_eq!(model.vars().arcs().len(), 12 * 6 + 2 * 12 * 30);
    assert_eq!(count(&model, ConstraintFamily::ArcToChef), model.vars().arcs().len());
    assert_eq!(count(&model, ConstraintFamily::Handoff), 2 * 6 * 6);
    assert_eq!(count(&model, ConstraintFamily::ChefEligibility), 0);

    for constraint in model.milp().constraints() {
        if constraint.family == ConstraintFamily::GroupSize {
            assert_eq!(constraint.sense, Sense::Eq);
            assert_eq!(constraint.rhs, 3.0);
            assert_eq!(constraint.expr.terms().len(), 6);
        }
    }
}

#[test]
fn test_optional_families_can_be_switched_off() {
    let data = four_teams();
    let options = ModelOptions {
        unique_meetings: false,
        include_max_duration: false,
        min_travel_minutes: None,
        ..ModelOptions::default()
    };
    let model = build_model(&data, &options).unwrap();

    assert_eq!(count(&model, ConstraintFamily::UniqueMeeting), 0);
    assert_eq!(count(&model, ConstraintFamily::MaxDuration), 0);
    assert_eq!(count(&model, ConstraintFamily::MinTravel), 0);
    assert_eq!(count(&model, ConstraintFamily::LargeTeamCount), 0);
    assert!(model.vars().max_duration().is_none());
    assert!(model.vars().large(0).is_none());
}

#[test]
fn test_incompatible_group_covers_both_directions() {
    let data = four_teams();
    let options = ModelOptions::default().with_incompatible_group(&[0, 1]);
    let model = build_model(&data, &options).unwrap();

    // Two ordered pairs, two courses, two groups.
    assert_eq!(count(&model, ConstraintFamily::IncompatibleCook), 8);
}

#[test]
fn test_large_team_constraints() {
    let data = four_teams();
    let options = ModelOptions {
        large_teams: 2,
        ..ModelOptions::default()
    };
    let model = build_model(&data, &options).unwrap();

    assert_eq!(count(&model, ConstraintFamily::LargeTeamCount), 1);
    assert_eq!(count(&model, ConstraintFamily::LargeTeamSeparation), 2 * 2 * 6);
    assert!(model.vars().large(3).is_some());
}

#[test]
fn test_shared_address_caps_hosts_per_course() {
    let teams = vec![
        TestTeam::new("a", 2).address("Same Street 5").build(),
        TestTeam::new("b", 2).address("Same Street 5").build(),
        TestTeam::new("c", 2).build(),
        TestTeam::new("d", 2).build(),
    ];
    let data = uniform_data(teams, 2, 10, 0);
    assert_eq!(data.shared_addresses, vec![vec![0, 1]]);

    let model = build_model(&data, &ModelOptions::default()).unwrap();
    let shared: Vec<_> = model
        .milp()
        .constraints()
        .iter()
        .filter(|constraint| constraint.family == ConstraintFamily::SharedAddress)
        .collect();
    assert_eq!(shared.len(), 2);
    for constraint in shared {
        assert_eq!(constraint.sense, Sense::Le);
        assert_eq!(constraint.rhs, 1.0);
        assert_eq!(constraint.expr.terms().len(), 4);
    }
}

#[test]
fn test_forbidden_course_fixes_chef_to_zero() {
    let mut teams = roster(4, 2);
    teams[2] = TestTeam::new("picky", 2).cannot_cook(1).build();
    let data = uniform_data(teams, 2, 10, 0);
    let model = build_model(&data, &ModelOptions::default()).unwrap();

    assert_eq!(count(&model, ConstraintFamily::ChefEligibility), 2);
    let chef = model.vars().chef(Slot::new(2, 1, 1));
    assert!(model.milp().constraints().iter().any(|constraint| {
        constraint.family == ConstraintFamily::ChefEligibility
            && constraint.expr.terms() == [(chef, 1.0)]
            && constraint.rhs == 0.0
    }));
}

// ============================================================================
// Arc domain
// ============================================================================

#[test]
fn test_first_course_leaves_from_home() {
    let data = four_teams();
    let model = build_model(&data, &ModelOptions::default()).unwrap();
    let vars = model.vars();

    let from_home = ArcKey {
        course: 0,
        from: 0,
        to: 2,
        team: 0,
        group: 1,
    };
    let from_elsewhere = ArcKey { from: 1, ..from_home };
    assert!(vars.arc(from_home).is_some());
    assert!(vars.arc(from_elsewhere).is_none());
}

#[test]
fn test_no_stay_in_place_after_first_course() {
    let data = four_teams();
    let model = build_model(&data, &ModelOptions::default()).unwrap();
    let stay = ArcKey {
        course: 1,
        from: 2,
        to: 2,
        team: 0,
        group: 0,
    };
    assert!(model.vars().arc(stay).is_none());
}

#[test]
fn test_short_hops_follow_same_place_policy() {
    let mut matrix = DistanceMatrix::uniform(4, 2, 10, 0);
    matrix.set_symmetric(0, 1, 1, 1);
    let data = ProblemData::new(roster(4, 2), matrix).unwrap();
    let hop = ArcKey {
        course: 1,
        from: 0,
        to: 1,
        team: 2,
        group: 0,
    };

    let strict = build_model(&data, &ModelOptions::default()).unwrap();
    assert!(strict.vars().arc(hop).is_none());

    let relaxed = ModelOptions {
        same_place_threshold: None,
        ..ModelOptions::default()
    };
    let relaxed = build_model(&data, &relaxed).unwrap();
    assert!(relaxed.vars().arc(hop).is_some());
}

// ============================================================================
// Objective
// ============================================================================

#[test]
fn test_preference_toggle_keeps_constraints() {
    let teams = vec![
        TestTeam::new("a", 2).prefers(0, 2.0).build(),
        TestTeam::new("b", 2).prefers(1, -4.0).build(),
        TestTeam::new("c", 2).cannot_cook(0).build(),
        TestTeam::new("d", 2).build(),
    ];
    let data = uniform_data(teams, 2, 10, 0);

    let with = build_model(&data, &ModelOptions::default()).unwrap();
    let without = build_model(
        &data,
        &ModelOptions {
            use_preferences: false,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    assert_eq!(with.milp().constraints(), without.milp().constraints());
    assert_ne!(with.milp().objective(), without.milp().objective());

    // Normalised by the largest magnitude, 4.
    let chef = with.vars().chef(Slot::new(0, 1, 0));
    let weight = with
        .milp()
        .objective()
        .terms()
        .iter()
        .find(|(var, _)| *var == chef)
        .map(|&(_, weight)| weight);
    assert_eq!(weight, Some(-10.0));
}

#[test]
fn test_hand_made_rotation_is_feasible() {
    let data = four_teams();
    let model = build_model(&data, &max_only()).unwrap();
    let values = HandMade::new().values(&model);

    let violated: Vec<_> = model
        .milp()
        .violations(&values, 1e-6)
        .into_iter()
        .map(|constraint| constraint.family)
        .collect();
    assert!(violated.is_empty(), "violated: {:?}", violated);
    assert_eq!(model.milp().objective().eval(&values), 20.0);
}

#[test]
fn test_lp_export_names_variables() {
    let model = build_model(&four_teams(), &ModelOptions::default()).unwrap();
    let lp = model.milp().to_lp_format();

    assert!(lp.starts_with("\\"));
    assert!(lp.contains("Minimize"));
    assert!(lp.contains("Subject To"));
    assert!(lp.contains(" team_coverage_0:"));
    assert!(lp.contains("assign_t0_g0_c0"));
    assert!(lp.contains("arc_c1_i0_j3_t0_g1"));
    assert!(lp.contains(" max_duration >= 0"));
    assert!(lp.trim_end().ends_with("End"));
}
