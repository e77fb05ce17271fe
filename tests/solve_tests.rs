//! End-to-end solve tests
//!
//! Runs the bundled MILP back end on small instances and checks the decoded
//! rotation against the rules of the dinner.

mod fixtures;

use std::collections::HashSet;
use std::time::Duration;

use fixtures::*;

use dinner_planner::assembler::ProblemData;
use dinner_planner::config::ModelOptions;
use dinner_planner::decode::DecodedPlan;
use dinner_planner::error::PlanError;
use dinner_planner::planner::{Plan, plan};
use dinner_planner::solver::{GoodLpBackend, SolveOptions, SolveStatus};

fn solve(data: &ProblemData, options: &ModelOptions) -> Plan {
    plan(data, options, &GoodLpBackend, &SolveOptions::default()).expect("plan")
}

/// Seats, hosting and meetings of a decoded plan.
fn assert_valid_rotation(decoded: &DecodedPlan, teams: usize, courses: usize) {
    assert_rotation(decoded, teams, courses, true);
}

fn assert_rotation(decoded: &DecodedPlan, teams: usize, courses: usize, unique_meetings: bool) {
    let mut hosted = vec![0; teams];
    let mut met = HashSet::new();

    for groups in &decoded.courses {
        let mut seated = vec![0; teams];
        for roster in groups {
            let members: Vec<usize> = roster.members().collect();
            assert_eq!(members.len(), courses, "group size");
            let chef = roster.chef.expect("every group has a chef");
            hosted[chef] += 1;
            for (position, &a) in members.iter().enumerate() {
                seated[a] += 1;
                for &b in &members[position + 1..] {
                    let first_meeting = met.insert((a.min(b), a.max(b)));
                    assert!(first_meeting || !unique_meetings, "teams {} and {} meet twice", a, b);
                }
            }
        }
        assert!(seated.iter().all(|&count| count == 1), "every team seated once");
    }
    assert!(hosted.iter().all(|&count| count == 1), "every team hosts once");

    for itinerary in &decoded.itineraries {
        assert_eq!(itinerary.legs.len(), courses, "one leg per course");
        let mut position = itinerary.team;
        for leg in &itinerary.legs {
            assert_eq!(leg.from, position, "itinerary is chained");
            position = leg.to;
        }
    }
}

// ============================================================================
// Optimal rotations
// ============================================================================

#[test]
fn test_uniform_distances_give_two_legs_worst_case() {
    let data = four_teams();
    let result = solve(&data, &max_only());

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_valid_rotation(&result.decoded, 4, 2);
    assert_eq!(result.decoded.statistics.max_total_minutes, 20);
    assert!((result.objective.unwrap() - 20.0).abs() < 1e-6);
}

#[test]
fn test_default_objective() {
    let data = uniform_data(roster(4, 2), 2, 10, 5);
    let result = solve(&data, &ModelOptions::default());

    assert_valid_rotation(&result.decoded, 4, 2);
    assert_eq!(result.decoded.statistics.max_total_minutes, 25);
    for itinerary in &result.decoded.itineraries {
        assert!(itinerary.legs.iter().map(|leg| leg.minutes).sum::<u32>() >= 1);
    }
}

#[test]
fn test_preferences_pick_the_hosting_course() {
    let teams = vec![
        TestTeam::new("keen", 2).prefers(1, 5.0).build(),
        TestTeam::new("b", 2).build(),
        TestTeam::new("c", 2).build(),
        TestTeam::new("no-starter", 2).cannot_cook(0).build(),
    ];
    let data = uniform_data(teams, 2, 10, 0);
    let result = solve(&data, &ModelOptions::default());

    assert_valid_rotation(&result.decoded, 4, 2);
    let hosts: HashSet<usize> = result.decoded.courses[1]
        .iter()
        .filter_map(|roster| roster.chef)
        .collect();
    assert_eq!(hosts, HashSet::from([0, 3]));
}

#[test]
fn test_incompatible_cooks_never_share_a_table() {
    let data = four_teams();
    let options = max_only().with_incompatible_group(&[0, 1]);
    let result = solve(&data, &options);

    assert_valid_rotation(&result.decoded, 4, 2);
    for groups in &result.decoded.courses {
        for roster in groups {
            let members: HashSet<usize> = roster.members().collect();
            assert!(!(members.contains(&0) && members.contains(&1)));
        }
    }
}

#[test]
fn test_large_teams_are_separated() {
    let data = four_teams();
    let options = ModelOptions {
        large_teams: 2,
        ..max_only()
    };
    let result = solve(&data, &options);

    assert_valid_rotation(&result.decoded, 4, 2);
    let large = &result.decoded.large_teams;
    assert_eq!(large.len(), 2);
    for course in 0..2 {
        assert_ne!(
            result.decoded.group_of(large[0], course),
            result.decoded.group_of(large[1], course)
        );
    }
}

#[test]
fn test_shared_address_hosts_in_different_courses() {
    let teams = vec![
        TestTeam::new("a", 2).address("Flat Share 3").build(),
        TestTeam::new("b", 2).address("Flat Share 3").build(),
        TestTeam::new("c", 2).build(),
        TestTeam::new("d", 2).build(),
    ];
    let data = uniform_data(teams, 2, 10, 0);
    let result = solve(&data, &max_only());

    assert_valid_rotation(&result.decoded, 4, 2);
    let hosted = |team: usize| result.decoded.itineraries[team].hosted_course();
    assert_ne!(hosted(0), hosted(1));
}

#[test]
fn test_six_teams_three_courses_meeting_again() {
    let data = uniform_data(roster(6, 3), 3, 10, 0);
    let options = ModelOptions {
        unique_meetings: false,
        ..max_only()
    };
    let result = solve(&data, &options);

    assert_eq!(result.status, SolveStatus::Optimal);
    assert_rotation(&result.decoded, 6, 3, false);
    // Teams hosting the last course are guests twice before, so they
    // travel three legs.
    assert_eq!(result.decoded.statistics.max_total_minutes, 30);
    assert!((result.objective.unwrap() - 30.0).abs() < 1e-6);
}

// ============================================================================
// Terminal statuses
// ============================================================================

#[test]
fn test_infeasible_reports_relaxable_toggles() {
    let data = four_teams();
    let options = ModelOptions {
        min_travel_minutes: Some(1000),
        ..max_only()
    };
    match plan(&data, &options, &GoodLpBackend, &SolveOptions::default()) {
        Err(PlanError::Infeasible { relax }) => {
            assert!(relax.contains(&"lower the minimum travel time"));
            assert!(relax.contains(&"allow teams to meet again"));
        }
        other => panic!("expected infeasible, got {:?}", other.map(|plan| plan.status)),
    }
}

#[test]
#[ignore = "microlp needs a full branch-and-bound search to prove it"]
fn test_six_teams_three_courses_cannot_all_meet_once() {
    // Each team would need six distinct table mates out of five.
    let data = uniform_data(roster(6, 3), 3, 10, 0);
    match plan(&data, &max_only(), &GoodLpBackend, &SolveOptions::default()) {
        Err(PlanError::Infeasible { relax }) => {
            assert!(relax.contains(&"allow teams to meet again"));
        }
        other => panic!("expected infeasible, got {:?}", other.map(|plan| plan.status)),
    }
}

#[test]
fn test_zero_budget_times_out() {
    let data = four_teams();
    let solve_options = SolveOptions {
        time_budget: Duration::ZERO,
    };
    let result = plan(&data, &max_only(), &GoodLpBackend, &solve_options);
    assert!(matches!(result, Err(PlanError::TimedOut { budget }) if budget == Duration::ZERO));
}
