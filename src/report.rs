//! Presentation of a decoded plan: a human-readable report and a JSON export.

use std::fmt::Write;

use serde::Serialize;

use crate::decode::{DecodedPlan, GroupRoster, Itinerary};
use crate::team::Team;

/// Renders the plan for the organiser.
pub fn render_text(teams: &[Team], plan: &DecodedPlan) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = write_report(&mut out, teams, plan);
    out
}

fn write_report(out: &mut String, teams: &[Team], plan: &DecodedPlan) -> std::fmt::Result {
    let name = |team: usize| teams.get(team).map_or("?", |team| team.name.as_str());

    if !plan.large_teams.is_empty() {
        writeln!(out, "Large teams (never seated together):")?;
        for &team in &plan.large_teams {
            writeln!(out, "  - {}", name(team))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Groups")?;
    for (course, groups) in plan.courses.iter().enumerate() {
        writeln!(out, "Course {}", course + 1)?;
        for (group, roster) in groups.iter().enumerate() {
            let chef = roster.chef.map_or("nobody", name);
            let guests: Vec<&str> = roster.guests.iter().map(|&guest| name(guest)).collect();
            writeln!(
                out,
                "  group {}: {} cooks for {}",
                group + 1,
                chef,
                guests.join(", ")
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "Teams")?;
    for itinerary in &plan.itineraries {
        let Some(team) = teams.get(itinerary.team) else {
            continue;
        };
        writeln!(out, "{} ({} min in total)", team.name, itinerary.total_minutes())?;
        for leg in &itinerary.legs {
            write!(
                out,
                "  course {}: {} -> {}, {} min",
                leg.course + 1,
                name(leg.from),
                name(leg.to),
                leg.minutes
            )?;
            if leg.hosting {
                write!(out, ", hosting")?;
                let preference = team.preference(leg.course);
                if preference > 0.0 {
                    write!(out, " (following preference)")?;
                } else if preference < 0.0 {
                    write!(out, " (against preference)")?;
                }
            }
            writeln!(out)?;
        }
        writeln!(out, "  afterparty: {} min", itinerary.afterparty_minutes)?;
    }
    writeln!(out)?;

    let stats = &plan.statistics;
    writeln!(out, "Statistics")?;
    writeln!(out, "  longest total travel time: {} min", stats.max_total_minutes)?;
    writeln!(out, "  shortest total travel time: {} min", stats.min_total_minutes)?;
    writeln!(out, "  mean total travel time: {:.1} min", stats.mean_total_minutes)?;
    writeln!(out, "  mean time per trip: {:.1} min", stats.mean_leg_minutes)?;
    Ok(())
}

/// JSON export consumed by downstream tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanExport {
    pub teams: Vec<TeamExport>,
    pub courses: Vec<Vec<GroupRoster>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamExport {
    pub index: usize,
    pub name: String,
    pub contact: String,
    pub diet: String,
    pub address: String,
    pub tour: Vec<TourStop>,
    pub afterparty_duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStop {
    pub approx_duration_minutes: u32,
    pub group: usize,
    pub course: usize,
}

impl PlanExport {
    pub fn new(teams: &[Team], plan: &DecodedPlan) -> Self {
        Self {
            teams: plan
                .itineraries
                .iter()
                .filter_map(|itinerary| {
                    teams
                        .get(itinerary.team)
                        .map(|team| TeamExport::new(team, itinerary))
                })
                .collect(),
            courses: plan.courses.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl TeamExport {
    fn new(team: &Team, itinerary: &Itinerary) -> Self {
        Self {
            index: itinerary.team,
            name: team.name.clone(),
            contact: team.contact.clone(),
            diet: team.diet.clone(),
            address: team.address.clone(),
            tour: itinerary
                .legs
                .iter()
                .map(|leg| TourStop {
                    approx_duration_minutes: leg.minutes,
                    group: leg.group,
                    course: leg.course,
                })
                .collect(),
            afterparty_duration_minutes: itinerary.afterparty_minutes,
        }
    }
}
