//! Rotation model builder.
//!
//! Turns [`ProblemData`] and [`ModelOptions`] into a complete [`MilpModel`].
//! Preconditions are checked before the first variable is declared, so a
//! model is either whole or not built at all.

mod constraints;
pub mod linear;
mod objective;
pub mod vars;

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::assembler::{ProblemData, check_roster};
use crate::config::ModelOptions;
use crate::error::PlanError;

pub use linear::{Constraint, ConstraintFamily, LinearExpr, MilpModel, Sense, VarDef, VarId, VarKind};
pub use objective::preference_magnitude;
pub use vars::{ArcKey, DecisionVars, Dims, Slot};

use constraints::Ctx;

/// A built model together with its typed variable handles.
#[derive(Debug, Clone)]
pub struct DinnerModel {
    milp: MilpModel,
    vars: DecisionVars,
}

impl DinnerModel {
    pub fn milp(&self) -> &MilpModel {
        &self.milp
    }

    pub fn vars(&self) -> &DecisionVars {
        &self.vars
    }

    pub fn dims(&self) -> Dims {
        self.vars.dims()
    }

    /// Number of constraints generated per family.
    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts = BTreeMap::new();
        for constraint in self.milp.constraints() {
            *counts.entry(constraint.family).or_insert(0) += 1;
        }
        counts
    }
}

/// Builds the rotation model.
pub fn build_model(data: &ProblemData, options: &ModelOptions) -> Result<DinnerModel, PlanError> {
    validate(data, options)?;

    let mut milp = MilpModel::new();
    let vars = DecisionVars::declare(&mut milp, data, options);
    let ctx = Ctx {
        data,
        options,
        vars: &vars,
        dims: vars.dims(),
    };

    let mut out = Vec::new();
    constraints::team_coverage(&ctx, &mut out);
    constraints::group_size(&ctx, &mut out);
    if options.unique_meetings {
        constraints::unique_meeting(&ctx, &mut out);
    }
    constraints::chef_eligibility(&ctx, &mut out);
    constraints::one_chef_per_group(&ctx, &mut out);
    constraints::one_hosting_course(&ctx, &mut out);
    constraints::chef_assigned(&ctx, &mut out);
    constraints::arc_assigned(&ctx, &mut out);
    constraints::arc_to_chef(&ctx, &mut out);
    constraints::handoff(&ctx, &mut out);
    constraints::max_duration(&ctx, &mut out);
    constraints::min_travel(&ctx, &mut out);
    constraints::incompatible_cook(&ctx, &mut out);
    constraints::large_teams(&ctx, &mut out);
    constraints::shared_address(&ctx, &mut out);
    let objective = objective::objective(&ctx);

    for constraint in out {
        milp.add_constraint(constraint);
    }
    milp.set_objective(objective);

    let model = DinnerModel { milp, vars };
    for (family, count) in model.family_counts() {
        debug!(family = family.label(), count, "constraint family");
    }
    info!(
        variables = model.milp.variables().len(),
        arcs = model.vars.arcs().len(),
        constraints = model.milp.constraints().len(),
        "built rotation model"
    );
    Ok(model)
}

fn validate(data: &ProblemData, options: &ModelOptions) -> Result<(), PlanError> {
    let teams = data.team_count();
    let courses = data.course_count();
    check_roster(teams, courses)?;

    for &(guest, chef) in &options.cook_incompatible {
        for index in [guest, chef] {
            if index >= teams {
                return Err(PlanError::UnknownTeam { index, teams });
            }
        }
    }
    if options.large_teams > teams {
        return Err(PlanError::TooManyLargeTeams {
            requested: options.large_teams,
            teams,
        });
    }

    // Each team meets K-1 others per course, all distinct across K courses.
    if options.unique_meetings && courses * (courses - 1) > teams - 1 {
        warn!(
            teams,
            courses, "too few teams for unique meetings; the model will be infeasible"
        );
    }
    Ok(())
}
