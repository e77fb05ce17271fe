//! Planning pipeline: build, solve, decode.

use tracing::info;

use crate::assembler::ProblemData;
use crate::config::ModelOptions;
use crate::decode::{DecodedPlan, decode};
use crate::error::PlanError;
use crate::model::{DinnerModel, build_model};
use crate::solver::{SolveOptions, SolveStatus, SolverBackend};

/// A solved and decoded rotation.
#[derive(Debug, Clone)]
pub struct Plan {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub decoded: DecodedPlan,
}

/// Runs the whole pipeline on assembled problem data.
pub fn plan<B: SolverBackend + ?Sized>(
    data: &ProblemData,
    options: &ModelOptions,
    backend: &B,
    solve_options: &SolveOptions,
) -> Result<Plan, PlanError> {
    let model = build_model(data, options)?;
    solve_model(&model, data, options, backend, solve_options)
}

/// Solves an already built model and decodes the incumbent.
///
/// Infeasibility and timeouts become [`PlanError`]s; the decoder only ever
/// sees a solution that carries values.
pub fn solve_model<B: SolverBackend + ?Sized>(
    model: &DinnerModel,
    data: &ProblemData,
    options: &ModelOptions,
    backend: &B,
    solve_options: &SolveOptions,
) -> Result<Plan, PlanError> {
    let solution = backend.solve(model.milp(), solve_options)?;
    info!(status = ?solution.status(), objective = ?solution.objective(), "solver finished");

    match solution.status() {
        SolveStatus::Infeasible => {
            return Err(PlanError::Infeasible {
                relax: options.relaxable_constraints(),
            });
        }
        SolveStatus::Timeout => {
            return Err(PlanError::TimedOut {
                budget: solve_options.time_budget,
            });
        }
        SolveStatus::Optimal | SolveStatus::Feasible => {}
    }

    let decoded = decode(model, data, &solution)?;
    info!(
        max_minutes = decoded.statistics.max_total_minutes,
        mean_minutes = decoded.statistics.mean_total_minutes,
        "decoded plan"
    );
    Ok(Plan {
        status: solution.status(),
        objective: solution.objective(),
        decoded,
    })
}
