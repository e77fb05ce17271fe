//! MILP solver adapter.
//!
//! The model core only produces a [`MilpModel`]. A [`SolverBackend`] turns it
//! into variable values and a status. The bundled backend runs `good_lp` on
//! a worker thread and stops waiting once the time budget is spent.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution as _, SolverModel, Variable,
    default_solver, variable,
};
use tracing::{debug, info, warn};

use crate::error::SolverError;
use crate::model::{LinearExpr, MilpModel, Sense, VarId, VarKind};

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Best incumbent when the budget ran out.
    Feasible,
    Infeasible,
    /// Budget ran out before any incumbent was found.
    Timeout,
}

impl SolveStatus {
    pub fn has_incumbent(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Wall-clock budget for the solver.
    pub time_budget: Duration,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(3600),
        }
    }
}

/// Resolved variable values. Produced once per run, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    status: SolveStatus,
    objective: Option<f64>,
    values: Vec<f64>,
}

impl Solution {
    /// An incumbent: one value per variable, indexed by [`VarId`].
    pub fn new(status: SolveStatus, values: Vec<f64>, objective: Option<f64>) -> Self {
        Self {
            status,
            objective,
            values,
        }
    }

    /// A terminal status without values.
    pub fn without_incumbent(status: SolveStatus) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Reads a binary variable.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }
}

/// A mixed-integer linear programming back end.
pub trait SolverBackend {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel, options: &SolveOptions) -> Result<Solution, SolverError>;
}

/// `good_lp` with its default (pure Rust) solver.
///
/// The solver cannot be interrupted, so when the budget expires the worker
/// thread is abandoned and [`SolveStatus::Timeout`] is reported. The
/// abandoned thread keeps a core busy until the search ends on its own, and
/// its memory is only released then. A process that plans repeatedly with
/// short budgets accumulates such threads; one-shot use (the CLI) exits and
/// takes them down with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl SolverBackend for GoodLpBackend {
    fn name(&self) -> &str {
        "good_lp"
    }

    fn solve(&self, model: &MilpModel, options: &SolveOptions) -> Result<Solution, SolverError> {
        let mut problem_vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|def| {
                let definition = match def.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Continuous { lower, upper } => match upper {
                        Some(upper) => variable().min(lower).max(upper),
                        None => variable().min(lower),
                    },
                };
                problem_vars.add(definition)
            })
            .collect();

        let objective = to_expression(model.objective(), &handles);
        let constraints: Vec<good_lp::Constraint> = model
            .constraints()
            .iter()
            .map(|constraint| {
                let expr = to_expression(&constraint.expr, &handles);
                match constraint.sense {
                    Sense::Le => expr.leq(constraint.rhs),
                    Sense::Ge => expr.geq(constraint.rhs),
                    Sense::Eq => expr.eq(constraint.rhs),
                }
            })
            .collect();

        info!(
            backend = self.name(),
            variables = handles.len(),
            constraints = constraints.len(),
            budget_secs = options.time_budget.as_secs(),
            "solving"
        );

        let (sender, receiver) = mpsc::channel();
        let started = Instant::now();
        thread::Builder::new()
            .name("milp-solver".to_string())
            .spawn(move || {
                let mut problem = problem_vars.minimise(objective).using(default_solver);
                for constraint in constraints {
                    problem = problem.with(constraint);
                }
                let outcome = problem
                    .solve()
                    .map(|solution| handles.iter().map(|&var| solution.value(var)).collect::<Vec<f64>>());
                if sender.send(outcome).is_err() {
                    debug!("abandoned solve finished after its budget");
                }
            })?;

        match receiver.recv_timeout(options.time_budget) {
            Ok(Ok(values)) => {
                let objective = model.objective().eval(&values);
                info!(objective, elapsed_ms = started.elapsed().as_millis() as u64, "optimal solution");
                Ok(Solution::new(SolveStatus::Optimal, values, Some(objective)))
            }
            Ok(Err(ResolutionError::Infeasible)) => {
                info!("model is infeasible");
                Ok(Solution::without_incumbent(SolveStatus::Infeasible))
            }
            Ok(Err(ResolutionError::Unbounded)) => Err(SolverError::Unbounded),
            Ok(Err(err)) => Err(SolverError::Backend(err.to_string())),
            Err(RecvTimeoutError::Timeout) => {
                warn!(budget_secs = options.time_budget.as_secs(), "time budget exhausted");
                Ok(Solution::without_incumbent(SolveStatus::Timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::Disconnected),
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    for &(var, coefficient) in expr.terms() {
        out.add_mul(coefficient, handles[var.index()]);
    }
    out
}
