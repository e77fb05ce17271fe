//! Solver-neutral mixed-integer linear model.

use std::fmt::Write;

/// Handle of a decision variable inside a [`MilpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    Binary,
    Continuous { lower: f64, upper: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
}

/// Sum of `coefficient * variable` terms. Terms are not merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Adds `coefficient * var`; zero coefficients are dropped.
    pub fn add(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression for a full assignment indexed by [`VarId`].
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * values.get(var.0).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (var, coefficient) in iter {
            expr.add(var, coefficient);
        }
        expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// Which rule of the rotation a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintFamily {
    TeamCoverage,
    GroupSize,
    UniqueMeeting,
    ChefEligibility,
    OneChefPerGroup,
    OneHostingCourse,
    ChefAssigned,
    ArcAssigned,
    ArcToChef,
    Handoff,
    MaxDuration,
    MinTravel,
    IncompatibleCook,
    LargeTeamCount,
    LargeTeamSeparation,
    SharedAddress,
}

impl ConstraintFamily {
    pub fn label(self) -> &'static str {
        match self {
            ConstraintFamily::TeamCoverage => "team_coverage",
            ConstraintFamily::GroupSize => "group_size",
            ConstraintFamily::UniqueMeeting => "unique_meeting",
            ConstraintFamily::ChefEligibility => "chef_eligibility",
            ConstraintFamily::OneChefPerGroup => "one_chef_per_group",
            ConstraintFamily::OneHostingCourse => "one_hosting_course",
            ConstraintFamily::ChefAssigned => "chef_assigned",
            ConstraintFamily::ArcAssigned => "arc_assigned",
            ConstraintFamily::ArcToChef => "arc_to_chef",
            ConstraintFamily::Handoff => "handoff",
            ConstraintFamily::MaxDuration => "max_duration",
            ConstraintFamily::MinTravel => "min_travel",
            ConstraintFamily::IncompatibleCook => "incompatible_cook",
            ConstraintFamily::LargeTeamCount => "large_team_count",
            ConstraintFamily::LargeTeamSeparation => "large_team_separation",
            ConstraintFamily::SharedAddress => "shared_address",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(family: ConstraintFamily, expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        Self {
            family,
            expr,
            sense,
            rhs,
        }
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.eval(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tolerance,
            Sense::Ge => lhs >= self.rhs - tolerance,
            Sense::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Variables, constraints and a minimisation objective.
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name: String, kind: VarKind) -> VarId {
        self.vars.push(VarDef { name, kind });
        VarId(self.vars.len() - 1)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn variables(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Constraints violated by `values`.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|constraint| !constraint.is_satisfied(values, tolerance))
            .collect()
    }

    /// Renders the model in CPLEX LP file format.
    pub fn to_lp_format(&self) -> String {
        let mut out = String::new();
        out.push_str("\\ rotating dinner assignment\nMinimize\n obj:");
        self.write_terms(&mut out, &self.objective);
        out.push_str("\nSubject To\n");
        for (index, constraint) in self.constraints.iter().enumerate() {
            let _ = write!(out, " {}_{}:", constraint.family.label(), index);
            self.write_terms(&mut out, &constraint.expr);
            let sense = match constraint.sense {
                Sense::Le => "<=",
                Sense::Ge => ">=",
                Sense::Eq => "=",
            };
            let _ = writeln!(out, " {} {}", sense, fmt_num(constraint.rhs));
        }

        out.push_str("Bounds\n");
        for def in &self.vars {
            if let VarKind::Continuous { lower, upper } = def.kind {
                match upper {
                    Some(upper) => {
                        let _ = writeln!(out, " {} <= {} <= {}", fmt_num(lower), def.name, fmt_num(upper));
                    }
                    None => {
                        let _ = writeln!(out, " {} >= {}", def.name, fmt_num(lower));
                    }
                }
            }
        }

        out.push_str("Binary\n");
        for def in &self.vars {
            if def.kind == VarKind::Binary {
                let _ = writeln!(out, " {}", def.name);
            }
        }
        out.push_str("End\n");
        out
    }

    fn write_terms(&self, out: &mut String, expr: &LinearExpr) {
        if expr.is_empty() {
            out.push_str(" 0");
            return;
        }
        for (position, (var, coefficient)) in expr.terms().iter().enumerate() {
            // LP readers limit line length.
            if position > 0 && position % 8 == 0 {
                out.push_str("\n   ");
            }
            let name = &self.vars[var.0].name;
            if *coefficient == 1.0 {
                let _ = write!(out, " + {}", name);
            } else if *coefficient == -1.0 {
                let _ = write!(out, " - {}", name);
            } else if *coefficient < 0.0 {
                let _ = write!(out, " - {} {}", fmt_num(-coefficient), name);
            } else {
                let _ = write!(out, " + {} {}", fmt_num(*coefficient), name);
            }
        }
    }
}

fn fmt_num(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.6}", value)
    }
}
