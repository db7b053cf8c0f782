//! Solver backends implementing the feasibility oracle

pub mod microlp;

use indexmap::IndexMap;

use crate::configuration::{Solver, CONFIGURATION};
use crate::optimize::problem::Problem;
use crate::optimize::solvers::microlp::MicrolpSolver;

/// Outcome of handing a compiled constraint system to a solver backend
///
/// `NumericalError` is deliberately distinct from `Infeasible`: a solver that
/// broke down or timed out has not proven anything about the model.
#[derive(Debug, Clone)]
pub enum SolverVerdict {
    /// The problem is feasible and was solved to optimality
    Optimal {
        /// Value of the objective at the optimum
        objective_value: f64,
        /// Values of all variables at the optimum, keyed by variable id
        variable_values: IndexMap<String, f64>,
    },
    /// The constraints admit no solution
    Infeasible,
    /// The objective value is not bounded over the feasible region
    Unbounded,
    /// The backend could not determine feasibility
    NumericalError(String),
}

impl SolverVerdict {
    /// Whether the verdict proves the constraint system feasible
    pub fn is_feasible(&self) -> bool {
        matches!(self, SolverVerdict::Optimal { .. })
    }
}

/// The feasibility oracle consumed by the growth-rate search
pub trait FeasibilitySolver {
    /// Determine feasibility (and an optimum, if one exists) of a compiled problem
    fn check(&self, problem: &Problem) -> SolverVerdict;
}

/// The solver backend currently selected in the global configuration
pub fn default_solver() -> impl FeasibilitySolver {
    match CONFIGURATION.read().unwrap().solver {
        Solver::Microlp => MicrolpSolver,
    }
}
