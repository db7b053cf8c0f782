//! Implements a solver interface for microlp

use indexmap::IndexMap;
use microlp::{ComparisonOp, LinearExpr, OptimizationDirection};

use crate::optimize::constraint::{Constraint, ConstraintTerm};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{FeasibilitySolver, SolverVerdict};

/// Feasibility oracle backed by the microlp simplex solver
pub struct MicrolpSolver;

impl MicrolpSolver {
    fn expression(
        terms: &[ConstraintTerm],
        handles: &IndexMap<String, microlp::Variable>,
    ) -> LinearExpr {
        let mut expression = LinearExpr::empty();
        for term in terms {
            expression.add(handles[&term.variable], term.coefficient);
        }
        expression
    }
}

impl FeasibilitySolver for MicrolpSolver {
    fn check(&self, problem: &Problem) -> SolverVerdict {
        let direction = match problem.objective().sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut lp = microlp::Problem::new(direction);

        let mut handles: IndexMap<String, microlp::Variable> = IndexMap::new();
        for (id, variable) in problem.variables() {
            let coefficient = problem.objective().coefficient_of(id);
            let handle = lp.add_var(coefficient, (variable.lower_bound, variable.upper_bound));
            handles.insert(id.clone(), handle);
        }

        for constraint in problem.constraints().values() {
            // microlp cannot hold a row without terms, decide it directly
            if constraint.terms().is_empty() {
                if constraint.admits_zero() {
                    continue;
                }
                return SolverVerdict::Infeasible;
            }
            match constraint {
                Constraint::Equality { terms, equals } => {
                    lp.add_constraint(Self::expression(terms, &handles), ComparisonOp::Eq, *equals);
                }
                Constraint::Inequality {
                    terms,
                    lower_bound,
                    upper_bound,
                } => {
                    // ranges become a Ge/Le pair, infinite sides are omitted
                    if lower_bound.is_finite() {
                        lp.add_constraint(
                            Self::expression(terms, &handles),
                            ComparisonOp::Ge,
                            *lower_bound,
                        );
                    }
                    if upper_bound.is_finite() {
                        lp.add_constraint(
                            Self::expression(terms, &handles),
                            ComparisonOp::Le,
                            *upper_bound,
                        );
                    }
                }
            }
        }

        match lp.solve() {
            Ok(solution) => {
                let variable_values = handles
                    .iter()
                    .map(|(id, handle)| (id.clone(), solution[*handle]))
                    .collect();
                SolverVerdict::Optimal {
                    objective_value: solution.objective(),
                    variable_values,
                }
            }
            Err(microlp::Error::Infeasible) => SolverVerdict::Infeasible,
            Err(microlp::Error::Unbounded) => SolverVerdict::Unbounded,
            Err(other) => SolverVerdict::NumericalError(other.to_string()),
        }
    }
}
