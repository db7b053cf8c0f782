//! Provides struct representing a compiled constraint system

use indexmap::IndexMap;
use thiserror::Error;

use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense};
use crate::optimize::variable::{Variable, VariableKind};

/// A compiled constraint system: variables, constraints, and an objective
///
/// One Problem is produced per candidate growth rate and discarded after the
/// feasibility check; it never outlives the model snapshot it was compiled from.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, variable: Variable) -> Result<(), ProblemError> {
        self.validate_variable(&variable)?;
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    ///
    /// # Parameters
    /// - `id`: Id for the new variable, must be unique within the problem
    /// - `kind`: Which model entity the variable stands for
    /// - `lower_bound`: Lower bound of the variable, may be negative infinity
    /// - `upper_bound`: Upper bound of the variable, may be positive infinity
    ///
    /// # Returns
    /// Ok(()) if the variable was added, a [`ProblemError`] if the id already
    /// exists or the bounds are inverted
    pub fn add_new_variable(
        &mut self,
        id: &str,
        kind: VariableKind,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_variable(Variable::new(id, kind, lower_bound, upper_bound))
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem under the given id
    pub fn add_constraint(&mut self, id: &str, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(id, &constraint)?;
        self.constraints.insert(id.to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        terms: &[(&str, f64)],
        equals: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(id, Constraint::new_equality(terms, equals))
    }

    /// Create a new range constraint and add it to the problem
    ///
    /// # Parameters
    /// - `id`: Id for the new constraint, must be unique within the problem
    /// - `terms`: A slice of (variable id, coefficient) pairs; every variable must
    ///   already be part of the problem
    /// - `lower_bound` / `upper_bound`: Bounds on the sum of the terms, either may
    ///   be infinite
    ///
    /// # Returns
    /// Ok(()) if the constraint was added, a [`ProblemError`] otherwise
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        terms: &[(&str, f64)],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(id, Constraint::new_inequality(terms, lower_bound, upper_bound))
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        if !self.variables.contains_key(variable_id) {
            return Err(ProblemError::NonExistentVariableInObjective(
                variable_id.to_string(),
            ));
        }
        self.objective.add_linear_term(variable_id, coefficient);
        Ok(())
    }
    // endregion Adding Objective Terms

    // region Accessors
    /// The variables of the problem, keyed by id, in insertion order
    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    /// The constraints of the problem, keyed by id, in insertion order
    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    /// The objective of the problem
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Current number of variables in the problem
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Current number of constraints in the problem
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
    // endregion Accessors

    // region Validation Functions
    /// Check that a variable is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        }
        if variable.lower_bound > variable.upper_bound {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint is valid to add to this problem
    fn validate_constraint(&self, id: &str, constraint: &Constraint) -> Result<(), ProblemError> {
        if self.constraints.contains_key(id) {
            return Err(ProblemError::ConstraintAlreadyExists(id.to_string()));
        }
        if let Constraint::Inequality {
            lower_bound,
            upper_bound,
            ..
        } = constraint
        {
            if lower_bound > upper_bound {
                return Err(ProblemError::InvalidConstraintBounds(id.to_string()));
            }
        }
        for term in constraint.terms() {
            if !self.variables.contains_key(&term.variable) {
                return Err(ProblemError::NonExistentVariableInConstraint {
                    constraint: id.to_string(),
                    variable: term.variable.clone(),
                });
            }
        }
        Ok(())
    }
    // endregion Validation Functions
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("a variable with id {0} already exists")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add a variable with lower_bound > upper_bound
    #[error("variable {0} has lower_bound > upper_bound")]
    InvalidVariableBounds(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("a constraint with id {0} already exists")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add an inequality constraint with lower_bound > upper_bound
    #[error("constraint {0} has lower_bound > upper_bound")]
    InvalidConstraintBounds(String),
    /// Error when trying to add a constraint that references a variable not in the problem
    #[error("constraint {constraint} references variable {variable} which is not in the problem")]
    NonExistentVariableInConstraint { constraint: String, variable: String },
    /// Error when trying to add an objective term for a variable not in the problem
    #[error("objective term references variable {0} which is not in the problem")]
    NonExistentVariableInObjective(String),
}
