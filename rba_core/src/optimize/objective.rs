//! Provides struct for representing an optimization problem's objective

/// Represents the objective of an optimization problem
///
/// Compiled constraint systems are pure linear programs, so only linear terms
/// exist; a growth-rate feasibility probe typically carries no terms at all.
#[derive(Debug, Clone, Default)]
pub struct Objective {
    /// Terms included in the objective (see [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// The sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Add a new linear term to the objective
    pub fn add_linear_term(&mut self, variable: &str, coefficient: f64) {
        self.terms.push(ObjectiveTerm {
            variable: variable.to_string(),
            coefficient,
        });
    }

    /// Total objective coefficient of a variable, summed over all of its terms
    pub fn coefficient_of(&self, variable: &str) -> f64 {
        self.terms
            .iter()
            .filter(|term| term.variable == variable)
            .map(|term| term.coefficient)
            .sum()
    }

    /// The terms of the objective
    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    #[default]
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveTerm {
    /// Id of the variable in the objective term
    pub variable: String,
    /// Coefficient for the term
    pub coefficient: f64,
}
