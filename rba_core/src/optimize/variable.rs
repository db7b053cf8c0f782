//! Module providing representation of optimization problem variables

use std::fmt::{Display, Formatter};

/// A continuous variable in a compiled constraint system
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    pub id: String,
    /// Which model entity the variable stands for, see [`VariableKind`]
    pub kind: VariableKind,
    /// Lower variable bound, may be negative infinity
    pub lower_bound: f64,
    /// Upper variable bound, may be positive infinity
    pub upper_bound: f64,
}

impl Variable {
    /// Create a new variable
    pub fn new(id: &str, kind: VariableKind, lower_bound: f64, upper_bound: f64) -> Variable {
        Variable {
            id: id.to_string(),
            kind,
            lower_bound,
            upper_bound,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.kind)
    }
}

/// The model entity a variable stands for, carrying the entity's id so a
/// solution can be split without parsing variable names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    /// Flux through a reaction, signed
    ReactionFlux(String),
    /// Concentration of a macromolecule, non-negative
    MacromoleculeConcentration(String),
    /// Concentration of an enzyme, non-negative
    EnzymeConcentration(String),
    /// Concentration of a process machine, non-negative
    MachineryConcentration(String),
}

impl Display for VariableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableKind::ReactionFlux(_) => write!(f, "FLUX"),
            VariableKind::MacromoleculeConcentration(_) => write!(f, "MACROMOLECULE"),
            VariableKind::EnzymeConcentration(_) => write!(f, "ENZYME"),
            VariableKind::MachineryConcentration(_) => write!(f, "MACHINERY"),
        }
    }
}
