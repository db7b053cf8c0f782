//! This module provides the Aggregate struct, a combination of named parameters

/// A parameter defined as a combination of other functions or aggregates,
/// referenced by id
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Used to identify the aggregate (must be unique among functions and aggregates)
    pub id: String,
    /// How the referenced parameters are combined, see [`AggregateOp`]
    pub op: AggregateOp,
    /// Ids of the functions or aggregates being combined, in order
    pub terms: Vec<String>,
}

/// Operators available for combining parameters in an [`Aggregate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// The product of all referenced parameter values
    Multiplication,
}

impl Aggregate {
    /// Create a new multiplicative aggregate over the given parameter ids
    pub fn multiplication(id: &str, terms: &[&str]) -> Self {
        Aggregate {
            id: id.to_string(),
            op: AggregateOp::Multiplication,
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}
