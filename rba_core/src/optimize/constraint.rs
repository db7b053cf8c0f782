//! Provides struct for representing a constraint in an optimization problem

use std::fmt::{Display, Formatter};

/// Represents a linear constraint in an optimization problem
///
/// Terms reference variables by id; the owning [`Problem`](crate::optimize::problem::Problem)
/// validates that every referenced variable exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Represents an equality constraint, where `terms` = `equals`
    Equality {
        /// Linear terms which are added together, see [`ConstraintTerm`]
        terms: Vec<ConstraintTerm>,
        /// The right hand side of the equality constraint
        equals: f64,
    },
    /// Represents a range constraint on the sum of the terms
    Inequality {
        /// Linear terms which are added together, see [`ConstraintTerm`]
        terms: Vec<ConstraintTerm>,
        /// The lowest value the sum of the terms can take, may be negative infinity
        lower_bound: f64,
        /// The highest value the sum of the terms can take, may be positive infinity
        upper_bound: f64,
    },
}

impl Constraint {
    /// Create a new equality constraint from (variable id, coefficient) pairs
    ///
    /// # Parameters
    /// - `terms`: A slice of (variable id, coefficient) pairs
    /// - `equals`: The right hand side of the equality
    ///
    /// # Returns
    /// A new equality constraint
    ///
    /// # Examples
    /// ```rust
    /// use rba_core::optimize::constraint::Constraint;
    /// // Create a constraint representing 3*x + 2*y = 6
    /// let balance = Constraint::new_equality(&[("x", 3.0), ("y", 2.0)], 6.0);
    /// assert_eq!(format!("{balance}"), "3*x + 2*y = 6");
    /// ```
    pub fn new_equality(terms: &[(&str, f64)], equals: f64) -> Self {
        Constraint::Equality {
            terms: Constraint::zip_into_terms(terms),
            equals,
        }
    }

    /// Create a new range constraint from (variable id, coefficient) pairs
    ///
    /// # Parameters
    /// - `terms`: A slice of (variable id, coefficient) pairs
    /// - `lower_bound`: The lowest value the sum of the terms can take, may be
    ///   negative infinity
    /// - `upper_bound`: The highest value the sum of the terms can take, may be
    ///   positive infinity
    ///
    /// # Returns
    /// A new range constraint
    ///
    /// # Examples
    /// ```rust
    /// use rba_core::optimize::constraint::Constraint;
    /// // represents the inequality 2 <= 3*x + 2*y <= 6
    /// let capacity = Constraint::new_inequality(&[("x", 3.0), ("y", 2.0)], 2.0, 6.0);
    /// ```
    pub fn new_inequality(terms: &[(&str, f64)], lower_bound: f64, upper_bound: f64) -> Self {
        Constraint::Inequality {
            terms: Constraint::zip_into_terms(terms),
            lower_bound,
            upper_bound,
        }
    }

    /// The linear terms of the constraint
    pub fn terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } => terms,
            Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Whether the all-zero assignment satisfies the constraint
    ///
    /// Used to decide rows without any terms, which an LP backend cannot hold.
    pub fn admits_zero(&self) -> bool {
        match self {
            Constraint::Equality { equals, .. } => *equals == 0.0,
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => *lower_bound <= 0.0 && 0.0 <= *upper_bound,
        }
    }

    /// Turn a slice of (variable id, coefficient) pairs into a vec of ConstraintTerms
    fn zip_into_terms(terms: &[(&str, f64)]) -> Vec<ConstraintTerm> {
        terms
            .iter()
            .map(|(variable, coefficient)| ConstraintTerm {
                variable: variable.to_string(),
                coefficient: *coefficient,
            })
            .collect()
    }

    /// Create a string representation of the constraint
    fn constraint_to_string(&self) -> String {
        match self {
            Constraint::Equality { terms, equals } => {
                format!("{} = {}", Self::terms_to_string(terms), equals)
            }
            Constraint::Inequality {
                terms,
                lower_bound,
                upper_bound,
            } => {
                format!(
                    "{} <= {} <= {}",
                    lower_bound,
                    Self::terms_to_string(terms),
                    upper_bound
                )
            }
        }
    }

    /// Convert a vector of terms into a String representation
    fn terms_to_string(terms: &[ConstraintTerm]) -> String {
        if terms.is_empty() {
            return "0".to_string();
        }
        terms
            .iter()
            .map(|term| format!("{}", term))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.constraint_to_string())
    }
}

/// Represents a single term in a constraint, specifically the multiplication of
/// the variable with the given id by the `coefficient`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTerm {
    /// Id of a [`Variable`](crate::optimize::variable::Variable) in the problem
    pub variable: String,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let equality = Constraint::new_equality(&[("x", 3.0), ("y", 2.0)], 6.0);
        assert_eq!(format!("{}", equality), "3*x + 2*y = 6");

        let inequality = Constraint::new_inequality(&[("x", 1.0)], 2.0, 4.0);
        assert_eq!(format!("{}", inequality), "2 <= 1*x <= 4");
    }

    #[test]
    fn admits_zero() {
        assert!(Constraint::new_equality(&[], 0.0).admits_zero());
        assert!(!Constraint::new_equality(&[], 1.0).admits_zero());
        assert!(Constraint::new_inequality(&[], f64::NEG_INFINITY, 0.0).admits_zero());
        assert!(!Constraint::new_inequality(&[], 0.5, 1.0).admits_zero());
    }
}
