//! Growth-rate dependent model parameters and their evaluation
//!
//! Every numeric bound in a resource balance model (enzyme efficiencies, density
//! limits, production targets, process capacities) is a reference into the
//! [`ParameterRegistry`], resolved and evaluated at each candidate growth rate.

pub mod aggregate;
pub mod function;

use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::params::aggregate::{Aggregate, AggregateOp};
use crate::params::function::Function;
use crate::rba_model::medium::Medium;

/// A resolved parameter, either a plain function or an aggregate
#[derive(Debug, Clone, Copy)]
pub enum Parameter<'a> {
    Function(&'a Function),
    Aggregate(&'a Aggregate),
}

/// Registry of all named parameter functions and aggregates in a model
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    /// Map of function ids to Function objects
    functions: IndexMap<String, Function>,
    /// Map of aggregate ids to Aggregate objects
    aggregates: IndexMap<String, Aggregate>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function to the registry, replacing any previous definition with the
    /// same id
    pub fn add_function(&mut self, function: Function) {
        self.functions.insert(function.id.clone(), function);
    }

    /// Add an aggregate to the registry, replacing any previous definition with the
    /// same id
    pub fn add_aggregate(&mut self, aggregate: Aggregate) {
        self.aggregates.insert(aggregate.id.clone(), aggregate);
    }

    /// Look up a parameter by id
    ///
    /// This is the lookup boundary the constraint compiler uses; a missing id is a
    /// hard configuration error, never silently defaulted.
    pub fn get_by_id(&self, id: &str) -> Result<Parameter, ParameterError> {
        if let Some(function) = self.functions.get(id) {
            return Ok(Parameter::Function(function));
        }
        if let Some(aggregate) = self.aggregates.get(id) {
            return Ok(Parameter::Aggregate(aggregate));
        }
        Err(ParameterError::UnknownReference(id.to_string()))
    }

    /// Evaluate a parameter at a given growth rate and medium composition
    ///
    /// # Parameters
    /// - `id`: Id of the function or aggregate to evaluate
    /// - `growth_rate`: The candidate growth rate, the argument of growth-rate
    ///   bound functions
    /// - `medium`: Concentrations for medium-bound functions (absent reads as 0)
    ///
    /// # Returns
    /// The evaluated value, or a [`ParameterError`] when the id is undefined or
    /// an aggregate refers back to itself
    ///
    /// # Examples
    /// ```rust
    /// use rba_core::params::function::Function;
    /// use rba_core::params::ParameterRegistry;
    /// use rba_core::rba_model::medium::Medium;
    /// let mut registry = ParameterRegistry::new();
    /// registry.add_function(Function::linear("demand", 1.0, 2.0));
    /// let value = registry.evaluate("demand", 0.5, &Medium::new()).unwrap();
    /// assert!((value - 2.0).abs() < 1e-12);
    /// ```
    pub fn evaluate(
        &self,
        id: &str,
        growth_rate: f64,
        medium: &Medium,
    ) -> Result<f64, ParameterError> {
        let mut path = HashSet::new();
        self.evaluate_inner(id, growth_rate, medium, &mut path)
    }

    fn evaluate_inner(
        &self,
        id: &str,
        growth_rate: f64,
        medium: &Medium,
        path: &mut HashSet<String>,
    ) -> Result<f64, ParameterError> {
        match self.get_by_id(id)? {
            Parameter::Function(function) => Ok(function.value_at(growth_rate, medium)),
            Parameter::Aggregate(aggregate) => {
                if !path.insert(aggregate.id.clone()) {
                    return Err(ParameterError::CyclicAggregate(aggregate.id.clone()));
                }
                let value = match aggregate.op {
                    AggregateOp::Multiplication => {
                        let mut product = 1.0;
                        for term in &aggregate.terms {
                            product *= self.evaluate_inner(term, growth_rate, medium, path)?;
                        }
                        product
                    }
                };
                path.remove(id);
                Ok(value)
            }
        }
    }

    /// Check that every aggregate reference resolves and that the reference graph
    /// is free of cycles
    ///
    /// Run once at load time so that evaluation during compilation cannot recurse
    /// into itself.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for id in self.aggregates.keys() {
            let mut path = HashSet::new();
            self.check_acyclic(id, &mut path)?;
        }
        Ok(())
    }

    fn check_acyclic(&self, id: &str, path: &mut HashSet<String>) -> Result<(), ParameterError> {
        match self.get_by_id(id)? {
            Parameter::Function(_) => Ok(()),
            Parameter::Aggregate(aggregate) => {
                if !path.insert(aggregate.id.clone()) {
                    return Err(ParameterError::CyclicAggregate(aggregate.id.clone()));
                }
                for term in &aggregate.terms {
                    self.check_acyclic(term, path)?;
                }
                path.remove(id);
                Ok(())
            }
        }
    }
}

/// Errors raised while resolving or evaluating parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter id was used but no function or aggregate defines it
    #[error("no function or aggregate is defined with id {0}")]
    UnknownReference(String),
    /// Aggregate definitions form a reference cycle
    #[error("aggregate {0} refers back to itself")]
    CyclicAggregate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_constants() -> ParameterRegistry {
        let mut registry = ParameterRegistry::new();
        registry.add_function(Function::constant("two", 2.0));
        registry.add_function(Function::constant("three", 3.0));
        registry
    }

    #[test]
    fn get_by_id_resolves_functions_and_aggregates() {
        let mut registry = registry_with_constants();
        registry.add_aggregate(Aggregate::multiplication("six", &["two", "three"]));
        assert!(matches!(
            registry.get_by_id("two").unwrap(),
            Parameter::Function(_)
        ));
        assert!(matches!(
            registry.get_by_id("six").unwrap(),
            Parameter::Aggregate(_)
        ));
    }

    #[test]
    fn unknown_reference() {
        let registry = registry_with_constants();
        match registry.get_by_id("missing") {
            Err(ParameterError::UnknownReference(id)) => assert_eq!(id, "missing"),
            other => panic!("expected UnknownReference, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            registry.evaluate("missing", 0.0, &Medium::new()),
            Err(ParameterError::UnknownReference(_))
        ));
    }

    #[test]
    fn aggregate_multiplies_terms() {
        let mut registry = registry_with_constants();
        registry.add_function(Function::linear("mu", 0.0, 1.0));
        registry.add_aggregate(Aggregate::multiplication("combined", &["two", "three", "mu"]));
        let value = registry
            .evaluate("combined", 0.5, &Medium::new())
            .unwrap();
        assert!((value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn nested_aggregates_evaluate() {
        let mut registry = registry_with_constants();
        registry.add_aggregate(Aggregate::multiplication("six", &["two", "three"]));
        registry.add_aggregate(Aggregate::multiplication("twelve", &["six", "two"]));
        let value = registry.evaluate("twelve", 0.0, &Medium::new()).unwrap();
        assert!((value - 12.0).abs() < 1e-12);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn diamond_references_are_not_cycles() {
        let mut registry = registry_with_constants();
        registry.add_aggregate(Aggregate::multiplication("left", &["two"]));
        registry.add_aggregate(Aggregate::multiplication("right", &["two"]));
        registry.add_aggregate(Aggregate::multiplication("top", &["left", "right"]));
        assert!(registry.validate().is_ok());
        let value = registry.evaluate("top", 0.0, &Medium::new()).unwrap();
        assert!((value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn self_referencing_aggregate_is_rejected() {
        let mut registry = ParameterRegistry::new();
        registry.add_aggregate(Aggregate::multiplication("loop", &["loop"]));
        assert!(matches!(
            registry.validate(),
            Err(ParameterError::CyclicAggregate(_))
        ));
        assert!(matches!(
            registry.evaluate("loop", 0.0, &Medium::new()),
            Err(ParameterError::CyclicAggregate(_))
        ));
    }

    #[test]
    fn mutually_recursive_aggregates_are_rejected() {
        let mut registry = ParameterRegistry::new();
        registry.add_aggregate(Aggregate::multiplication("a", &["b"]));
        registry.add_aggregate(Aggregate::multiplication("b", &["a"]));
        assert!(matches!(
            registry.validate(),
            Err(ParameterError::CyclicAggregate(_))
        ));
    }

    #[test]
    fn validate_catches_dangling_aggregate_terms() {
        let mut registry = ParameterRegistry::new();
        registry.add_aggregate(Aggregate::multiplication("broken", &["missing"]));
        assert!(matches!(
            registry.validate(),
            Err(ParameterError::UnknownReference(_))
        ));
    }
}
