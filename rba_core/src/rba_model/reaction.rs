//! This module provides a struct for representing reactions

use derive_builder::Builder;
use indexmap::IndexMap;

use crate::configuration::CONFIGURATION;

/// Represents a reaction in the metabolic network
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Map of species ids to positive stoichiometric coefficients on the reactant side
    #[builder(default = "IndexMap::new()")]
    pub reactants: IndexMap<String, f64>,
    /// Map of species ids to positive stoichiometric coefficients on the product side
    #[builder(default = "IndexMap::new()")]
    pub products: IndexMap<String, f64>,
    /// Whether the reaction can carry negative flux
    #[builder(default = "false")]
    pub reversible: bool,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
}

impl Reaction {
    /// Net signed stoichiometric coefficient of a species in this reaction
    ///
    /// Positive when the species is produced, negative when consumed.
    pub fn stoichiometry_of(&self, species: &str) -> f64 {
        self.products.get(species).copied().unwrap_or(0.0)
            - self.reactants.get(species).copied().unwrap_or(0.0)
    }

    /// Whether the species appears on either side of the reaction
    pub fn involves(&self, species: &str) -> bool {
        self.reactants.contains_key(species) || self.products.contains_key(species)
    }

    /// Bounds of the flux variable associated with this reaction
    ///
    /// Irreversible reactions contribute only a non-negative flux variable.
    pub(crate) fn flux_bounds(&self) -> (f64, f64) {
        let bound = CONFIGURATION.read().unwrap().flux_bound;
        if self.reversible {
            (-bound, bound)
        } else {
            (0.0, bound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_stoichiometry() {
        let reaction = ReactionBuilder::default()
            .id("conversion")
            .reactants(IndexMap::from([("a".to_string(), 1.0)]))
            .products(IndexMap::from([("b".to_string(), 2.0)]))
            .build()
            .unwrap();
        assert!((reaction.stoichiometry_of("a") + 1.0).abs() < 1e-12);
        assert!((reaction.stoichiometry_of("b") - 2.0).abs() < 1e-12);
        assert_eq!(reaction.stoichiometry_of("c"), 0.0);
        assert!(reaction.involves("a"));
        assert!(!reaction.involves("c"));
    }

    #[test]
    fn irreversible_flux_is_non_negative() {
        let reaction = ReactionBuilder::default().id("r").build().unwrap();
        let (lower, _) = reaction.flux_bounds();
        assert_eq!(lower, 0.0);

        let reversible = ReactionBuilder::default()
            .id("r")
            .reversible(true)
            .build()
            .unwrap();
        let (lower, upper) = reversible.flux_bounds();
        assert!(lower < 0.0);
        assert!(upper > 0.0);
    }
}
