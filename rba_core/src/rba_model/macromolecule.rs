//! This module provides the Component and Macromolecule structs

use derive_builder::Builder;
use indexmap::IndexMap;

/// A building block of macromolecules (an amino acid, nucleotide, or similar residue)
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Used to identify the component (must be unique)
    pub id: String,
    /// Volume contribution per unit of this component, strictly positive
    pub weight: f64,
}

impl Component {
    pub fn new(id: &str, weight: f64) -> Component {
        Component {
            id: id.to_string(),
            weight,
        }
    }
}

/// A polymer (protein, RNA, DNA-like entity) defined by its component composition
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Macromolecule {
    /// Used to identify the macromolecule (must be unique)
    pub id: String,
    /// Compartment the macromolecule resides in, counted against that
    /// compartment's density constraint
    pub compartment: String,
    /// Map of component ids to non-negative counts
    #[builder(default = "IndexMap::new()")]
    pub composition: IndexMap<String, f64>,
}

impl Macromolecule {
    /// Volume of one unit of this macromolecule, the weighted sum of its components
    pub fn volume(&self, components: &IndexMap<String, Component>) -> f64 {
        self.composition
            .iter()
            .map(|(component_id, count)| {
                components
                    .get(component_id)
                    .map(|component| count * component.weight)
                    .unwrap_or(0.0)
            })
            .sum()
    }
}
