//! This module provides the Process struct and its component processing maps

use derive_builder::Builder;
use indexmap::IndexMap;

/// The assembly chemistry of one component within one process
///
/// Defined once per (process, component) pair: the metabolites consumed and
/// produced when one unit of the component is incorporated into a macromolecule,
/// and the cost charged against the process machinery.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct ComponentProcessing {
    /// Machinery capacity consumed per unit of component processed
    #[builder(default = "1.0")]
    pub machinery_cost: f64,
    /// Map of species ids to amounts consumed per unit of component
    #[builder(default = "IndexMap::new()")]
    pub reactants: IndexMap<String, f64>,
    /// Map of species ids to amounts released per unit of component
    #[builder(default = "IndexMap::new()")]
    pub products: IndexMap<String, f64>,
}

/// A cellular process assembling macromolecule components
///
/// A process applies to every macromolecule whose composition contains a
/// component it has a [`ComponentProcessing`] entry for. A process may require a
/// molecular machine (a macromolecule composition of its own) whose capacity
/// bounds the total component throughput.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Process {
    /// Used to identify the process (must be unique)
    pub id: String,
    /// Map of macromolecule ids to the count required per unit of machine;
    /// empty when the process runs without a dedicated machine
    #[builder(default = "IndexMap::new()")]
    pub machinery: IndexMap<String, f64>,
    /// Parameter id of the machine capacity (components processed per unit of
    /// machine per unit time); None leaves the throughput unconstrained
    #[builder(default = "None")]
    pub capacity: Option<String>,
    /// Map of component ids to their assembly chemistry under this process
    #[builder(default = "IndexMap::new()")]
    pub processing: IndexMap<String, ComponentProcessing>,
}

impl Process {
    /// Whether this process requires a molecular machine
    pub fn has_machinery(&self) -> bool {
        !self.machinery.is_empty()
    }

    /// Id of the machine concentration variable in the compiled problem
    pub fn machinery_variable_id(&self) -> String {
        format!("{}_machinery", self.id)
    }
}
